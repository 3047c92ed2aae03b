//! End-to-end runners: one job in, one report out.

use crate::io::{
    FeatureJob, FeatureReport, IoError, TrayJob, TrayReport, TransformJob, TransformReport,
};
use feeder_vision_calib::{
    compute_transform, compute_tray_offsets, validate_consistency, CalibrationError,
    CONSISTENCY_TOLERANCE,
};
use feeder_vision_core::FeatureFrame;
use feeder_vision_features::{
    classify, estimate_pocket_geometry, expect_rotated_rects, fit_row, FeatureError, FeatureSet,
};
use log::{info, warn};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Features(#[from] FeatureError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Classify the job's candidates, estimate pocket geometry and fit the pocket row.
///
/// Classification and geometry are reported even when no row can be fitted.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(job)))]
pub fn run_features(job: &FeatureJob) -> FeatureReport {
    let frame = job.build_frame();
    let relax = job.build_relaxation(&frame);
    let mut report = FeatureReport::new(job, frame.is_calibrated(), relax);
    if let Err(err) = fill_features(job, &frame, &mut report) {
        warn!("feature pass failed: {err}");
        report.set_error(err);
    }
    report
}

fn fill_features<F: FeatureFrame>(
    job: &FeatureJob,
    frame: &F,
    report: &mut FeatureReport,
) -> Result<(), Error> {
    let rects = expect_rotated_rects(job.vision_result.clone())?;
    report.classified = classify(&rects, &job.camera, frame, &report.tolerance, report.relaxation);
    report.features = FeatureSet::from_classified(&report.classified);
    report.geometry = Some(estimate_pocket_geometry(
        &report.features,
        &job.camera,
        frame,
        job.pocket_pitch_mm,
        report.relaxation,
    ));

    report.features.require_pockets()?;
    let row = fit_row(
        &report.features.pocket_rects(),
        &job.camera.units_per_pixel,
        &report.tolerance,
    )?;
    info!(
        "pocket row: confidence {}, pitch {} mm",
        row.confidence(),
        row.pitch_mm
    );
    report.row = Some(row);
    Ok(())
}

/// Compute (or validate stored) tray offsets and the next pick location.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(job)))]
pub fn run_tray(job: &TrayJob) -> TrayReport {
    let mut report = TrayReport::default();
    if let Err(err) = fill_tray(job, &mut report) {
        warn!("tray calibration failed: {err}");
        report.set_error(err);
    }
    report
}

fn fill_tray(job: &TrayJob, report: &mut TrayReport) -> Result<(), Error> {
    let offsets = match &job.offsets {
        Some(provided) => {
            let tolerance = job.tolerance.unwrap_or(CONSISTENCY_TOLERANCE);
            let computed = validate_consistency(
                provided,
                &job.a,
                &job.b,
                &job.c,
                job.n_cols,
                job.n_rows,
                tolerance,
            )?;
            report.validated = true;
            computed
        }
        None => compute_tray_offsets(
            &job.a,
            &job.b,
            &job.c,
            job.n_cols,
            job.n_rows,
            job.existing_rotation_deg,
        )?,
    };
    report.offsets = Some(offsets);
    if let Some(feed_count) = job.feed_count {
        report.next_pick =
            Some(offsets.pick_location_for_feed(&job.a, feed_count, job.n_cols, job.n_rows)?);
    }
    Ok(())
}

/// Estimate the two-point transform and map the job's extra points with it.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(job)))]
pub fn run_transform(job: &TransformJob) -> TransformReport {
    let mut report = TransformReport::default();
    match compute_transform(
        &job.base,
        &job.local_a,
        &job.local_b,
        &job.captured_a,
        &job.captured_b,
    ) {
        Ok(transform) => {
            report.mapped = job.points.iter().map(|p| transform.apply(p)).collect();
            report.transform = Some(transform);
        }
        Err(err) => {
            warn!("transform failed: {err}");
            report.set_error(err);
        }
    }
    report
}
