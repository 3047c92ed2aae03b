//! JSON job configs and reports for the end-to-end runners.
//!
//! A job bundles everything one runner needs; the matching report carries the
//! results, or the error text when the computation failed. Jobs are loaded
//! with [`load_json`] and reports written with [`write_json`].

use std::fs;
use std::path::Path;

use feeder_vision_calib::{RigidTransform, TrayOffsets};
use feeder_vision_core::{CameraView, FeatureFrame, FeederFrame, Location, VisionResult};
use feeder_vision_features::{
    ClassifiedCandidate, FeatureSet, PocketGeometry, Relaxation, RowFit, ToleranceConfig,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Load a JSON document from disk.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, IoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Serialize `value` as pretty JSON.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write `value` to disk as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<(), IoError> {
    fs::write(path, to_json_string(value)?)?;
    Ok(())
}

/// Captured fiducial locations anchoring the feeder frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiducialConfig {
    pub f1: Option<Location>,
    pub f2: Option<Location>,
    pub f3: Option<Location>,
    /// Keep the exact fiducial distances instead of snapping them to the tape grid.
    pub normalize: bool,
}

impl FiducialConfig {
    pub fn build_frame(&self) -> FeederFrame {
        FeederFrame::from_fiducials(
            self.f1.as_ref(),
            self.f2.as_ref(),
            self.f3.as_ref(),
            self.normalize,
        )
    }
}

/// Input of [`run_features`](crate::run_features).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureJob {
    pub camera: CameraView,
    #[serde(default)]
    pub fiducials: FiducialConfig,
    /// Configured pocket pitch; zero when unknown.
    #[serde(default)]
    pub pocket_pitch_mm: f64,
    /// Configured pocket size across the tape; zero when unknown.
    #[serde(default)]
    pub pocket_size_mm: f64,
    /// Replaces the windows derived from the pocket pitch and size.
    #[serde(default)]
    pub tolerance: Option<ToleranceConfig>,
    /// Replaces the relaxation derived from the frame calibration state.
    #[serde(default)]
    pub relaxation: Option<Relaxation>,
    pub vision_result: VisionResult,
}

impl FeatureJob {
    pub fn build_frame(&self) -> FeederFrame {
        self.fiducials.build_frame()
    }

    pub fn build_config(&self) -> ToleranceConfig {
        self.tolerance.clone().unwrap_or_else(|| {
            ToleranceConfig::for_pockets(self.pocket_pitch_mm, self.pocket_size_mm)
        })
    }

    pub fn build_relaxation<F: FeatureFrame + ?Sized>(&self, frame: &F) -> Relaxation {
        self.relaxation.unwrap_or_else(|| Relaxation::for_frame(frame))
    }
}

/// Output of [`run_features`](crate::run_features).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub calibrated: bool,
    pub relaxation: Relaxation,
    pub tolerance: ToleranceConfig,
    pub num_candidates: usize,
    #[serde(default)]
    pub classified: Vec<ClassifiedCandidate>,
    #[serde(default)]
    pub features: FeatureSet,
    #[serde(default)]
    pub geometry: Option<PocketGeometry>,
    #[serde(default)]
    pub row: Option<RowFit>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FeatureReport {
    pub fn new(job: &FeatureJob, calibrated: bool, relaxation: Relaxation) -> Self {
        Self {
            calibrated,
            relaxation,
            tolerance: job.build_config(),
            num_candidates: job.vision_result.len(),
            classified: Vec::new(),
            features: FeatureSet::default(),
            geometry: None,
            row: None,
            error: None,
        }
    }

    /// Confidence of the row fit, zero without one.
    pub fn confidence(&self) -> usize {
        self.row.as_ref().map_or(0, RowFit::confidence)
    }

    pub fn set_error(&mut self, err: impl std::fmt::Display) {
        self.error = Some(err.to_string());
    }
}

/// Input of [`run_tray`](crate::run_tray).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrayJob {
    /// First component of the first row.
    pub a: Location,
    /// Last component of the first row.
    pub b: Location,
    /// Last component of the last row.
    pub c: Location,
    pub n_cols: u32,
    pub n_rows: u32,
    /// Rotation kept for single-cell trays.
    #[serde(default)]
    pub existing_rotation_deg: f64,
    /// Stored offsets to validate against the points instead of computing new ones.
    #[serde(default)]
    pub offsets: Option<TrayOffsets>,
    #[serde(default)]
    pub tolerance: Option<f64>,
    /// Number of components already fed; reports the next pick location.
    #[serde(default)]
    pub feed_count: Option<u32>,
}

/// Output of [`run_tray`](crate::run_tray).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrayReport {
    #[serde(default)]
    pub offsets: Option<TrayOffsets>,
    /// Whether stored offsets were checked against the points.
    #[serde(default)]
    pub validated: bool,
    #[serde(default)]
    pub next_pick: Option<Location>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TrayReport {
    pub fn set_error(&mut self, err: impl std::fmt::Display) {
        self.error = Some(err.to_string());
    }
}

/// Input of [`run_transform`](crate::run_transform).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformJob {
    /// Units, Z and rotation of the resulting translation.
    #[serde(default)]
    pub base: Location,
    pub local_a: Location,
    pub local_b: Location,
    pub captured_a: Location,
    pub captured_b: Location,
    /// Extra local points to map into machine space.
    #[serde(default)]
    pub points: Vec<Location>,
}

/// Output of [`run_transform`](crate::run_transform).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformReport {
    #[serde(default)]
    pub transform: Option<RigidTransform>,
    #[serde(default)]
    pub mapped: Vec<Location>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TransformReport {
    pub fn set_error(&mut self, err: impl std::fmt::Display) {
        self.error = Some(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_feature_job_uses_defaults() {
        let json = r#"{
            "camera": {
                "width": 640,
                "height": 480,
                "units_per_pixel": { "x": 0.05, "y": 0.05 }
            },
            "vision_result": { "type": "circles", "items": [] }
        }"#;
        let job: FeatureJob = serde_json::from_str(json).expect("job");
        assert_eq!(job.fiducials, FiducialConfig::default());
        assert_eq!(job.build_config(), ToleranceConfig::default());
        let frame = job.build_frame();
        assert!(!frame.is_calibrated());
        assert_eq!(job.build_relaxation(&frame), Relaxation::RELAXED);
    }

    #[test]
    fn relaxation_override_wins() {
        let json = r#"{
            "camera": {
                "width": 10,
                "height": 10,
                "units_per_pixel": { "x": 1.0, "y": 1.0 }
            },
            "relaxation": { "angle_tolerant": true },
            "vision_result": { "type": "rotated_rects", "items": [] }
        }"#;
        let job: FeatureJob = serde_json::from_str(json).expect("job");
        let relax = job.build_relaxation(&job.build_frame());
        assert!(relax.angle_tolerant);
        assert!(!relax.position_tolerant);
    }

    #[test]
    fn reports_round_trip_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tray.json");
        let report = TrayReport {
            offsets: Some(TrayOffsets {
                col_step: 4.0,
                row_step: -2.5,
                rotation_deg: 90.0,
            }),
            validated: true,
            next_pick: Some(Location::mm(1.0, 2.0)),
            error: None,
        };
        write_json(&report, &path).expect("write");
        let back: TrayReport = load_json(&path).expect("load");
        assert_eq!(back, report);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_json::<TrayJob>("/nonexistent/feeder-vision/job.json").unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
