//! Pocket size, centerline, pitch and position estimated from one camera pass.

use crate::classify::FeatureSet;
use crate::params::Relaxation;
use feeder_vision_core::{CameraView, FeatureFrame, Histogram, LengthUnit};
use log::debug;
use serde::{Deserialize, Serialize};

const CORNER_RESOLUTION_MM: f64 = 0.1;
const PITCH_RESOLUTION_MM: f64 = 2.0;
const POSITION_RESOLUTION_MM: f64 = 0.05;

/// Tape geometry in the feeder frame. Statistics without data are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PocketGeometry {
    /// Pocket extent across the tape.
    pub size_mm: Option<f64>,
    /// Feeder Y of the pocket centerline, rounded to whole millimeters.
    pub centerline_mm: Option<f64>,
    pub pitch_mm: Option<f64>,
    /// Feeder X of the pocket grid, in `[0, pitch]`.
    pub position_mm: Option<f64>,
}

/// Estimate the pocket geometry from the accepted pockets of one pass.
///
/// Corner statistics need position gating: with `relax.position_tolerant`
/// set, size and centerline stay `None`. A non-zero `configured_pitch_mm`
/// takes precedence over the estimated pitch for the position statistic.
pub fn estimate_pocket_geometry<F: FeatureFrame + ?Sized>(
    features: &FeatureSet,
    camera: &CameraView,
    frame: &F,
    configured_pitch_mm: f64,
    relax: Relaxation,
) -> PocketGeometry {
    let to_feeder_mm = |px| {
        frame
            .machine_to_feeder(&camera.pixel_to_machine(px))
            .convert_to_units(LengthUnit::Millimeters)
    };
    let camera_feeder = frame
        .machine_to_feeder(&camera.location)
        .convert_to_units(LengthUnit::Millimeters);

    let mut upper = Histogram::new(CORNER_RESOLUTION_MM);
    let mut lower = Histogram::new(CORNER_RESOLUTION_MM);
    if !relax.position_tolerant {
        for pocket in &features.pockets {
            for corner in pocket.candidate.corners() {
                let y = to_feeder_mm(corner).y;
                if y < camera_feeder.y {
                    lower.add(y, 1.0);
                } else {
                    upper.add(y, 1.0);
                }
            }
        }
    }
    let (best_lower, best_upper) = (lower.maximum_key(), upper.maximum_key());
    let (size_mm, centerline_mm) = match (best_lower, best_upper) {
        (Some(lo), Some(hi)) => (Some(hi - lo), Some(((hi + lo) * 0.5).round())),
        _ => (None, None),
    };

    let mut pitches = Histogram::new(PITCH_RESOLUTION_MM);
    for pair in features.pockets.windows(2) {
        pitches.add(pair[1].measurement.center_mm.x - pair[0].measurement.center_mm.x, 1.0);
    }
    let pitch_mm = pitches.maximum_key();

    let position_pitch = if configured_pitch_mm > 0.0 {
        Some(configured_pitch_mm)
    } else {
        pitch_mm.filter(|p| *p > 0.0)
    };
    let position_mm = position_pitch.and_then(|pitch| {
        let mut positions = Histogram::new(POSITION_RESOLUTION_MM);
        let range = 2.0 + pitch * 1.5;
        for pocket in &features.pockets {
            let x = pocket.measurement.center_mm.x;
            if (x - camera_feeder.x).abs() < range {
                let position = x.rem_euclid(pitch);
                // Neighbouring periods let the kernel see across the wrap-around.
                positions.add(position - pitch, 1.0);
                positions.add(position, 1.0);
                positions.add(position + pitch, 1.0);
            }
        }
        positions.maximum_key().map(|mut p| {
            if p < 0.0 {
                p += pitch;
            }
            if p > pitch {
                p -= pitch;
            }
            p
        })
    });

    debug!(
        "pocket geometry: size {size_mm:?}, centerline {centerline_mm:?}, pitch {pitch_mm:?}, position {position_mm:?}"
    );
    PocketGeometry {
        size_mm,
        centerline_mm,
        pitch_mm,
        position_mm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::params::ToleranceConfig;
    use approx::assert_abs_diff_eq;
    use feeder_vision_core::{FeederFrame, Location, RotatedRect, Size2, UnitsPerPixel};

    #[test]
    fn recovers_tape_geometry_from_pocket_row() {
        // 0.05 mm/px; camera centered on feeder (10, 3).
        let camera = CameraView::new(
            640,
            480,
            UnitsPerPixel::isotropic(0.05, LengthUnit::Millimeters),
            Location::mm(10.0, 3.0),
        );
        let frame = FeederFrame::identity();
        // 2.4 mm pockets at 4 mm pitch, centers at X = 3 + 4k mm, Y = 3 mm.
        let rects: Vec<RotatedRect> = [-1.0, 3.0, 7.0, 11.0, 15.0, 19.0, 23.0]
            .iter()
            .map(|x: &f64| {
                let px = camera.machine_to_pixel(&Location::mm(*x, 3.0));
                RotatedRect::new(px, Size2::new(48.0, 48.0), 0.0)
            })
            .collect();
        let config = ToleranceConfig::for_pockets(4.0, 2.0);
        let classified = classify(&rects, &camera, &frame, &config, Relaxation::RELAXED);
        let features = FeatureSet::from_classified(&classified);
        assert_eq!(features.pockets.len(), 7);

        let relaxed =
            estimate_pocket_geometry(&features, &camera, &frame, 0.0, Relaxation::RELAXED);
        assert!(relaxed.size_mm.is_none());
        assert_abs_diff_eq!(relaxed.pitch_mm.unwrap_or(f64::NAN), 4.0);

        let strict = estimate_pocket_geometry(&features, &camera, &frame, 0.0, Relaxation::STRICT);
        assert_abs_diff_eq!(strict.size_mm.unwrap_or(f64::NAN), 2.4, epsilon = 1e-9);
        assert_abs_diff_eq!(strict.centerline_mm.unwrap_or(f64::NAN), 3.0);
        assert_abs_diff_eq!(strict.position_mm.unwrap_or(f64::NAN), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_feature_set_has_no_statistics() {
        let camera = CameraView::new(
            640,
            480,
            UnitsPerPixel::isotropic(0.05, LengthUnit::Millimeters),
            Location::mm(0.0, 0.0),
        );
        let g = estimate_pocket_geometry(
            &FeatureSet::default(),
            &camera,
            &FeederFrame::identity(),
            4.0,
            Relaxation::STRICT,
        );
        assert_eq!(g, PocketGeometry::default());
    }
}
