use feeder_vision_core::FeatureFrame;
use serde::{Deserialize, Serialize};

/// Border band in pixels; rectangles touching it are only partially imaged.
pub const MARGIN_PX: f64 = 2.0;
/// Radius around the projected camera center inside which features are accepted.
pub const POSITION_RADIUS_MM: f64 = 5.0;
/// Relative tolerance applied to the nominal pocket size window.
pub const POCKET_SIZE_TOLERANCE: f64 = 1.4;

/// Size, aspect and angle windows used to tell fiducials from pockets.
///
/// All lengths are in millimeters, measured in the feeder frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    pub fiducial_min_mm: f64,
    pub fiducial_max_mm: f64,
    /// Maximum width/height ratio of a fiducial, in both directions.
    pub fiducial_max_aspect: f64,
    pub pocket_min_mm: f64,
    pub pocket_max_mm: f64,
    /// Maximum width/height ratio of a pocket, in both directions.
    pub pocket_max_aspect: f64,
    /// Maximum deviation from the reference orientation (modulo 90°).
    pub angle_tolerance_deg: f64,
    /// Maximum width/height difference between pockets of the same row.
    pub size_tolerance_mm: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self::for_pockets(0.0, 0.0)
    }
}

impl ToleranceConfig {
    /// Derive the pocket window from the configured pocket pitch and size.
    ///
    /// Zero (unset) values fall back to a wide window so that a feeder can be
    /// set up before its tape geometry is known.
    pub fn for_pockets(pitch_mm: f64, size_mm: f64) -> Self {
        let w = pitch_mm * 0.5;
        let h = size_mm;
        let t = POCKET_SIZE_TOLERANCE;
        let mut pocket_min_mm = w.min(h) / t;
        let mut pocket_max_mm = w.max(h) * t;
        let mut pocket_max_aspect = if pocket_min_mm > 0.0 {
            t * t * pocket_max_mm / pocket_min_mm
        } else {
            0.0
        };
        if pocket_max_mm <= 0.0 {
            pocket_max_mm = 22.0;
            pocket_max_aspect = 2.0;
        }
        if pocket_min_mm <= 0.0 {
            pocket_min_mm = 0.5;
            pocket_max_aspect = 3.0;
        }
        Self {
            fiducial_min_mm: 1.4,
            fiducial_max_mm: 2.3,
            fiducial_max_aspect: 1.3,
            pocket_min_mm,
            pocket_max_mm,
            pocket_max_aspect,
            angle_tolerance_deg: 20.0,
            size_tolerance_mm: 1.0,
        }
    }
}

/// Gates that can be switched off during first-time setup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relaxation {
    /// Skip the orientation gates.
    pub angle_tolerant: bool,
    /// Skip the proximity gate around the camera center.
    pub position_tolerant: bool,
}

impl Relaxation {
    pub const STRICT: Relaxation = Relaxation {
        angle_tolerant: false,
        position_tolerant: false,
    };

    pub const RELAXED: Relaxation = Relaxation {
        angle_tolerant: true,
        position_tolerant: true,
    };

    /// Relax both gates while the frame is not anchored on fiducials.
    pub fn for_frame<F: FeatureFrame + ?Sized>(frame: &F) -> Self {
        if frame.is_calibrated() {
            Self::STRICT
        } else {
            Self::RELAXED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use feeder_vision_core::{FeederFrame, Location};

    #[test]
    fn unset_geometry_uses_fallback_window() {
        let c = ToleranceConfig::default();
        assert_relative_eq!(c.pocket_min_mm, 0.5);
        assert_relative_eq!(c.pocket_max_mm, 22.0);
        assert_relative_eq!(c.pocket_max_aspect, 3.0);
    }

    #[test]
    fn unset_size_keeps_pitch_derived_maximum() {
        let c = ToleranceConfig::for_pockets(4.0, 0.0);
        assert_relative_eq!(c.pocket_min_mm, 0.5);
        assert_relative_eq!(c.pocket_max_mm, 2.8, epsilon = 1e-12);
        assert_relative_eq!(c.pocket_max_aspect, 3.0);
    }

    #[test]
    fn configured_geometry_derives_window() {
        let c = ToleranceConfig::for_pockets(4.0, 2.0);
        assert_relative_eq!(c.pocket_min_mm, 2.0 / 1.4, epsilon = 1e-12);
        assert_relative_eq!(c.pocket_max_mm, 2.8, epsilon = 1e-12);
        assert_relative_eq!(c.pocket_max_aspect, 1.4 * 1.4 * 2.8 * 1.4 / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn uncalibrated_frame_relaxes_gates() {
        assert_eq!(Relaxation::for_frame(&FeederFrame::identity()), Relaxation::RELAXED);
        let f1 = Location::mm(0.0, 0.0);
        let f2 = Location::mm(40.0, 0.0);
        let frame = FeederFrame::from_fiducials(Some(&f1), Some(&f2), None, false);
        assert_eq!(Relaxation::for_frame(&frame), Relaxation::STRICT);
    }
}
