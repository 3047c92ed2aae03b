//! Fiducial/pocket classification of rotated-rectangle candidates.
//!
//! Every candidate runs through a fixed sequence of gates: image margin,
//! proximity to the camera center, then independent orientation and size
//! windows for fiducials (diamonds at 45°) and pockets (axis-aligned with the
//! tape). Relaxation flags disable the orientation and proximity gates while a
//! feeder frame is not yet anchored on fiducials.
//!
//! The fiducial and pocket gates are independent. A candidate passing both is
//! labelled [`Classification::Fiducial`], but [`FeatureSet`] lists it among
//! the fiducials and the pockets alike.

use crate::error::{FeatureError, FeatureKind};
use crate::params::{Relaxation, ToleranceConfig, MARGIN_PX, POSITION_RADIUS_MM};
use feeder_vision_core::{
    rect_angle_deviation, CameraView, FeatureFrame, LengthUnit, RotatedRect, Size2, VisionResult,
};
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Outcome of classifying one candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Fiducial,
    Pocket,
    Rejected,
}

/// Candidate measurements in the feeder frame, in millimeters and degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub center_mm: Point2<f64>,
    pub size_mm: Size2,
    /// Orientation in the feeder frame.
    pub angle_deg: f64,
    /// Planar distance to the camera center.
    pub distance_mm: f64,
}

/// Which gates a candidate passed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    pub at_margin: bool,
    pub position: bool,
    pub fiducial_angle: bool,
    pub fiducial_size: bool,
    pub pocket_angle: bool,
    pub pocket_size: bool,
}

impl GateReport {
    pub fn is_fiducial(&self) -> bool {
        !self.at_margin && self.position && self.fiducial_angle && self.fiducial_size
    }

    pub fn is_pocket(&self) -> bool {
        !self.at_margin && self.position && self.pocket_angle && self.pocket_size
    }

    fn classification(&self) -> Classification {
        if self.is_fiducial() {
            Classification::Fiducial
        } else if self.is_pocket() {
            Classification::Pocket
        } else {
            Classification::Rejected
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedCandidate {
    pub candidate: RotatedRect,
    pub classification: Classification,
    pub measurement: Measurement,
    pub gates: GateReport,
}

/// Check that a vision result carries rotated rectangles.
pub fn expect_rotated_rects(result: VisionResult) -> Result<Vec<RotatedRect>, FeatureError> {
    match result {
        VisionResult::RotatedRects(rects) => Ok(rects),
        other => Err(FeatureError::UnrecognizedResultType {
            found: other.type_name(),
        }),
    }
}

fn within(value: f64, min: f64, max: f64) -> bool {
    value > min && value < max
}

fn fits_window(size: &Size2, min: f64, max: f64, max_aspect: f64) -> bool {
    within(size.width, min, max)
        && within(size.height, min, max)
        && size.width / size.height < max_aspect
        && size.height / size.width < max_aspect
}

/// Measure one candidate in the feeder frame.
pub fn measure<F: FeatureFrame + ?Sized>(
    candidate: &RotatedRect,
    camera: &CameraView,
    frame: &F,
) -> Measurement {
    let center = frame
        .machine_to_feeder(&camera.pixel_to_machine(candidate.center))
        .convert_to_units(LengthUnit::Millimeters);
    let camera_center = frame
        .machine_to_feeder(&camera.location)
        .convert_to_units(LengthUnit::Millimeters);
    let (width, height) = camera.pixel_size_mm(candidate.size.width, candidate.size.height);
    Measurement {
        center_mm: center.xy_point(),
        size_mm: Size2::new(width, height),
        angle_deg: frame.pixel_to_feeder_angle(candidate.angle_deg),
        distance_mm: camera_center.linear_distance_to(&center),
    }
}

/// Classify a single candidate.
pub fn classify_one<F: FeatureFrame + ?Sized>(
    candidate: &RotatedRect,
    camera: &CameraView,
    frame: &F,
    config: &ToleranceConfig,
    relax: Relaxation,
) -> ClassifiedCandidate {
    let measurement = measure(candidate, camera, frame);
    let at_margin = camera.is_at_margin(candidate, MARGIN_PX);
    let tol = config.angle_tolerance_deg;
    let gates = GateReport {
        at_margin,
        position: relax.position_tolerant || measurement.distance_mm <= POSITION_RADIUS_MM,
        fiducial_angle: relax.angle_tolerant
            || rect_angle_deviation(measurement.angle_deg, 45.0) <= tol,
        fiducial_size: fits_window(
            &measurement.size_mm,
            config.fiducial_min_mm,
            config.fiducial_max_mm,
            config.fiducial_max_aspect,
        ),
        pocket_angle: relax.angle_tolerant
            || rect_angle_deviation(measurement.angle_deg, 0.0) <= tol,
        pocket_size: fits_window(
            &measurement.size_mm,
            config.pocket_min_mm,
            config.pocket_max_mm,
            config.pocket_max_aspect,
        ),
    };
    let classification = gates.classification();
    debug!(
        "{:?} candidate at ({:.3}, {:.3}) mm, size {:.3}x{:.3} mm, angle {:.2}: {:?}",
        classification,
        measurement.center_mm.x,
        measurement.center_mm.y,
        measurement.size_mm.width,
        measurement.size_mm.height,
        measurement.angle_deg,
        gates
    );
    ClassifiedCandidate {
        candidate: *candidate,
        classification,
        measurement,
        gates,
    }
}

/// Classify all candidates, preserving input order.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(candidates, camera, frame, config),
        fields(n = candidates.len())
    )
)]
pub fn classify<F: FeatureFrame + ?Sized>(
    candidates: &[RotatedRect],
    camera: &CameraView,
    frame: &F,
    config: &ToleranceConfig,
    relax: Relaxation,
) -> Vec<ClassifiedCandidate> {
    candidates
        .iter()
        .map(|c| classify_one(c, camera, frame, config, relax))
        .collect()
}

/// Accepted features of one detection pass.
///
/// Membership follows the gates, not the label: a candidate passing both the
/// fiducial and the pocket gates appears in both lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Sorted by distance to the camera center, nearest first.
    pub fiducials: Vec<ClassifiedCandidate>,
    /// Sorted by feeder-local X.
    pub pockets: Vec<ClassifiedCandidate>,
}

impl FeatureSet {
    pub fn from_classified(classified: &[ClassifiedCandidate]) -> Self {
        let mut fiducials: Vec<_> = classified
            .iter()
            .filter(|c| c.gates.is_fiducial())
            .cloned()
            .collect();
        let mut pockets: Vec<_> = classified
            .iter()
            .filter(|c| c.gates.is_pocket())
            .cloned()
            .collect();
        fiducials.sort_by(|a, b| a.measurement.distance_mm.total_cmp(&b.measurement.distance_mm));
        pockets.sort_by(|a, b| a.measurement.center_mm.x.total_cmp(&b.measurement.center_mm.x));
        log::info!(
            "{} fiducials, {} pockets out of {} candidates",
            fiducials.len(),
            pockets.len(),
            classified.len()
        );
        Self { fiducials, pockets }
    }

    pub fn require_fiducials(&self) -> Result<&[ClassifiedCandidate], FeatureError> {
        if self.fiducials.is_empty() {
            return Err(FeatureError::NoFeaturesFound {
                kind: FeatureKind::Fiducial,
            });
        }
        Ok(&self.fiducials)
    }

    pub fn require_pockets(&self) -> Result<&[ClassifiedCandidate], FeatureError> {
        if self.pockets.is_empty() {
            return Err(FeatureError::NoFeaturesFound {
                kind: FeatureKind::Pocket,
            });
        }
        Ok(&self.pockets)
    }

    /// Pocket rectangles, in feeder-X order.
    pub fn pocket_rects(&self) -> Vec<RotatedRect> {
        self.pockets.iter().map(|c| c.candidate).collect()
    }
}
