//! Fiducial and pocket features of tape feeders.
//!
//! [`classify`] labels rotated-rectangle detections as fiducials, pockets or
//! rejects. [`fit_row`] then finds the best-supported evenly pitched row among
//! the pockets, and [`estimate_pocket_geometry`] derives tape size, pitch and
//! position statistics from one camera pass.
//!
//! ## Quickstart
//!
//! ```
//! use feeder_vision_core::{
//!     CameraView, FeederFrame, LengthUnit, Location, RotatedRect, Size2, UnitsPerPixel,
//! };
//! use feeder_vision_features::{classify, fit_row, FeatureSet, Relaxation, ToleranceConfig};
//! use nalgebra::Point2;
//!
//! let camera = CameraView::new(
//!     640,
//!     480,
//!     UnitsPerPixel::isotropic(0.05, LengthUnit::Millimeters),
//!     Location::mm(0.0, 0.0),
//! );
//! // 2.6 mm pockets at 4 mm pitch.
//! let rects: Vec<RotatedRect> = (0..4)
//!     .map(|k| {
//!         let center = Point2::new(200.0 + 80.0 * k as f64, 240.0);
//!         RotatedRect::new(center, Size2::new(52.0, 52.0), 0.0)
//!     })
//!     .collect();
//! let config = ToleranceConfig::for_pockets(4.0, 2.6);
//! let frame = FeederFrame::identity();
//! let classified = classify(&rects, &camera, &frame, &config, Relaxation::for_frame(&frame));
//! let features = FeatureSet::from_classified(&classified);
//! let row = fit_row(&features.pocket_rects(), &camera.units_per_pixel, &config).unwrap();
//! assert_eq!(row.confidence(), 4);
//! ```

mod classify;
mod error;
mod geometry;
mod params;
mod row_fit;

pub use classify::{
    classify, classify_one, expect_rotated_rects, measure, Classification, ClassifiedCandidate,
    FeatureSet, GateReport, Measurement,
};
pub use error::{FeatureError, FeatureKind};
pub use geometry::{estimate_pocket_geometry, PocketGeometry};
pub use params::{
    Relaxation, ToleranceConfig, MARGIN_PX, POCKET_SIZE_TOLERANCE, POSITION_RADIUS_MM,
};
pub use row_fit::{
    fit_row, standard_pitch, LineModel, RowFit, MIN_ROW_SUPPORT, PITCH_TOLERANCE_MM,
};
