//! High-level facade crate for the `feeder-vision-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - JSON job configs and reports ([`io`])
//! - end-to-end runners that take one job and produce one report
//! - (feature `cli`) the `feeder-vision` command-line tool
//!
//! ## Quickstart
//!
//! ```
//! use feeder_vision::io::FeatureJob;
//! use feeder_vision::run_features;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let job: FeatureJob = serde_json::from_str(r#"{
//!     "camera": { "width": 640, "height": 480, "units_per_pixel": { "x": 0.05, "y": 0.05 } },
//!     "pocket_pitch_mm": 4.0,
//!     "pocket_size_mm": 2.6,
//!     "vision_result": { "type": "rotated_rects", "items": [
//!         { "center": [200.0, 240.0], "size": { "width": 52.0, "height": 52.0 }, "angle_deg": 0.0 },
//!         { "center": [280.0, 240.0], "size": { "width": 52.0, "height": 52.0 }, "angle_deg": 0.0 },
//!         { "center": [360.0, 240.0], "size": { "width": 52.0, "height": 52.0 }, "angle_deg": 0.0 }
//!     ] }
//! }"#)?;
//! let report = run_features(&job);
//! assert_eq!(report.confidence(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `feeder_vision::core`: units, locations, camera and feeder frames, histograms.
//! - `feeder_vision::features`: fiducial/pocket classification and row fitting.
//! - `feeder_vision::calib`: two-point transforms and tray offsets.
//! - `feeder_vision::io`: JSON jobs and reports for the runners.

pub use feeder_vision_calib as calib;
pub use feeder_vision_core as core;
pub use feeder_vision_features as features;

pub use feeder_vision_calib::{CalibrationError, RigidTransform, TrayOffsets};
pub use feeder_vision_core::{CameraView, FeederFrame, Location, RotatedRect, VisionResult};
pub use feeder_vision_features::{FeatureError, FeatureSet, RowFit, ToleranceConfig};

pub mod io;
mod pipeline;

pub use pipeline::{run_features, run_transform, run_tray, Error};
