//! Core geometry, unit and frame types for tape feeder vision.
//!
//! This crate is purely geometric. It knows how to move between image pixels,
//! machine coordinates and a feeder-local frame, but nothing about which
//! shapes are fiducials or pockets.

mod angle;
mod camera;
mod frame;
mod histogram;
mod location;
mod logger;
mod rect;
mod units;

pub use angle::{angle_norm, angle_norm_180, angle_norm_45, rect_angle_deviation};
pub use camera::{CameraView, UnitsPerPixel};
pub use frame::{FeatureFrame, FeederFrame};
pub use histogram::Histogram;
pub use location::Location;
pub use rect::{Circle, RotatedRect, Size2, VisionResult};
pub use units::{Length, LengthUnit};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_env, parse_level, LOG_ENV};
