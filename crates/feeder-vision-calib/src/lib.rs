//! Coordinate calibration for pick-and-place feeders.
//!
//! - [`compute_transform`]: rigid motion (rotation + translation) from two
//!   local/captured point pairs.
//! - [`compute_tray_offsets`]: column/row pitch and rotation of a rectangular
//!   tray from three captured corners, with cardinality and right-angle checks.
//! - [`validate_consistency`]: catch offsets edited out of sync with their
//!   defining points.
//!
//! All functions are pure and report violated geometric invariants as
//! [`CalibrationError`].

mod error;
mod transform;
mod tray;

pub use error::{CalibrationError, OffsetField, TrayAxis};
pub use transform::{compute_transform, RigidTransform};
pub use tray::{
    compute_tray_offsets, validate_consistency, TrayOffsets, CONSISTENCY_TOLERANCE,
    RIGHT_ANGLE_TOLERANCE_DEG,
};
