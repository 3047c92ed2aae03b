use serde::{Deserialize, Serialize};
use std::fmt;

/// Tray axis named in cardinality errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrayAxis {
    Column,
    Row,
}

impl fmt::Display for TrayAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrayAxis::Column => f.write_str("column"),
            TrayAxis::Row => f.write_str("row"),
        }
    }
}

/// Tray offset value named in consistency errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetField {
    ColumnStep,
    RowStep,
    Rotation,
}

impl fmt::Display for OffsetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffsetField::ColumnStep => f.write_str("column step"),
            OffsetField::RowStep => f.write_str("row step"),
            OffsetField::Rotation => f.write_str("rotation"),
        }
    }
}

/// Errors returned by the calibrators.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: &'static str },
    #[error("{axis} edge length {length:.4} is inconsistent with {count} {axis}s")]
    CardinalityMismatch {
        axis: TrayAxis,
        length: f64,
        count: u32,
    },
    #[error("angle ABC is {angle_deg:.3}°, more than {tolerance_deg}° away from 90°")]
    RightAngleViolation { angle_deg: f64, tolerance_deg: f64 },
    #[error("{field} {provided:.4} differs from recomputed {computed:.4} by more than {tolerance}")]
    ConsistencyViolation {
        field: OffsetField,
        provided: f64,
        computed: f64,
        tolerance: f64,
    },
    #[error("tray is empty: feed count {feed_count} reached capacity {capacity}")]
    TrayEmpty { feed_count: u32, capacity: u32 },
}
