//! Three-point tray calibration.
//!
//! A rectangular tray is defined by three captured points: the first
//! component of the first row (A), the last component of the first row (B)
//! and the last component of the last row (C). Columns run from A to B, rows
//! from B to C.

use crate::error::{CalibrationError, OffsetField, TrayAxis};
use feeder_vision_core::{angle_norm_180, Location};
use log::{debug, warn};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Maximum deviation of angle ABC from a right angle.
pub const RIGHT_ANGLE_TOLERANCE_DEG: f64 = 2.5;
/// Default tolerance for [`validate_consistency`], in length units and degrees.
pub const CONSISTENCY_TOLERANCE: f64 = 0.002;

const ZERO_LENGTH_EPS: f64 = 1e-9;

/// Pitch and orientation of a rectangular tray.
///
/// Steps are in the units of point A. Rows advance 90° counter-clockwise from
/// the column axis for a positive `row_step`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrayOffsets {
    pub col_step: f64,
    pub row_step: f64,
    /// Heading of the column axis, in `(-180°, 180°]`.
    pub rotation_deg: f64,
}

impl TrayOffsets {
    fn axes(&self) -> (Vector2<f64>, Vector2<f64>) {
        let (s, c) = self.rotation_deg.to_radians().sin_cos();
        (Vector2::new(c, s), Vector2::new(-s, c))
    }

    /// Location of the component at (`col`, `row`), zero-based, relative to `first`.
    ///
    /// Z and rotation are taken from `first`.
    pub fn pick_location(&self, first: &Location, col: u32, row: u32) -> Location {
        let (u, v) = self.axes();
        let xy = first.xy() + u * (col as f64 * self.col_step) + v * (row as f64 * self.row_step);
        first.with_xy(xy)
    }

    /// Location of the `feed_count`-th component (zero-based) in feed order.
    ///
    /// Components are fed along the longer tray side first: column by column
    /// when there are at least as many columns as rows, row by row otherwise.
    pub fn pick_location_for_feed(
        &self,
        first: &Location,
        feed_count: u32,
        n_cols: u32,
        n_rows: u32,
    ) -> Result<Location, CalibrationError> {
        let capacity = n_cols.saturating_mul(n_rows);
        if feed_count >= capacity {
            return Err(CalibrationError::TrayEmpty {
                feed_count,
                capacity,
            });
        }
        let (col, row) = if n_cols >= n_rows {
            (feed_count / n_rows, feed_count % n_rows)
        } else {
            (feed_count % n_cols, feed_count / n_cols)
        };
        Ok(self.pick_location(first, col, row))
    }
}

fn check_cardinality(axis: TrayAxis, length: f64, count: u32) -> Result<(), CalibrationError> {
    let spans = length > ZERO_LENGTH_EPS;
    if count == 0 || spans != (count > 1) {
        return Err(CalibrationError::CardinalityMismatch {
            axis,
            length,
            count,
        });
    }
    Ok(())
}

fn step(length: f64, count: u32) -> f64 {
    if count > 1 {
        length / (count - 1) as f64
    } else {
        0.0
    }
}

fn heading_deg(v: Vector2<f64>) -> f64 {
    v.y.atan2(v.x).to_degrees()
}

/// Compute column/row pitch and rotation from the three defining points.
///
/// `existing_rotation_deg` is kept for single-cell trays, whose rotation is
/// not constrained by the points.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(a, b, c)))]
pub fn compute_tray_offsets(
    a: &Location,
    b: &Location,
    c: &Location,
    n_cols: u32,
    n_rows: u32,
    existing_rotation_deg: f64,
) -> Result<TrayOffsets, CalibrationError> {
    let units = a.units;
    let (pa, pb, pc) = (
        a.xy(),
        b.convert_to_units(units).xy(),
        c.convert_to_units(units).xy(),
    );
    let ab = pb - pa;
    let bc = pc - pb;
    let ca = pa - pc;
    let (l1, l2, l3) = (ab.norm(), bc.norm(), ca.norm());

    check_cardinality(TrayAxis::Column, l1, n_cols)?;
    check_cardinality(TrayAxis::Row, l2, n_rows)?;

    if l1 > ZERO_LENGTH_EPS && l2 > ZERO_LENGTH_EPS {
        let cos_abc = ((l3 * l3 - l2 * l2 - l1 * l1) / (-2.0 * l1 * l2)).clamp(-1.0, 1.0);
        let angle_deg = cos_abc.acos().to_degrees();
        if (angle_deg - 90.0).abs() > RIGHT_ANGLE_TOLERANCE_DEG {
            warn!("tray corner angle {angle_deg:.3}° is not square");
            return Err(CalibrationError::RightAngleViolation {
                angle_deg,
                tolerance_deg: RIGHT_ANGLE_TOLERANCE_DEG,
            });
        }
    }

    let rotation_deg = if l1 > ZERO_LENGTH_EPS {
        heading_deg(ab)
    } else if l2 > ZERO_LENGTH_EPS {
        heading_deg(bc) + 90.0
    } else {
        existing_rotation_deg
    };
    let rotation_deg = angle_norm_180(rotation_deg);

    let mut row_step = step(l2, n_rows);
    // Orient rows so that a positive step follows B -> C in the pick frame.
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    if Vector2::new(cos, sin).perp(&bc) < 0.0 {
        row_step = -row_step;
    }

    let offsets = TrayOffsets {
        col_step: step(l1, n_cols),
        row_step,
        rotation_deg,
    };
    debug!(
        "tray offsets: col {:.4}, row {:.4}, rotation {:.4}° ({n_cols}x{n_rows})",
        offsets.col_step, offsets.row_step, offsets.rotation_deg
    );
    Ok(offsets)
}

fn check_field(
    field: OffsetField,
    provided: f64,
    computed: f64,
    difference: f64,
    tolerance: f64,
) -> Result<(), CalibrationError> {
    if difference.abs() > tolerance {
        return Err(CalibrationError::ConsistencyViolation {
            field,
            provided,
            computed,
            tolerance,
        });
    }
    Ok(())
}

/// Recompute the offsets from the defining points and check that `provided`
/// matches within `tolerance`. Returns the recomputed offsets.
pub fn validate_consistency(
    provided: &TrayOffsets,
    a: &Location,
    b: &Location,
    c: &Location,
    n_cols: u32,
    n_rows: u32,
    tolerance: f64,
) -> Result<TrayOffsets, CalibrationError> {
    let computed = compute_tray_offsets(a, b, c, n_cols, n_rows, provided.rotation_deg)?;
    check_field(
        OffsetField::ColumnStep,
        provided.col_step,
        computed.col_step,
        provided.col_step - computed.col_step,
        tolerance,
    )?;
    check_field(
        OffsetField::RowStep,
        provided.row_step,
        computed.row_step,
        provided.row_step - computed.row_step,
        tolerance,
    )?;
    check_field(
        OffsetField::Rotation,
        provided.rotation_deg,
        computed.rotation_deg,
        angle_norm_180(provided.rotation_deg - computed.rotation_deg),
        tolerance,
    )?;
    Ok(computed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn single_column_tray_steps_towards_c() {
        let a = Location::mm(5.0, 5.0);
        let c = Location::mm(5.0, 15.0);
        let t = compute_tray_offsets(&a, &a, &c, 1, 3, 0.0).expect("offsets");
        assert_abs_diff_eq!(t.col_step, 0.0);
        assert_abs_diff_eq!(t.rotation_deg, 180.0, epsilon = 1e-9);
        let last = t.pick_location(&a, 0, 2);
        assert_abs_diff_eq!(last.x, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(last.y, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn clockwise_pick_negates_row_step() {
        let a = Location::mm(0.0, 0.0);
        let b = Location::mm(10.0, 0.0);
        let c = Location::mm(10.0, -5.0);
        let t = compute_tray_offsets(&a, &b, &c, 3, 2, 0.0).expect("offsets");
        assert_abs_diff_eq!(t.row_step, -5.0, epsilon = 1e-12);
        let p = t.pick_location(&a, 2, 1);
        assert_abs_diff_eq!(p.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, -5.0, epsilon = 1e-9);
    }

    #[test]
    fn single_cell_keeps_existing_rotation() {
        let a = Location::mm(1.0, 1.0);
        let t = compute_tray_offsets(&a, &a, &a, 1, 1, 33.0).expect("offsets");
        assert_eq!(
            t,
            TrayOffsets {
                col_step: 0.0,
                row_step: 0.0,
                rotation_deg: 33.0
            }
        );
    }

    #[test]
    fn zero_count_is_a_mismatch() {
        let a = Location::mm(0.0, 0.0);
        let err = compute_tray_offsets(&a, &a, &a, 0, 1, 0.0).unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::CardinalityMismatch {
                axis: TrayAxis::Column,
                count: 0,
                ..
            }
        ));
    }

    #[test]
    fn feed_order_follows_longer_side() {
        let t = TrayOffsets {
            col_step: 10.0,
            row_step: 5.0,
            rotation_deg: 0.0,
        };
        let first = Location::mm(0.0, 0.0);
        // 3 columns x 2 rows: down each column first.
        let p = t.pick_location_for_feed(&first, 3, 3, 2).expect("part");
        assert_abs_diff_eq!(p.x, 10.0);
        assert_abs_diff_eq!(p.y, 5.0);
        // 2 columns x 3 rows: along each row first.
        let p = t.pick_location_for_feed(&first, 3, 2, 3).expect("part");
        assert_abs_diff_eq!(p.x, 10.0);
        assert_abs_diff_eq!(p.y, 5.0);
        let p = t.pick_location_for_feed(&first, 4, 2, 3).expect("part");
        assert_abs_diff_eq!(p.x, 0.0);
        assert_abs_diff_eq!(p.y, 10.0);
        assert_eq!(
            t.pick_location_for_feed(&first, 6, 2, 3).unwrap_err(),
            CalibrationError::TrayEmpty {
                feed_count: 6,
                capacity: 6
            }
        );
    }
}
