//! Two-point rigid transform between a local frame and machine space.

use crate::error::CalibrationError;
use feeder_vision_core::{angle_norm_180, Location};
use log::debug;
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

const COINCIDENT_EPS: f64 = 1e-9;

/// Rotation plus translation mapping local coordinates into machine space.
///
/// `translation` is the caller's base location with X/Y replaced; its Z and
/// rotation fields are carried through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// Counter-clockwise, in `(-180°, 180°]`.
    pub rotation_deg: f64,
    pub translation: Location,
}

impl RigidTransform {
    fn rotation(&self) -> Rotation2<f64> {
        Rotation2::new(self.rotation_deg.to_radians())
    }

    /// Map a local point into machine space. The point's rotation is offset
    /// by the transform rotation.
    pub fn apply(&self, local: &Location) -> Location {
        let l = local.convert_to_units(self.translation.units);
        let xy = self.rotation() * l.xy() + self.translation.xy();
        Location::new(
            l.units,
            xy.x,
            xy.y,
            l.z,
            angle_norm_180(l.rotation + self.rotation_deg),
        )
    }

    /// Map a machine point back into the local frame.
    pub fn inverse_apply(&self, machine: &Location) -> Location {
        let m = machine.convert_to_units(self.translation.units);
        let xy = self.rotation().inverse() * (m.xy() - self.translation.xy());
        Location::new(
            m.units,
            xy.x,
            xy.y,
            m.z,
            angle_norm_180(m.rotation - self.rotation_deg),
        )
    }
}

fn direction(from: &Location, to: &Location) -> Vector2<f64> {
    to.xy() - from.xy()
}

/// Estimate the rigid motion taking `local_a`/`local_b` onto
/// `captured_a`/`captured_b`.
///
/// The rotation is the heading difference of the two point pairs; the
/// translation aligns the pair midpoints. Points are converted to the units
/// of `base`, whose X/Y are replaced by the estimated translation.
pub fn compute_transform(
    base: &Location,
    local_a: &Location,
    local_b: &Location,
    captured_a: &Location,
    captured_b: &Location,
) -> Result<RigidTransform, CalibrationError> {
    let units = base.units;
    let (la, lb) = (local_a.convert_to_units(units), local_b.convert_to_units(units));
    let (ca, cb) = (
        captured_a.convert_to_units(units),
        captured_b.convert_to_units(units),
    );

    let dl = direction(&la, &lb);
    let dc = direction(&ca, &cb);
    if dl.norm() < COINCIDENT_EPS {
        return Err(CalibrationError::DegenerateInput {
            reason: "local reference points coincide",
        });
    }
    if dc.norm() < COINCIDENT_EPS {
        return Err(CalibrationError::DegenerateInput {
            reason: "captured reference points coincide",
        });
    }

    let rotation_deg = angle_norm_180((dc.y.atan2(dc.x) - dl.y.atan2(dl.x)).to_degrees());
    let source_mid = la.midpoint(&lb).xy();
    let dest_mid = ca.midpoint(&cb).xy();
    let translation = dest_mid - Rotation2::new(rotation_deg.to_radians()) * source_mid;

    let scale_error = dc.norm() - dl.norm();
    debug!(
        "two-point transform: rotation {rotation_deg:.4}°, translation ({:.4}, {:.4}), span difference {scale_error:.4}",
        translation.x, translation.y
    );
    Ok(RigidTransform {
        rotation_deg,
        translation: base.with_xy(translation),
    })
}
