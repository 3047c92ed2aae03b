use crate::angle::angle_norm_180;
use crate::units::LengthUnit;
use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-space pose: X/Y/Z in `units`, rotation in degrees (counter-clockwise positive).
///
/// A `Location` is an immutable value. Binary operations convert the right-hand
/// operand into the units of `self` first.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub units: LengthUnit,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self::origin(LengthUnit::Millimeters)
    }
}

impl Location {
    pub const fn new(units: LengthUnit, x: f64, y: f64, z: f64, rotation: f64) -> Self {
        Self {
            units,
            x,
            y,
            z,
            rotation,
        }
    }

    /// Planar location in millimeters.
    pub const fn mm(x: f64, y: f64) -> Self {
        Self::new(LengthUnit::Millimeters, x, y, 0.0, 0.0)
    }

    pub const fn origin(units: LengthUnit) -> Self {
        Self::new(units, 0.0, 0.0, 0.0, 0.0)
    }

    pub fn convert_to_units(&self, units: LengthUnit) -> Location {
        if units == self.units {
            return *self;
        }
        let from = self.units;
        Location::new(
            units,
            from.convert(self.x, units),
            from.convert(self.y, units),
            from.convert(self.z, units),
            self.rotation,
        )
    }

    #[inline]
    pub fn xy(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    #[inline]
    pub fn xy_point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Copy with X and Y replaced; Z and rotation are kept.
    pub fn with_xy(&self, xy: Vector2<f64>) -> Location {
        Location {
            x: xy.x,
            y: xy.y,
            ..*self
        }
    }

    /// Planar (X/Y) distance in the units of `self`.
    pub fn linear_distance_to(&self, other: &Location) -> f64 {
        (other.convert_to_units(self.units).xy() - self.xy()).norm()
    }

    pub fn add(&self, other: &Location) -> Location {
        let o = other.convert_to_units(self.units);
        Location::new(
            self.units,
            self.x + o.x,
            self.y + o.y,
            self.z + o.z,
            self.rotation + o.rotation,
        )
    }

    pub fn subtract(&self, other: &Location) -> Location {
        let o = other.convert_to_units(self.units);
        Location::new(
            self.units,
            self.x - o.x,
            self.y - o.y,
            self.z - o.z,
            self.rotation - o.rotation,
        )
    }

    /// Scale X and Y; Z and rotation are kept.
    pub fn multiply_xy(&self, fx: f64, fy: f64) -> Location {
        Location {
            x: self.x * fx,
            y: self.y * fy,
            ..*self
        }
    }

    /// Rotate X/Y about the origin by `deg` (counter-clockwise positive).
    ///
    /// The rotation field itself is not touched.
    pub fn rotate_xy(&self, deg: f64) -> Location {
        if deg == 0.0 {
            return *self;
        }
        let r = Rotation2::new(angle_norm_180(deg).to_radians());
        self.with_xy(r * self.xy())
    }

    /// Rotate X/Y about `center` by `deg`.
    pub fn rotate_xy_about(&self, center: &Location, deg: f64) -> Location {
        let c = center.convert_to_units(self.units);
        let rotated = self.subtract(&c).rotate_xy(deg).add(&c);
        Location {
            z: self.z,
            rotation: self.rotation,
            ..rotated
        }
    }

    /// Copy with the given fields replaced.
    pub fn derive(
        &self,
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        rotation: Option<f64>,
    ) -> Location {
        Location::new(
            self.units,
            x.unwrap_or(self.x),
            y.unwrap_or(self.y),
            z.unwrap_or(self.z),
            rotation.unwrap_or(self.rotation),
        )
    }

    /// Planar midpoint; Z and rotation come from `self`.
    pub fn midpoint(&self, other: &Location) -> Location {
        let o = other.convert_to_units(self.units);
        self.with_xy((self.xy() + o.xy()) * 0.5)
    }

    /// Unit vector (X/Y only) pointing from `self` to `other`, if they differ.
    pub fn unit_vector_to(&self, other: &Location) -> Option<Vector2<f64>> {
        let d = other.convert_to_units(self.units).xy() - self.xy();
        let n = d.norm();
        (n > 0.0).then(|| d / n)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}, {:.6}, {:.6} {})",
            self.x, self.y, self.z, self.rotation, self.units
        )
    }
}
