//! Feeder-local coordinate frames.
//!
//! A feeder frame maps machine coordinates onto the coordinate system of a
//! tape feeder: X along the tape, Y across it. Feature classification only
//! needs the [`FeatureFrame`] trait; [`FeederFrame`] is the affine frame
//! defined by up to three fiducials.

use crate::location::Location;
use crate::units::LengthUnit;
use nalgebra::{Matrix2, Vector2};

/// Mapping between machine space and a feeder-local frame.
pub trait FeatureFrame {
    fn feeder_to_machine(&self, feeder: &Location) -> Location;

    fn machine_to_feeder(&self, machine: &Location) -> Location;

    /// Rotation of the feeder X axis in machine space, degrees.
    fn feeder_to_machine_rotation(&self) -> f64;

    fn machine_to_feeder_rotation(&self) -> f64 {
        -self.feeder_to_machine_rotation()
    }

    /// Convert a pixel-frame rectangle angle into the feeder frame.
    ///
    /// Pixel angles are left-handed (image Y points down), hence the sign flip.
    fn pixel_to_feeder_angle(&self, pixel_deg: f64) -> f64 {
        -(pixel_deg + self.machine_to_feeder_rotation())
    }

    /// Whether the frame is anchored on measured fiducials.
    fn is_calibrated(&self) -> bool;
}

/// Affine feeder frame built from fiducials.
#[derive(Clone, Debug, PartialEq)]
pub struct FeederFrame {
    origin: Location,
    axis_x: Vector2<f64>,
    axis_y: Vector2<f64>,
    inverse: Matrix2<f64>,
    rotation_deg: f64,
    calibrated: bool,
    tape_length: Option<f64>,
    extent: Option<f64>,
}

impl FeederFrame {
    /// Identity frame at the machine origin (millimeters).
    pub fn identity() -> Self {
        Self::uncalibrated(Location::origin(LengthUnit::Millimeters))
    }

    /// Translation-only frame anchored at `origin`.
    pub fn uncalibrated(origin: Location) -> Self {
        Self {
            origin,
            axis_x: Vector2::x(),
            axis_y: Vector2::y(),
            inverse: Matrix2::identity(),
            rotation_deg: 0.0,
            calibrated: false,
            tape_length: None,
            extent: None,
        }
    }

    /// Build the frame from fiducial 1 (origin), fiducial 2 (X axis) and an
    /// optional fiducial 3 (Y axis).
    ///
    /// Unless `normalize` is set, the 1–2 distance is snapped to a 2 mm
    /// multiple and the 3-to-reference distance to a 1 mm multiple, matching
    /// the nominal geometry of printed feeders. With `normalize`, the Y axis is
    /// always the X axis rotated by +90°. Missing or coincident (< 1 mm)
    /// fiducials 1/2 yield an uncalibrated frame anchored at fiducial 1.
    pub fn from_fiducials(
        fiducial1: Option<&Location>,
        fiducial2: Option<&Location>,
        fiducial3: Option<&Location>,
        normalize: bool,
    ) -> Self {
        let origin = fiducial1
            .copied()
            .unwrap_or_else(|| Location::origin(LengthUnit::Millimeters));
        let units = origin.units;
        let mm = LengthUnit::Millimeters.convert(1.0, units);

        let Some(f2) = fiducial2.map(|f| f.convert_to_units(units)) else {
            return Self::uncalibrated(origin);
        };
        let mut distance = origin.linear_distance_to(&f2);
        if fiducial1.is_none() || distance <= mm {
            log::debug!("fiducials 1/2 unset or coincident, using uncalibrated frame");
            return Self::uncalibrated(origin);
        }
        if !normalize {
            distance = (distance / 2.0 / mm).round() * 2.0 * mm;
        }
        let tape_length = (distance / 2.0 / mm).round() * 2.0 * mm;
        let axis_x = (f2.xy() - origin.xy()) / distance;

        let f3 = fiducial3.map(|f| f.convert_to_units(units));
        let (reference, d3) = match f3 {
            Some(f3) => {
                let reference = if f3.linear_distance_to(&f2) < f3.linear_distance_to(&origin) {
                    f2
                } else {
                    origin
                };
                (reference, reference.linear_distance_to(&f3))
            }
            None => (origin, 0.0),
        };

        let (axis_y, extent) = match f3 {
            Some(f3) if !normalize && d3 >= mm => {
                let d3 = (d3 / mm).round() * mm;
                ((f3.xy() - reference.xy()) / d3, Some(d3))
            }
            Some(_) => (
                Vector2::new(-axis_x.y, axis_x.x),
                Some((d3 / mm).round() * mm),
            ),
            None => (Vector2::new(-axis_x.y, axis_x.x), None),
        };

        let forward = Matrix2::from_columns(&[axis_x, axis_y]);
        let Some(inverse) = forward.try_inverse() else {
            log::warn!("fiducial 3 is collinear with fiducials 1/2, using uncalibrated frame");
            return Self::uncalibrated(origin);
        };

        Self {
            origin,
            axis_x,
            axis_y,
            inverse,
            rotation_deg: axis_x.y.atan2(axis_x.x).to_degrees(),
            calibrated: true,
            tape_length: Some(tape_length),
            extent,
        }
    }

    pub fn origin(&self) -> &Location {
        &self.origin
    }

    pub fn axis_x(&self) -> Vector2<f64> {
        self.axis_x
    }

    pub fn axis_y(&self) -> Vector2<f64> {
        self.axis_y
    }

    /// Nominal fiducial 1–2 distance, snapped to 2 mm, in origin units.
    pub fn tape_length(&self) -> Option<f64> {
        self.tape_length
    }

    /// Nominal feeder extent across the tape (fiducial 3 distance), in origin units.
    pub fn extent(&self) -> Option<f64> {
        self.extent
    }
}

impl Default for FeederFrame {
    fn default() -> Self {
        Self::identity()
    }
}

impl FeatureFrame for FeederFrame {
    fn feeder_to_machine(&self, feeder: &Location) -> Location {
        let f = feeder.convert_to_units(self.origin.units);
        let xy = self.origin.xy() + self.axis_x * f.x + self.axis_y * f.y;
        Location::new(
            self.origin.units,
            xy.x,
            xy.y,
            f.z,
            f.rotation + self.rotation_deg,
        )
    }

    fn machine_to_feeder(&self, machine: &Location) -> Location {
        let m = machine.convert_to_units(self.origin.units);
        let xy = self.inverse * (m.xy() - self.origin.xy());
        Location::new(
            self.origin.units,
            xy.x,
            xy.y,
            m.z,
            m.rotation - self.rotation_deg,
        )
    }

    fn feeder_to_machine_rotation(&self) -> f64 {
        self.rotation_deg
    }

    fn is_calibrated(&self) -> bool {
        self.calibrated
    }
}
