use serde::{Deserialize, Serialize};
use std::fmt;

/// Length units understood by locations and lengths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    #[default]
    Millimeters,
    Centimeters,
    Meters,
    Inches,
    Feet,
}

impl LengthUnit {
    /// Size of one unit in millimeters.
    #[inline]
    pub fn mm_per_unit(self) -> f64 {
        match self {
            LengthUnit::Millimeters => 1.0,
            LengthUnit::Centimeters => 10.0,
            LengthUnit::Meters => 1000.0,
            LengthUnit::Inches => 25.4,
            LengthUnit::Feet => 25.4 * 12.0,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            LengthUnit::Millimeters => "mm",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Meters => "m",
            LengthUnit::Inches => "in",
            LengthUnit::Feet => "ft",
        }
    }

    /// Convert a scalar `value` expressed in `self` into `to`.
    #[inline]
    pub fn convert(self, value: f64, to: LengthUnit) -> f64 {
        if self == to {
            return value;
        }
        value * self.mm_per_unit() / to.mm_per_unit()
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A scalar length with units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f64,
    #[serde(default)]
    pub units: LengthUnit,
}

impl Length {
    pub const fn new(value: f64, units: LengthUnit) -> Self {
        Self { value, units }
    }

    pub const fn mm(value: f64) -> Self {
        Self::new(value, LengthUnit::Millimeters)
    }

    pub fn convert_to_units(self, units: LengthUnit) -> Self {
        Self::new(self.units.convert(self.value, units), units)
    }

    /// Value in millimeters.
    #[inline]
    pub fn to_mm(self) -> f64 {
        self.units.convert(self.value, LengthUnit::Millimeters)
    }

    pub fn add(self, other: Length) -> Self {
        Self::new(self.value + other.convert_to_units(self.units).value, self.units)
    }

    pub fn subtract(self, other: Length) -> Self {
        Self::new(self.value - other.convert_to_units(self.units).value, self.units)
    }

    pub fn multiply(self, factor: f64) -> Self {
        Self::new(self.value * factor, self.units)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}{}", self.value, self.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn conversions_go_through_millimeters() {
        assert_relative_eq!(LengthUnit::Inches.convert(1.0, LengthUnit::Millimeters), 25.4);
        assert_relative_eq!(LengthUnit::Feet.convert(1.0, LengthUnit::Inches), 12.0);
        assert_relative_eq!(LengthUnit::Meters.convert(0.5, LengthUnit::Centimeters), 50.0);
        assert_relative_eq!(Length::new(2.0, LengthUnit::Centimeters).to_mm(), 20.0);
    }

    #[test]
    fn arithmetic_uses_left_units() {
        let l = Length::mm(10.0).add(Length::new(1.0, LengthUnit::Centimeters));
        assert_eq!(l.units, LengthUnit::Millimeters);
        assert_relative_eq!(l.value, 20.0);
        let d = Length::new(1.0, LengthUnit::Inches).subtract(Length::mm(25.4));
        assert!(d.value.abs() < 1e-12);
    }
}
