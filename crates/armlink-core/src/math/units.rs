//! Per-axis unit conversion
//!
//! A [`UnitConversion`] is a bijection between one declared physical unit and
//! the canonical unit of its dimension: meters for lengths, radians for angles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Length units accepted on an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    Millimeter,
    Centimeter,
    Meter,
}

/// Angle units accepted on an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    Degree,
    Radian,
}

/// Physical unit of a single state-vector axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Length(LengthUnit),
    Angle(AngleUnit),
}

impl Unit {
    pub const MILLIMETER: Self = Self::Length(LengthUnit::Millimeter);
    pub const CENTIMETER: Self = Self::Length(LengthUnit::Centimeter);
    pub const METER: Self = Self::Length(LengthUnit::Meter);
    pub const DEGREE: Self = Self::Angle(AngleUnit::Degree);
    pub const RADIAN: Self = Self::Angle(AngleUnit::Radian);

    /// Factor that takes a value in this unit to meters or radians
    pub fn to_standard_factor(&self) -> f64 {
        match self {
            Self::Length(LengthUnit::Millimeter) => 0.001,
            Self::Length(LengthUnit::Centimeter) => 0.01,
            Self::Length(LengthUnit::Meter) => 1.0,
            Self::Angle(AngleUnit::Degree) => std::f64::consts::PI / 180.0,
            Self::Angle(AngleUnit::Radian) => 1.0,
        }
    }

    /// Factor that takes meters or radians to a value in this unit
    pub fn from_standard_factor(&self) -> f64 {
        match self {
            Self::Length(LengthUnit::Millimeter) => 1000.0,
            Self::Length(LengthUnit::Centimeter) => 100.0,
            Self::Length(LengthUnit::Meter) => 1.0,
            Self::Angle(AngleUnit::Degree) => 180.0 / std::f64::consts::PI,
            Self::Angle(AngleUnit::Radian) => 1.0,
        }
    }

    /// Whether this unit measures a length
    #[inline]
    pub fn is_length(&self) -> bool {
        matches!(self, Self::Length(_))
    }

    /// Whether this unit measures an angle
    #[inline]
    pub fn is_angle(&self) -> bool {
        matches!(self, Self::Angle(_))
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mm" => Ok(Self::MILLIMETER),
            "cm" => Ok(Self::CENTIMETER),
            "m" => Ok(Self::METER),
            "degree" => Ok(Self::DEGREE),
            "radian" => Ok(Self::RADIAN),
            other => Err(Error::UnsupportedUnit(other.to_string())),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Length(LengthUnit::Millimeter) => "mm",
            Self::Length(LengthUnit::Centimeter) => "cm",
            Self::Length(LengthUnit::Meter) => "m",
            Self::Angle(AngleUnit::Degree) => "degree",
            Self::Angle(AngleUnit::Radian) => "radian",
        };
        f.write_str(tag)
    }
}

/// Bijective conversion for one axis
///
/// `to_standard` and `from_standard` multiply by exact reciprocal factors, so
/// `from_standard(to_standard(x))` reproduces `x` up to floating-point rounding.
///
/// # Example
/// ```
/// use armlink_core::math::{Unit, UnitConversion};
///
/// let conv = UnitConversion::new(Unit::MILLIMETER);
/// assert_eq!(conv.to_standard(250.0), 0.25);
/// assert_eq!(conv.from_standard(0.25), 250.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConversion {
    unit: Unit,
    scale: f64,
    to_standard: f64,
    from_standard: f64,
}

impl UnitConversion {
    /// Create a conversion for a plain unit
    pub fn new(unit: Unit) -> Self {
        Self {
            unit,
            scale: 1.0,
            to_standard: unit.to_standard_factor(),
            from_standard: unit.from_standard_factor(),
        }
    }

    /// Create a conversion for a driver unit that counts fractions of `unit`
    ///
    /// A driver reporting hundredths of a degree uses `scaled(Unit::DEGREE, 0.01)`.
    pub fn scaled(unit: Unit, scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::Config(format!(
                "unit scale must be finite and positive, got {}",
                scale
            )));
        }
        if scale == 1.0 {
            return Ok(Self::new(unit));
        }
        Ok(Self {
            unit,
            scale,
            to_standard: unit.to_standard_factor() * scale,
            from_standard: unit.from_standard_factor() / scale,
        })
    }

    /// Parse a unit tag and build its conversion
    pub fn parse(tag: &str) -> Result<Self> {
        tag.parse::<Unit>().map(Self::new)
    }

    /// The declared unit
    #[inline]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// The driver scale applied on top of the unit (1.0 for plain units)
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Convert a value from the declared unit to meters or radians
    #[inline]
    pub fn to_standard(&self, value: f64) -> f64 {
        value * self.to_standard
    }

    /// Convert a value from meters or radians to the declared unit
    #[inline]
    pub fn from_standard(&self, value: f64) -> f64 {
        value * self.from_standard
    }
}

impl From<Unit> for UnitConversion {
    fn from(unit: Unit) -> Self {
        Self::new(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const ALL_UNITS: [Unit; 5] = [
        Unit::MILLIMETER,
        Unit::CENTIMETER,
        Unit::METER,
        Unit::DEGREE,
        Unit::RADIAN,
    ];

    #[test]
    fn test_parse_tags() {
        for unit in ALL_UNITS {
            assert_eq!(unit.to_string().parse::<Unit>().unwrap(), unit);
        }
        assert!(Unit::MILLIMETER.is_length());
        assert!(Unit::DEGREE.is_angle());
    }

    #[test]
    fn test_rejects_unsupported_tag() {
        for tag in ["inch", "", "Degree", "001degree", "rad"] {
            match UnitConversion::parse(tag) {
                Err(Error::UnsupportedUnit(t)) => assert_eq!(t, tag),
                other => panic!("expected UnsupportedUnit for {tag:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_length_factors() {
        assert_relative_eq!(UnitConversion::new(Unit::MILLIMETER).to_standard(1500.0), 1.5);
        assert_relative_eq!(UnitConversion::new(Unit::CENTIMETER).to_standard(25.0), 0.25);
        assert_relative_eq!(UnitConversion::new(Unit::METER).to_standard(3.0), 3.0);
        assert_relative_eq!(UnitConversion::new(Unit::MILLIMETER).from_standard(0.2), 200.0);
        assert_relative_eq!(UnitConversion::new(Unit::CENTIMETER).from_standard(0.2), 20.0);
    }

    #[test]
    fn test_angle_factors() {
        let deg = UnitConversion::new(Unit::DEGREE);
        assert_relative_eq!(deg.to_standard(180.0), PI, epsilon = 1e-12);
        assert_relative_eq!(deg.from_standard(PI / 2.0), 90.0, epsilon = 1e-12);
        let rad = UnitConversion::new(Unit::RADIAN);
        assert_eq!(rad.to_standard(1.25), 1.25);
        assert_eq!(rad.from_standard(1.25), 1.25);
    }

    #[test]
    fn test_round_trip_all_units() {
        let samples = [0.0, 1.0, -1.0, 1e-9, -273.15, 12345.678, 1e12];
        for unit in ALL_UNITS {
            let conv = UnitConversion::new(unit);
            for &x in &samples {
                assert_relative_eq!(
                    conv.from_standard(conv.to_standard(x)),
                    x,
                    max_relative = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_scaled_units() {
        let centideg = UnitConversion::scaled(Unit::DEGREE, 0.01).unwrap();
        assert_relative_eq!(centideg.to_standard(18000.0), PI, epsilon = 1e-12);
        assert_relative_eq!(centideg.from_standard(PI), 18000.0, epsilon = 1e-8);
        assert_eq!(centideg.scale(), 0.01);

        let plain = UnitConversion::scaled(Unit::METER, 1.0).unwrap();
        assert_eq!(plain, UnitConversion::new(Unit::METER));

        assert!(UnitConversion::scaled(Unit::METER, 0.0).is_err());
        assert!(UnitConversion::scaled(Unit::METER, f64::NAN).is_err());
    }
}
