//! Unit strings as they appear in configuration files
//!
//! Besides the plain tags (`mm`, `cm`, `m`, `degree`, `radian`), drivers often
//! count fractions of a unit. Those are written with a decimal prefix: `01mm`
//! is tenths of a millimeter, `001degree` hundredths of a degree. The prefix is
//! resolved here into a scaled [`UnitConversion`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::math::{Unit, UnitConversion};
use crate::{Error, Result};

/// A unit with an optional power-of-ten driver scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitSpec {
    unit: Unit,
    /// Number of decimal places of the scale: 0 for plain units, 2 for `001`
    decimals: u8,
}

impl UnitSpec {
    /// Largest supported prefix, `000000001` (one billionth)
    pub const MAX_DECIMALS: u8 = 9;

    /// A plain unit
    pub const fn plain(unit: Unit) -> Self {
        Self { unit, decimals: 0 }
    }

    /// A unit counted in hundredths (`001` prefix)
    pub const fn hundredths(unit: Unit) -> Self {
        Self { unit, decimals: 2 }
    }

    /// A unit counted in steps of `10^-decimals`
    pub fn scaled(unit: Unit, decimals: u8) -> Result<Self> {
        if decimals > Self::MAX_DECIMALS {
            return Err(Error::Config(format!(
                "unit prefix supports at most {} decimals, got {}",
                Self::MAX_DECIMALS,
                decimals
            )));
        }
        Ok(Self { unit, decimals })
    }

    /// The underlying unit
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// The multiplier applied to the unit (`0.01` for `001degree`)
    pub fn scale(&self) -> f64 {
        10f64.powi(-i32::from(self.decimals))
    }

    /// Resolve into a per-axis conversion
    pub fn conversion(&self) -> Result<UnitConversion> {
        UnitConversion::scaled(self.unit, self.scale())
    }
}

impl From<Unit> for UnitSpec {
    fn from(unit: Unit) -> Self {
        Self::plain(unit)
    }
}

impl FromStr for UnitSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (prefix, tag) = s.split_at(split);
        let unit = tag
            .parse::<Unit>()
            .map_err(|_| Error::UnsupportedUnit(s.to_string()))?;
        if prefix.is_empty() {
            return Ok(Self::plain(unit));
        }

        // "0…01": a leading integer zero followed by the decimal digits
        let zeros = prefix.len() - 1;
        if !prefix.ends_with('1') || prefix[..zeros].chars().any(|c| c != '0') || zeros == 0 {
            return Err(Error::UnsupportedUnit(s.to_string()));
        }
        let decimals =
            u8::try_from(zeros).map_err(|_| Error::UnsupportedUnit(s.to_string()))?;
        Self::scaled(unit, decimals)
    }
}

impl TryFrom<String> for UnitSpec {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<UnitSpec> for String {
    fn from(spec: UnitSpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for UnitSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals > 0 {
            for _ in 0..self.decimals {
                f.write_str("0")?;
            }
            f.write_str("1")?;
        }
        write!(f, "{}", self.unit)
    }
}

/// Parse a list of unit strings
pub fn parse_units<S: AsRef<str>>(tags: &[S]) -> Result<Vec<UnitSpec>> {
    tags.iter().map(|tag| tag.as_ref().parse()).collect()
}
