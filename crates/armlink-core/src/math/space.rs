//! Per-vector coordinate space transforms
//!
//! A [`SpaceTransform`] holds one [`UnitConversion`] per axis and converts whole
//! state vectors between a declared space and the standard space.

use arrayvec::ArrayVec;

use super::units::{Unit, UnitConversion};
use crate::{Error, Result};

/// Maximum number of axes in a state vector
pub const MAX_AXES: usize = 24;

/// A joint or pose vector
///
/// Joint vectors hold N joints followed by the gripper axis; pose vectors hold
/// `x, y, z, roll, pitch, yaw, gripper`.
pub type StateVector = ArrayVec<f64, MAX_AXES>;

/// Ordered list of per-axis conversions for one coordinate space
///
/// The axis count is fixed at construction. Every call checks the input length
/// against it and fails with [`Error::AxisMismatch`] on a mismatch.
///
/// # Example
/// ```
/// use armlink_core::math::{SpaceTransform, Unit};
///
/// let transform = SpaceTransform::from_units(&[Unit::DEGREE, Unit::MILLIMETER])?;
/// let standard = transform.to_standard(&[90.0, 20.0])?;
/// assert!((standard[0] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// assert!((standard[1] - 0.02).abs() < 1e-12);
/// # Ok::<(), armlink_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceTransform {
    axes: ArrayVec<UnitConversion, MAX_AXES>,
}

impl SpaceTransform {
    /// Build a transform from per-axis conversions
    pub fn new(conversions: impl IntoIterator<Item = UnitConversion>) -> Result<Self> {
        let mut axes = ArrayVec::new();
        for conversion in conversions {
            axes.try_push(conversion).map_err(|_| {
                Error::Config(format!("a state vector has at most {} axes", MAX_AXES))
            })?;
        }
        Ok(Self { axes })
    }

    /// Build a transform from plain units
    pub fn from_units(units: &[Unit]) -> Result<Self> {
        Self::new(units.iter().copied().map(UnitConversion::new))
    }

    /// Build a transform from unit tags such as `"mm"` or `"degree"`
    pub fn parse<S: AsRef<str>>(tags: &[S]) -> Result<Self> {
        let conversions = tags
            .iter()
            .map(|tag| UnitConversion::parse(tag.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(conversions)
    }

    /// Number of axes
    #[inline]
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Whether the transform has no axes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Per-axis conversions in order
    pub fn conversions(&self) -> &[UnitConversion] {
        &self.axes
    }

    /// Convert a vector from the declared space to standard space
    pub fn to_standard(&self, values: &[f64]) -> Result<StateVector> {
        self.check_len(values)?;
        Ok(self
            .axes
            .iter()
            .zip(values)
            .map(|(axis, &v)| axis.to_standard(v))
            .collect())
    }

    /// Convert a vector from standard space to the declared space
    pub fn from_standard(&self, values: &[f64]) -> Result<StateVector> {
        self.check_len(values)?;
        Ok(self
            .axes
            .iter()
            .zip(values)
            .map(|(axis, &v)| axis.from_standard(v))
            .collect())
    }

    #[inline]
    fn check_len(&self, values: &[f64]) -> Result<()> {
        if values.len() != self.axes.len() {
            return Err(Error::AxisMismatch {
                expected: self.axes.len(),
                actual: values.len(),
            });
        }
        Ok(())
    }
}
