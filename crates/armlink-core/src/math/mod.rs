//! Unit conversion primitives
//!
//! Every state vector crosses the canonical "standard" space (meters, radians)
//! when it moves between the wire format, the joint API and the pose API of an
//! arm. This module provides the per-axis conversions and the per-vector
//! transform built from them.

mod space;
mod units;

pub use space::{SpaceTransform, StateVector, MAX_AXES};
pub use units::{AngleUnit, LengthUnit, Unit, UnitConversion};
