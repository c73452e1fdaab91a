//! Delta action composition
//!
//! An action can be an absolute target or an offset from a reference vector.
//! The reference is either the state seen by the last observation or the state
//! captured at connect. Both live in standard space.

use serde::{Deserialize, Serialize};

use crate::math::StateVector;
use crate::{Error, Reference, Result};

/// Reference an incoming action is added to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaMode {
    /// Dispatch the action as received
    #[default]
    None,
    /// Add the action to the state read by the last observation
    Previous,
    /// Add the action to the state captured at connect
    Initial,
}

/// Reference vectors of one controller, in standard space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceState {
    initial: Option<StateVector>,
    current: Option<StateVector>,
}

impl ReferenceState {
    /// Create an empty reference state
    pub fn new() -> Self {
        Self::default()
    }

    /// State captured at connect
    pub fn initial(&self) -> Option<&StateVector> {
        self.initial.as_ref()
    }

    /// State captured by the last observation
    pub fn current(&self) -> Option<&StateVector> {
        self.current.as_ref()
    }

    /// Record the connect-time state
    pub fn set_initial(&mut self, state: StateVector) {
        self.initial = Some(state);
    }

    /// Record the state of the latest observation
    pub fn set_current(&mut self, state: StateVector) {
        self.current = Some(state);
    }

    /// Forget both references
    pub fn clear(&mut self) {
        self.initial = None;
        self.current = None;
    }

    /// Compose `action` with the reference selected by `mode`
    ///
    /// Fails with [`Error::MissingReference`] when the reference has not been
    /// captured, and with [`Error::AxisMismatch`] when its length differs from
    /// the action's.
    pub fn compose(&self, mode: DeltaMode, action: StateVector) -> Result<StateVector> {
        let (reference, which) = match mode {
            DeltaMode::None => return Ok(action),
            DeltaMode::Previous => (self.current.as_ref(), Reference::Current),
            DeltaMode::Initial => (self.initial.as_ref(), Reference::Initial),
        };
        let reference = reference.ok_or(Error::MissingReference(which))?;
        if reference.len() != action.len() {
            return Err(Error::AxisMismatch {
                expected: reference.len(),
                actual: action.len(),
            });
        }
        tracing::debug!("Composing action with {:?} reference", mode);
        Ok(action.iter().zip(reference).map(|(a, r)| a + r).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(values: &[f64]) -> StateVector {
        values.iter().copied().collect()
    }

    #[test]
    fn test_none_passes_through() {
        let refs = ReferenceState::new();
        let action = vector(&[1.0, 2.0]);
        assert_eq!(refs.compose(DeltaMode::None, action.clone()).unwrap(), action);
    }

    #[test]
    fn test_previous_adds_current() {
        let mut refs = ReferenceState::new();
        refs.set_current(vector(&[0.5, -1.0]));
        let out = refs.compose(DeltaMode::Previous, vector(&[1.0, 2.0])).unwrap();
        assert_eq!(out.as_slice(), &[1.5, 1.0]);
    }

    #[test]
    fn test_initial_adds_initial() {
        let mut refs = ReferenceState::new();
        refs.set_initial(vector(&[10.0, 20.0]));
        refs.set_current(vector(&[0.0, 0.0]));
        let out = refs.compose(DeltaMode::Initial, vector(&[1.0, 2.0])).unwrap();
        assert_eq!(out.as_slice(), &[11.0, 22.0]);
    }

    #[test]
    fn test_missing_reference_fails() {
        let refs = ReferenceState::new();
        assert!(matches!(
            refs.compose(DeltaMode::Previous, vector(&[1.0])),
            Err(Error::MissingReference(Reference::Current))
        ));
        assert!(matches!(
            refs.compose(DeltaMode::Initial, vector(&[1.0])),
            Err(Error::MissingReference(Reference::Initial))
        ));
    }

    #[test]
    fn test_length_mismatch_fails() {
        let mut refs = ReferenceState::new();
        refs.set_current(vector(&[1.0, 2.0, 3.0]));
        assert!(matches!(
            refs.compose(DeltaMode::Previous, vector(&[1.0])),
            Err(Error::AxisMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_clear() {
        let mut refs = ReferenceState::new();
        refs.set_initial(vector(&[1.0]));
        refs.set_current(vector(&[1.0]));
        refs.clear();
        assert!(refs.initial().is_none() && refs.current().is_none());
    }
}
