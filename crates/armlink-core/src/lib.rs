//! armlink-core: a coordinate-space-agnostic control layer for robot arms
//!
//! Upstream clients (teleoperation loops, policy clients, dataset replay) talk to
//! a single [`Robot`] interface while each physical arm keeps its native joint and
//! pose units. Every value crosses a canonical SI "standard" space on its way
//! between the wire and the driver.
//!
//! # Modules
//!
//! - [`math`] - Per-axis unit conversion and state-vector transforms
//! - [`config`] - Robot configuration, unit specs and presets
//! - [`hardware`] - Arm driver, camera and visualizer interfaces
//! - [`spaces`] - Ordered feature, observation and action maps
//! - [`robot`] - Single-arm and bimanual controllers
//!
//! # Architecture
//!
//! ```text
//!  client ──action (model units)──► BimanualController ─┬─► ArmController (left)
//!                                                        └─► ArmController (right)
//!                                                               │
//!                         model ─► standard ─► joint / pose ◄───┘
//!                                                  │
//!                                              ArmDriver
//! ```

#![warn(unused_must_use)]

pub mod config;
pub mod hardware;
pub mod math;
pub mod robot;
pub mod spaces;

// Re-exports for convenience
pub use config::{BimanualConfig, CameraConfig, InitType, RobotConfig, UnitSpec};
pub use hardware::{ArmDriver, Camera, CameraSet, Frame, KinematicsStatus, Visualizer};
pub use math::{SpaceTransform, StateVector, Unit, UnitConversion};
pub use robot::{ArmController, ArmKinematicsMode, BimanualController, DeltaMode, Robot};
pub use spaces::{Action, FeatureType, Features, NamedMap, Observation, ObservationValue};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Which reference vector a delta action was composed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// State captured by the last observation
    Current,
    /// State captured when the controller connected
    Initial,
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => write!(f, "current state is unset, call get_observation first"),
            Self::Initial => write!(f, "initial state is unset, call connect first"),
        }
    }
}

/// Error types for armlink-core
///
/// Precondition and configuration errors are raised by this crate; hardware
/// errors come from the collaborators and are passed through unchanged.
///
/// # Example
/// ```ignore
/// match arm.send_action(&action) {
///     Ok(state) => { /* forward state to the client */ },
///     Err(Error::NotConnected(name)) => eprintln!("{name} is not connected"),
///     Err(Error::MissingReference(r)) => eprintln!("delta action rejected: {r}"),
///     Err(e) => return Err(e),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
#[must_use = "errors must be handled or explicitly ignored with let _ = ..."]
#[non_exhaustive]
pub enum Error {
    /// An observation or action was requested from a disconnected device.
    /// Handle by: calling `connect` first.
    #[error("{0} is not connected")]
    NotConnected(String),

    /// `connect` was called on a device that is already connected.
    #[error("{0} is already connected")]
    AlreadyConnected(String),

    /// A delta action needs a reference vector that has not been captured yet.
    /// Handle by: observing (for `previous`) or connecting (for `initial`) first.
    #[error("Missing reference state: {0}")]
    MissingReference(Reference),

    /// A unit tag outside the supported set.
    #[error("Unsupported unit: {0}")]
    UnsupportedUnit(String),

    /// A state vector whose length does not match the configured axis count.
    #[error("Axis mismatch: expected {expected} values, got {actual}")]
    AxisMismatch { expected: usize, actual: usize },

    /// An action map is missing one of the declared action features.
    #[error("Action is missing key '{0}'")]
    MissingActionKey(String),

    /// Invalid configuration parameter.
    /// Handle by: validating config before use, checking unit list lengths.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reported by an arm driver (connect, read, write, kinematics).
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// Error reported by a camera.
    #[error("Camera error: {0}")]
    Camera(String),

    /// Error reported by the visualizer.
    #[error("Visualization error: {0}")]
    Visualization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(format!("invalid JSON: {}", e))
    }
}

/// Result type alias for armlink-core operations
pub type Result<T> = std::result::Result<T, Error>;
