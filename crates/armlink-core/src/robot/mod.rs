//! Robot controllers
//!
//! [`ArmController`] mediates between the wire (model) space, the standard
//! space and the joint/pose spaces of one [`ArmDriver`](crate::ArmDriver).
//! [`BimanualController`] fuses two of them behind `left_` / `right_` keys.
//! Both implement [`Robot`], the interface upstream clients program against.
//!
//! # Example
//!
//! ```
//! use armlink_core::hardware::{CameraSet, DummyArm};
//! use armlink_core::{Action, ArmController, Robot, RobotConfig};
//!
//! let config = RobotConfig::new(["shoulder", "elbow", "gripper"]);
//! let mut arm = ArmController::new(config, DummyArm::new(3), CameraSet::new())?;
//!
//! arm.connect()?;
//! let observation = arm.get_observation()?;
//! assert_eq!(observation.len(), 3);
//!
//! let action: Action = [("shoulder_pos", 0.5), ("elbow_pos", -0.25), ("gripper_pos", 0.02)]
//!     .into_iter()
//!     .collect();
//! let state = arm.send_action(&action)?;
//! assert_eq!(state.get("elbow_pos"), Some(&-0.25));
//! arm.disconnect()?;
//! # Ok::<(), armlink_core::Error>(())
//! ```

mod arm;
mod bimanual;
mod delta;

pub use arm::{ArmController, WARMUP_READS};
pub use bimanual::{BimanualController, LEFT_PREFIX, RIGHT_PREFIX};
pub use delta::{DeltaMode, ReferenceState};

use serde::{Deserialize, Serialize};

use crate::spaces::{Action, Features, Observation};
use crate::Result;

/// Space in which an arm takes its actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmKinematicsMode {
    /// Actions are joint targets; deltas apply to joint states
    #[default]
    Joint,
    /// Actions are end-effector poses; deltas apply to poses
    EndEffector,
}

/// Trait for a device that upstream clients observe and command
///
/// Calls are synchronous and run to completion on the caller's thread.
/// Callers serialize their own calls into one instance.
pub trait Robot: Send {
    /// Get the robot name
    fn name(&self) -> &str;

    /// Keys and types returned by [`Robot::get_observation`]
    fn observation_features(&self) -> &Features;

    /// Keys and types accepted by [`Robot::send_action`]
    fn action_features(&self) -> &Features;

    /// Check if the robot and all its cameras are connected
    #[must_use]
    fn is_connected(&self) -> bool;

    /// Check if the robot is calibrated
    #[must_use]
    fn is_calibrated(&self) -> bool;

    /// Connect cameras and hardware and bring the robot to its initial state
    fn connect(&mut self) -> Result<()>;

    /// Release cameras and hardware
    fn disconnect(&mut self) -> Result<()>;

    /// Run the calibration routine
    fn calibrate(&mut self) -> Result<()>;

    /// Apply one-time configuration
    fn configure(&mut self) -> Result<()>;

    /// Read the current state (model units) and the latest camera frames
    fn get_observation(&mut self) -> Result<Observation>;

    /// Command the robot and return the resulting joint state (model units)
    fn send_action(&mut self, action: &Action) -> Result<Action>;
}
