//! Arm driver and visualizer traits
//!
//! Defines the boundary between the controllers and the vendor code that moves
//! joints, reads encoders and solves kinematics.

use crate::math::StateVector;
use crate::Result;

use super::camera::Frame;

/// Outcome of a pose command
///
/// Drivers solve inverse kinematics themselves. A failed solve is reported
/// here instead of as an error; the controller logs it and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KinematicsStatus {
    /// The pose was solved and dispatched
    Solved,
    /// The driver reported a kinematics failure code
    Failed {
        /// Vendor-specific return code
        code: i32,
    },
}

impl KinematicsStatus {
    /// Whether the solve succeeded
    #[must_use]
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved)
    }
}

/// Trait for a single physical arm
///
/// All vectors are in the driver's native units: joint vectors hold one value
/// per joint with the gripper last, pose vectors hold
/// `x, y, z, roll, pitch, yaw, gripper`. Errors are passed to the caller as-is;
/// retry policy, if any, belongs to the implementation.
pub trait ArmDriver: Send {
    /// Get the driver name/type
    fn name(&self) -> &str;

    /// Open the connection to the arm
    fn connect(&mut self) -> Result<()>;

    /// Close the connection to the arm
    fn disconnect(&mut self) -> Result<()>;

    /// Read the joint positions
    fn joint_state(&mut self) -> Result<StateVector>;

    /// Command the joint positions
    fn set_joint_state(&mut self, state: &[f64]) -> Result<()>;

    /// Read the end-effector pose (forward kinematics runs in the driver)
    fn end_effector_state(&mut self) -> Result<StateVector>;

    /// Command the end-effector pose (inverse kinematics runs in the driver)
    fn set_end_effector_state(&mut self, pose: &[f64]) -> Result<KinematicsStatus>;

    /// Check if the arm is calibrated
    #[must_use]
    fn is_calibrated(&self) -> bool {
        true
    }

    /// Run the arm's calibration routine
    fn calibrate(&mut self) -> Result<()> {
        Ok(())
    }

    /// Apply one-time motor configuration
    fn configure(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Trait for a live plot of camera frames and end-effector poses
pub trait Visualizer: Send {
    /// Queue one cycle worth of frames and poses (one pose per arm)
    fn add(&mut self, images: &[Frame], poses: &[StateVector]) -> Result<()>;

    /// Render everything queued so far
    fn plot(&mut self) -> Result<()>;
}
