//! Hardware collaborator interfaces
//!
//! The controllers in [`crate::robot`] never talk to a vendor SDK directly. They
//! drive an [`ArmDriver`] for joint and pose I/O, a [`CameraSet`] for frames and
//! an optional [`Visualizer`]. In-memory implementations of all three live in
//! [`dummy`] for tests and dry runs.

mod camera;
pub mod dummy;
mod traits;

pub use camera::{Camera, CameraSet, Frame};
pub use dummy::{DummyArm, DummyCamera, RecordingVisualizer};
pub use traits::{ArmDriver, KinematicsStatus, Visualizer};

/// Axis names of an end-effector pose vector, in order
pub const POSE_AXES: [&str; 7] = ["x", "y", "z", "roll", "pitch", "yaw", "gripper"];

/// Number of axes in an end-effector pose vector
pub const POSE_DIM: usize = POSE_AXES.len();
