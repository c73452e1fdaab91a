//! In-memory collaborators
//!
//! A [`DummyArm`] stores whatever it is commanded and reports it back, with no
//! kinematics linking its joint and pose vectors. Each dummy is a cheap handle
//! over shared state: clone it, hand one clone to a controller and keep the
//! other to inspect the traffic.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::math::{StateVector, MAX_AXES};
use crate::{Error, Result};

use super::camera::{Camera, Frame};
use super::traits::{ArmDriver, KinematicsStatus, Visualizer};
use super::POSE_DIM;

#[derive(Debug, Default)]
struct DummyArmState {
    connected: bool,
    joints: StateVector,
    pose: StateVector,
    joint_commands: Vec<StateVector>,
    pose_commands: Vec<StateVector>,
    io_calls: usize,
    connect_failure: Option<String>,
    read_failure: Option<String>,
    kinematics_failure: Option<i32>,
}

/// An arm that records commands and echoes them back
#[derive(Debug, Clone)]
pub struct DummyArm {
    name: String,
    state: Arc<RwLock<DummyArmState>>,
}

impl DummyArm {
    /// Create a dummy arm with `num_joints` joint axes (gripper included), all zero
    pub fn new(num_joints: usize) -> Self {
        let state = DummyArmState {
            joints: std::iter::repeat(0.0).take(num_joints.min(MAX_AXES)).collect(),
            pose: std::iter::repeat(0.0).take(POSE_DIM).collect(),
            ..Default::default()
        };
        Self {
            name: "dummy".into(),
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Set the driver name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overwrite the native joint vector (values past `MAX_AXES` are dropped)
    pub fn set_joints(&self, joints: &[f64]) {
        self.state.write().joints = truncated(joints);
    }

    /// Overwrite the native pose vector (values past `MAX_AXES` are dropped)
    pub fn set_pose(&self, pose: &[f64]) {
        self.state.write().pose = truncated(pose);
    }

    /// Current native joint vector
    pub fn joints(&self) -> StateVector {
        self.state.read().joints.clone()
    }

    /// Current native pose vector
    pub fn pose(&self) -> StateVector {
        self.state.read().pose.clone()
    }

    /// Every joint command received, oldest first
    pub fn joint_commands(&self) -> Vec<StateVector> {
        self.state.read().joint_commands.clone()
    }

    /// Every pose command received, oldest first
    pub fn pose_commands(&self) -> Vec<StateVector> {
        self.state.read().pose_commands.clone()
    }

    /// Number of driver calls made so far (connect, disconnect, reads, writes)
    pub fn io_calls(&self) -> usize {
        self.state.read().io_calls
    }

    /// Whether the arm is connected
    pub fn is_connected(&self) -> bool {
        self.state.read().connected
    }

    /// Make the next `connect` call fail with a hardware error
    pub fn fail_next_connect(&self, message: impl Into<String>) {
        self.state.write().connect_failure = Some(message.into());
    }

    /// Make the next `joint_state` read fail with a hardware error
    pub fn fail_next_read(&self, message: impl Into<String>) {
        self.state.write().read_failure = Some(message.into());
    }

    /// Report `code` as a kinematics failure on every pose command
    pub fn set_kinematics_failure(&self, code: Option<i32>) {
        self.state.write().kinematics_failure = code;
    }
}

fn truncated(values: &[f64]) -> StateVector {
    values.iter().copied().take(MAX_AXES).collect()
}

impl ArmDriver for DummyArm {
    fn name(&self) -> &str {
        &self.name
    }

    fn connect(&mut self) -> Result<()> {
        let mut state = self.state.write();
        state.io_calls += 1;
        if let Some(message) = state.connect_failure.take() {
            return Err(Error::Hardware(message));
        }
        state.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        let mut state = self.state.write();
        state.io_calls += 1;
        state.connected = false;
        Ok(())
    }

    fn joint_state(&mut self) -> Result<StateVector> {
        let mut state = self.state.write();
        state.io_calls += 1;
        if let Some(message) = state.read_failure.take() {
            return Err(Error::Hardware(message));
        }
        Ok(state.joints.clone())
    }

    fn set_joint_state(&mut self, joints: &[f64]) -> Result<()> {
        let mut state = self.state.write();
        state.io_calls += 1;
        if joints.len() != state.joints.len() {
            return Err(Error::Hardware(format!(
                "expected {} joint values, got {}",
                state.joints.len(),
                joints.len()
            )));
        }
        state.joints = joints.iter().copied().collect();
        let command = state.joints.clone();
        state.joint_commands.push(command);
        Ok(())
    }

    fn end_effector_state(&mut self) -> Result<StateVector> {
        let mut state = self.state.write();
        state.io_calls += 1;
        Ok(state.pose.clone())
    }

    fn set_end_effector_state(&mut self, pose: &[f64]) -> Result<KinematicsStatus> {
        let mut state = self.state.write();
        state.io_calls += 1;
        if pose.len() != POSE_DIM {
            return Err(Error::Hardware(format!(
                "expected {} pose values, got {}",
                POSE_DIM,
                pose.len()
            )));
        }
        state.pose = pose.iter().copied().collect();
        let command = state.pose.clone();
        state.pose_commands.push(command);
        Ok(match state.kinematics_failure {
            Some(code) => KinematicsStatus::Failed { code },
            None => KinematicsStatus::Solved,
        })
    }
}

#[derive(Debug, Default)]
struct DummyCameraState {
    connected: bool,
    reads: usize,
}

/// A camera that returns a constant black frame of a fixed shape
#[derive(Debug, Clone)]
pub struct DummyCamera {
    height: usize,
    width: usize,
    state: Arc<RwLock<DummyCameraState>>,
}

impl DummyCamera {
    /// Create a camera producing `height x width` frames
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            state: Arc::new(RwLock::new(DummyCameraState::default())),
        }
    }

    /// Number of frames read so far
    pub fn reads(&self) -> usize {
        self.state.read().reads
    }
}

impl Camera for DummyCamera {
    fn connect(&mut self) -> Result<()> {
        self.state.write().connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.state.write().connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.read().connected
    }

    fn async_read(&mut self) -> Result<Frame> {
        let mut state = self.state.write();
        if !state.connected {
            return Err(Error::Camera("dummy camera is not connected".into()));
        }
        state.reads += 1;
        Ok(Frame::filled(self.height, self.width, 0))
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    added: Vec<(usize, Vec<StateVector>)>,
    plots: usize,
}

/// A visualizer that records what it was asked to draw
#[derive(Debug, Clone, Default)]
pub struct RecordingVisualizer {
    state: Arc<RwLock<RecordingState>>,
}

impl RecordingVisualizer {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Poses passed to each `add` call, oldest first
    pub fn poses(&self) -> Vec<Vec<StateVector>> {
        self.state
            .read()
            .added
            .iter()
            .map(|(_, poses)| poses.clone())
            .collect()
    }

    /// Image count passed to each `add` call, oldest first
    pub fn image_counts(&self) -> Vec<usize> {
        self.state.read().added.iter().map(|(n, _)| *n).collect()
    }

    /// Number of `plot` calls
    pub fn plots(&self) -> usize {
        self.state.read().plots
    }
}

impl Visualizer for RecordingVisualizer {
    fn add(&mut self, images: &[Frame], poses: &[StateVector]) -> Result<()> {
        self.state.write().added.push((images.len(), poses.to_vec()));
        Ok(())
    }

    fn plot(&mut self) -> Result<()> {
        self.state.write().plots += 1;
        Ok(())
    }
}
