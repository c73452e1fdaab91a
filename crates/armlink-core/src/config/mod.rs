//! Robot configuration
//!
//! A [`RobotConfig`] is built once (from code, a preset or a JSON file), checked
//! with [`RobotConfig::validate`] and then only read. Four unit lists describe
//! the coordinate spaces of one arm:
//!
//! | list | space | axes |
//! |---|---|---|
//! | `model_joint_units` | wire format of joint observations and actions | one per joint |
//! | `joint_units` | driver joint API | one per joint |
//! | `pose_units` | driver pose API | 7 |
//! | `model_pose_units` | wire format of pose actions (end-effector mode) | 7 |
//!
//! Initial states (`init_state`, `init_ee_state`) are given in standard space.

mod presets;
mod units;

pub use units::{parse_units, UnitSpec};

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::hardware::POSE_DIM;
use crate::math::{SpaceTransform, Unit, MAX_AXES};
use crate::robot::{ArmKinematicsMode, DeltaMode};
use crate::{Error, Result};

/// How the arm is positioned right after connecting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitType {
    /// Command `init_state` through the joint API
    Joint,
    /// Command `init_ee_state` through the pose API
    EndEffector,
    /// Leave the arm where it is
    #[default]
    None,
}

/// A camera attached to a robot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Key of the camera in observations
    pub name: String,
    /// Frame height in pixels
    pub height: usize,
    /// Frame width in pixels
    pub width: usize,
    /// Capture rate, if the camera should be pinned to one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
}

impl CameraConfig {
    /// Create a camera config
    pub fn new(name: impl Into<String>, height: usize, width: usize) -> Self {
        Self {
            name: name.into(),
            height,
            width,
            fps: None,
        }
    }

    /// Set the capture rate
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }
}

/// Configuration of a single arm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Device identity, used in logs and suffixed per arm in bimanual setups
    pub id: Option<String>,
    /// Whether actions are joint targets or end-effector poses
    pub mode: ArmKinematicsMode,
    /// Cameras owned by this arm
    pub cameras: Vec<CameraConfig>,
    /// Joint names, gripper last
    pub joint_names: Vec<String>,
    /// Positioning step performed at connect
    pub init_type: InitType,
    /// Initial joint state (standard space), used when `init_type = joint`
    pub init_state: Vec<f64>,
    /// Initial pose (standard space), used when `init_type = end_effector`
    pub init_ee_state: Vec<f64>,
    /// Units of the driver joint API
    pub joint_units: Vec<UnitSpec>,
    /// Units of the driver pose API
    pub pose_units: Vec<UnitSpec>,
    /// Units of joint values on the wire
    pub model_joint_units: Vec<UnitSpec>,
    /// Units of pose actions on the wire
    pub model_pose_units: Vec<UnitSpec>,
    /// Reference that actions are added to
    pub delta_with: DeltaMode,
    /// Forward frames and poses to a visualizer after each action
    pub visualize: bool,
    /// Draw camera frames
    pub draw_2d: bool,
    /// Draw end-effector poses
    pub draw_3d: bool,
}

/// Default joint names: seven revolute joints and a gripper
fn default_joint_names() -> Vec<String> {
    (1..=7)
        .map(|i| format!("joint_{}", i))
        .chain(std::iter::once("gripper".to_string()))
        .collect()
}

fn revolute_units(joints: usize) -> Vec<UnitSpec> {
    std::iter::repeat(UnitSpec::plain(Unit::RADIAN))
        .take(joints)
        .chain(std::iter::once(UnitSpec::plain(Unit::METER)))
        .collect()
}

/// `m, m, m, radian, radian, radian, m`
pub(crate) fn si_pose_units() -> Vec<UnitSpec> {
    let m = UnitSpec::plain(Unit::METER);
    let rad = UnitSpec::plain(Unit::RADIAN);
    vec![m, m, m, rad, rad, rad, m]
}

impl Default for RobotConfig {
    fn default() -> Self {
        let joint_names = default_joint_names();
        let joints = joint_names.len();
        Self {
            id: None,
            mode: ArmKinematicsMode::Joint,
            cameras: Vec::new(),
            joint_names,
            init_type: InitType::None,
            init_state: vec![0.0; joints],
            init_ee_state: vec![0.0; POSE_DIM],
            joint_units: revolute_units(joints - 1),
            pose_units: si_pose_units(),
            model_joint_units: revolute_units(joints - 1),
            model_pose_units: si_pose_units(),
            delta_with: DeltaMode::None,
            visualize: false,
            draw_2d: true,
            draw_3d: true,
        }
    }
}

impl RobotConfig {
    /// Create a joint-space config for the given joints (gripper last)
    ///
    /// Every unit list is standard (radians for joints, meters for the gripper
    /// and positions) and the initial states are zero.
    pub fn new<S: Into<String>>(joint_names: impl IntoIterator<Item = S>) -> Self {
        let joint_names: Vec<String> = joint_names.into_iter().map(Into::into).collect();
        let joints = joint_names.len();
        let units = revolute_units(joints.saturating_sub(1));
        Self {
            init_state: vec![0.0; joints],
            joint_units: units.clone(),
            model_joint_units: units,
            joint_names,
            ..Default::default()
        }
    }

    /// Parse a config from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config from a JSON file and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the device identity
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the kinematics mode
    pub fn with_mode(mut self, mode: ArmKinematicsMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the delta reference
    pub fn with_delta(mut self, delta_with: DeltaMode) -> Self {
        self.delta_with = delta_with;
        self
    }

    /// Add a camera
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.cameras.push(camera);
        self
    }

    /// Move to `state` (standard space) through the joint API at connect
    pub fn with_init_joint_state(mut self, state: Vec<f64>) -> Self {
        self.init_type = InitType::Joint;
        self.init_state = state;
        self
    }

    /// Move to `pose` (standard space) through the pose API at connect
    pub fn with_init_pose(mut self, pose: Vec<f64>) -> Self {
        self.init_type = InitType::EndEffector;
        self.init_ee_state = pose;
        self
    }

    /// Set the driver joint units
    pub fn with_joint_units(mut self, units: Vec<UnitSpec>) -> Self {
        self.joint_units = units;
        self
    }

    /// Set the driver pose units
    pub fn with_pose_units(mut self, units: Vec<UnitSpec>) -> Self {
        self.pose_units = units;
        self
    }

    /// Set the wire units of joint values
    pub fn with_model_joint_units(mut self, units: Vec<UnitSpec>) -> Self {
        self.model_joint_units = units;
        self
    }

    /// Set the wire units of pose actions
    pub fn with_model_pose_units(mut self, units: Vec<UnitSpec>) -> Self {
        self.model_pose_units = units;
        self
    }

    /// Enable or disable visualization
    pub fn with_visualization(mut self, enabled: bool) -> Self {
        self.visualize = enabled;
        self
    }

    /// Name used in logs and errors
    pub fn display_name(&self) -> &str {
        self.id.as_deref().unwrap_or("robot")
    }

    /// Number of joint axes (gripper included)
    pub fn num_joints(&self) -> usize {
        self.joint_names.len()
    }

    /// Check every invariant the controllers rely on
    pub fn validate(&self) -> Result<()> {
        let joints = self.num_joints();
        if joints == 0 {
            return Err(Error::Config("joint_names must not be empty".into()));
        }
        if joints > MAX_AXES {
            return Err(Error::Config(format!(
                "at most {} joints are supported, got {}",
                MAX_AXES, joints
            )));
        }
        check_unique("joint name", self.joint_names.iter().map(String::as_str))?;
        check_unique("camera name", self.cameras.iter().map(|c| c.name.as_str()))?;
        for camera in &self.cameras {
            if camera.height == 0 || camera.width == 0 {
                return Err(Error::Config(format!(
                    "camera '{}' has an empty frame shape",
                    camera.name
                )));
            }
        }

        check_len("joint_units", self.joint_units.len(), joints)?;
        check_len("model_joint_units", self.model_joint_units.len(), joints)?;
        check_len("pose_units", self.pose_units.len(), POSE_DIM)?;
        if self.mode == ArmKinematicsMode::EndEffector {
            check_len("model_pose_units", self.model_pose_units.len(), POSE_DIM)?;
        }
        match self.init_type {
            InitType::Joint => check_len("init_state", self.init_state.len(), joints)?,
            InitType::EndEffector => check_len("init_ee_state", self.init_ee_state.len(), POSE_DIM)?,
            InitType::None => {}
        }
        Ok(())
    }

    pub(crate) fn joint_transform(&self) -> Result<SpaceTransform> {
        build_transform(&self.joint_units)
    }

    pub(crate) fn pose_transform(&self) -> Result<SpaceTransform> {
        build_transform(&self.pose_units)
    }

    pub(crate) fn model_joint_transform(&self) -> Result<SpaceTransform> {
        build_transform(&self.model_joint_units)
    }

    pub(crate) fn model_pose_transform(&self) -> Result<SpaceTransform> {
        build_transform(&self.model_pose_units)
    }
}

fn build_transform(units: &[UnitSpec]) -> Result<SpaceTransform> {
    let conversions = units
        .iter()
        .map(UnitSpec::conversion)
        .collect::<Result<Vec<_>>>()?;
    SpaceTransform::new(conversions)
}

fn check_len(field: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::Config(format!(
            "{} has {} entries, expected {}",
            field, actual, expected
        )));
    }
    Ok(())
}

fn check_unique<'a>(what: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(Error::Config(format!("empty {}", what)));
        }
        if !seen.insert(name) {
            return Err(Error::Config(format!("duplicate {} '{}'", what, name)));
        }
    }
    Ok(())
}

/// Configuration of a two-arm setup
///
/// The shared fields describe both arms and the composite's own cameras. Each
/// arm gets its own initial joint state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BimanualConfigFile")]
pub struct BimanualConfig {
    /// Settings shared by both arms, plus the shared cameras
    #[serde(flatten)]
    pub shared: RobotConfig,
    /// Initial joint state of the left arm (standard space)
    pub init_state_left: Vec<f64>,
    /// Initial joint state of the right arm (standard space)
    pub init_state_right: Vec<f64>,
}

/// On-disk form: per-arm initial states fall back to the shared one
#[derive(Deserialize)]
struct BimanualConfigFile {
    #[serde(flatten)]
    shared: RobotConfig,
    #[serde(default)]
    init_state_left: Option<Vec<f64>>,
    #[serde(default)]
    init_state_right: Option<Vec<f64>>,
}

impl From<BimanualConfigFile> for BimanualConfig {
    fn from(file: BimanualConfigFile) -> Self {
        let config = Self::new(file.shared);
        Self {
            init_state_left: file.init_state_left.unwrap_or(config.init_state_left),
            init_state_right: file.init_state_right.unwrap_or(config.init_state_right),
            shared: config.shared,
        }
    }
}

impl Default for BimanualConfig {
    fn default() -> Self {
        Self::new(RobotConfig::default())
    }
}

impl BimanualConfig {
    /// Use `shared` for both arms, each starting from `shared.init_state`
    pub fn new(shared: RobotConfig) -> Self {
        Self {
            init_state_left: shared.init_state.clone(),
            init_state_right: shared.init_state.clone(),
            shared,
        }
    }

    /// Set the initial joint states of both arms
    pub fn with_init_states(mut self, left: Vec<f64>, right: Vec<f64>) -> Self {
        self.init_state_left = left;
        self.init_state_right = right;
        self
    }

    /// Parse a config from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config from a JSON file and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Check both per-arm configs and the shared cameras
    pub fn validate(&self) -> Result<()> {
        let (left, right) = self.split();
        left.validate()?;
        right.validate()?;
        // the shared initial state is replaced per arm, only the cameras remain to check
        RobotConfig {
            init_type: InitType::None,
            ..self.shared.clone()
        }
        .validate()
    }

    /// Derive the per-arm configs
    ///
    /// Both copies drop the shared cameras and visualization (the composite
    /// owns those), take their own initial joint state and get an `_left` /
    /// `_right` suffixed id when the shared config has one.
    pub fn split(&self) -> (RobotConfig, RobotConfig) {
        let mut base = self.shared.clone();
        base.cameras.clear();
        base.visualize = false;

        let mut left = base.clone();
        left.init_state = self.init_state_left.clone();
        left.id = base.id.as_ref().map(|id| format!("{}_left", id));

        let mut right = base;
        right.init_state = self.init_state_right.clone();
        right.id = right.id.as_ref().map(|id| format!("{}_right", id));

        (left, right)
    }
}
