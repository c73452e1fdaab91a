//! Single-arm controller
//!
//! Four coordinate spaces meet here:
//!
//! ```text
//!   model (wire) ──model transform──► standard ──joint transform──► joint (driver)
//!                                         │
//!                                         └────pose transform────► pose (driver)
//! ```
//!
//! Observations always report joint positions. Actions are joint targets or
//! end-effector poses depending on [`ArmKinematicsMode`], and may be offsets
//! from a reference vector (see [`DeltaMode`](super::DeltaMode)).

use crate::config::{InitType, RobotConfig};
use crate::hardware::{ArmDriver, CameraSet, Frame, KinematicsStatus, Visualizer};
use crate::math::{SpaceTransform, StateVector};
use crate::spaces::{
    camera_features, joint_features, pose_features, Action, Features, Observation,
    ObservationValue,
};
use crate::{Error, Result};

use super::delta::ReferenceState;
use super::{ArmKinematicsMode, Robot};

/// Observations read at connect before the arm is positioned, so camera
/// buffers drain and auto-exposure settles
pub const WARMUP_READS: usize = 10;

/// Controller for one arm and its cameras
pub struct ArmController {
    config: RobotConfig,
    driver: Box<dyn ArmDriver>,
    cameras: CameraSet,
    visualizer: Option<Box<dyn Visualizer>>,
    /// model (wire) joint units <-> standard
    model_transform: SpaceTransform,
    /// model (wire) pose units <-> standard, end-effector mode only
    model_pose_transform: Option<SpaceTransform>,
    joint_transform: SpaceTransform,
    pose_transform: SpaceTransform,
    motor_features: Features,
    camera_features: Features,
    observation_features: Features,
    action_features: Features,
    references: ReferenceState,
    connected: bool,
}

impl ArmController {
    /// Create a controller
    ///
    /// The config is validated and `cameras` must hold exactly the cameras it
    /// declares. Nothing is connected yet.
    pub fn new(
        config: RobotConfig,
        driver: impl ArmDriver + 'static,
        cameras: CameraSet,
    ) -> Result<Self> {
        Self::with_boxed_driver(config, Box::new(driver), cameras)
    }

    /// Create a controller from an already boxed driver
    pub fn with_boxed_driver(
        config: RobotConfig,
        driver: Box<dyn ArmDriver>,
        cameras: CameraSet,
    ) -> Result<Self> {
        config.validate()?;
        check_cameras(&config, &cameras)?;

        let model_pose_transform = match config.mode {
            ArmKinematicsMode::Joint => None,
            ArmKinematicsMode::EndEffector => Some(config.model_pose_transform()?),
        };
        let motor_features = joint_features(&config.joint_names);
        let camera_features = camera_features(&config.cameras);
        let mut observation_features = motor_features.clone();
        observation_features.merge(camera_features.clone());
        let action_features = match config.mode {
            ArmKinematicsMode::Joint => motor_features.clone(),
            ArmKinematicsMode::EndEffector => pose_features(),
        };

        Ok(Self {
            model_transform: config.model_joint_transform()?,
            model_pose_transform,
            joint_transform: config.joint_transform()?,
            pose_transform: config.pose_transform()?,
            motor_features,
            camera_features,
            observation_features,
            action_features,
            references: ReferenceState::new(),
            connected: false,
            visualizer: None,
            config,
            driver,
            cameras,
        })
    }

    /// Attach a visualizer, used after each action when `config.visualize` is set
    pub fn with_visualizer(mut self, visualizer: impl Visualizer + 'static) -> Self {
        self.visualizer = Some(Box::new(visualizer));
        self
    }

    /// The configuration
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Kinematics mode
    pub fn mode(&self) -> ArmKinematicsMode {
        self.config.mode
    }

    /// `<joint>_pos` features, in joint order
    pub fn motor_features(&self) -> &Features {
        &self.motor_features
    }

    /// One image feature per camera
    pub fn camera_features(&self) -> &Features {
        &self.camera_features
    }

    /// Reference vectors (standard space)
    pub fn references(&self) -> &ReferenceState {
        &self.references
    }

    /// Read the joint state and convert it to standard space
    pub fn joint_state(&mut self) -> Result<StateVector> {
        let native = self.driver.joint_state()?;
        self.joint_transform.to_standard(&native)
    }

    /// Convert a standard-space joint state to driver units and command it
    pub fn set_joint_state(&mut self, state: &[f64]) -> Result<()> {
        let native = self.joint_transform.from_standard(state)?;
        self.driver.set_joint_state(&native)
    }

    /// Read the end-effector pose and convert it to standard space
    pub fn end_effector_state(&mut self) -> Result<StateVector> {
        let native = self.driver.end_effector_state()?;
        self.pose_transform.to_standard(&native)
    }

    /// Convert a standard-space pose to driver units and command it
    ///
    /// A kinematics failure reported by the driver is logged and returned, not
    /// raised.
    pub fn set_end_effector_state(&mut self, pose: &[f64]) -> Result<KinematicsStatus> {
        let native = self.pose_transform.from_standard(pose)?;
        let status = self.driver.set_end_effector_state(&native)?;
        if let KinematicsStatus::Failed { code } = status {
            tracing::warn!(
                "{}: inverse kinematics failed with code {}",
                self.config.display_name(),
                code
            );
        }
        Ok(status)
    }

    /// Read joints and frames, refresh the current reference
    fn observe(&mut self) -> Result<Observation> {
        let joints = self.joint_state()?;
        let model = self.model_transform.from_standard(&joints)?;
        let mut observation = Observation::with_capacity(self.observation_features.len());
        for (key, value) in self.motor_features.keys().zip(model) {
            observation.insert(key, ObservationValue::Scalar(value));
        }
        for (name, frame) in self.cameras.read_frames()? {
            observation.insert(name, ObservationValue::Image(frame));
        }

        let current = self.reference_reading(joints)?;
        self.references.set_current(current);
        tracing::trace!("{} observed", self.config.display_name());
        Ok(observation)
    }

    /// Warm up, move to the configured start and capture the initial reference
    fn initialize(&mut self) -> Result<()> {
        for _ in 0..WARMUP_READS {
            self.observe()?;
        }

        match self.config.init_type {
            InitType::Joint => {
                tracing::debug!("Moving to initial joint state");
                let state = self.config.init_state.clone();
                self.set_joint_state(&state)?;
            }
            InitType::EndEffector => {
                tracing::debug!("Moving to initial end-effector pose");
                let pose = self.config.init_ee_state.clone();
                self.set_end_effector_state(&pose)?;
            }
            InitType::None => {}
        }

        let joints = self.joint_state()?;
        let initial = self.reference_reading(joints)?;
        self.references.set_initial(initial);
        Ok(())
    }

    /// Close whatever `connect` opened; the original error is the one reported
    fn release_after_failed_connect(&mut self) {
        if let Err(e) = self.cameras.disconnect_all() {
            tracing::warn!("{}: releasing cameras failed: {}", self.config.display_name(), e);
        }
        if let Err(e) = self.driver.disconnect() {
            tracing::warn!("{}: releasing driver failed: {}", self.config.display_name(), e);
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected(self.config.display_name().to_string()));
        }
        Ok(())
    }

    /// Standard-space vector the delta references track in the current mode
    fn reference_reading(&mut self, joints: StateVector) -> Result<StateVector> {
        match self.config.mode {
            ArmKinematicsMode::Joint => Ok(joints),
            ArmKinematicsMode::EndEffector => self.end_effector_state(),
        }
    }

    /// Pull action values in action-feature order and convert them to standard space
    fn action_to_standard(&self, action: &Action) -> Result<StateVector> {
        let values = self
            .action_features
            .keys()
            .map(|key| {
                action
                    .get(key)
                    .copied()
                    .ok_or_else(|| Error::MissingActionKey(key.to_string()))
            })
            .collect::<Result<Vec<f64>>>()?;
        match &self.model_pose_transform {
            Some(transform) => transform.to_standard(&values),
            None => self.model_transform.to_standard(&values),
        }
    }

    /// Key a standard-space joint state by motor name, in model units
    fn joints_to_model(&self, joints: &[f64]) -> Result<Action> {
        let model = self.model_transform.from_standard(joints)?;
        Ok(self.motor_features.keys().zip(model).collect())
    }

    fn dispatch(&mut self, target: &[f64]) -> Result<()> {
        match self.config.mode {
            ArmKinematicsMode::Joint => self.set_joint_state(target),
            ArmKinematicsMode::EndEffector => self.set_end_effector_state(target).map(|_| ()),
        }
    }

    fn visualize(&mut self) -> Result<()> {
        if !self.config.visualize || self.visualizer.is_none() {
            return Ok(());
        }
        let pose = self.end_effector_state()?;
        let images: Vec<Frame> = self
            .cameras
            .read_frames()?
            .into_iter()
            .map(|(_, frame)| frame)
            .collect();
        if let Some(visualizer) = self.visualizer.as_mut() {
            visualizer.add(&images, &[pose])?;
            visualizer.plot()?;
        }
        Ok(())
    }
}

pub(super) fn check_cameras(config: &RobotConfig, cameras: &CameraSet) -> Result<()> {
    let declared: Vec<&str> = config.cameras.iter().map(|c| c.name.as_str()).collect();
    let provided: Vec<&str> = cameras.names().collect();
    if let Some(missing) = declared.iter().find(|name| !provided.contains(*name)) {
        return Err(Error::Config(format!("no camera provided for '{}'", missing)));
    }
    if let Some(extra) = provided.iter().find(|name| !declared.contains(*name)) {
        return Err(Error::Config(format!("camera '{}' is not declared in the config", extra)));
    }
    Ok(())
}

impl Robot for ArmController {
    fn name(&self) -> &str {
        self.config.display_name()
    }

    fn observation_features(&self) -> &Features {
        &self.observation_features
    }

    fn action_features(&self) -> &Features {
        &self.action_features
    }

    fn is_connected(&self) -> bool {
        self.connected && self.cameras.all_connected()
    }

    fn is_calibrated(&self) -> bool {
        self.driver.is_calibrated()
    }

    fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Err(Error::AlreadyConnected(self.config.display_name().to_string()));
        }
        tracing::info!(
            "Connecting {} ({} driver, {} cameras)",
            self.config.display_name(),
            self.driver.name(),
            self.cameras.len()
        );

        self.cameras.connect_all()?;
        if let Err(e) = self.driver.connect() {
            if let Err(release) = self.cameras.disconnect_all() {
                tracing::warn!("{}: releasing cameras failed: {}", self.config.display_name(), release);
            }
            return Err(e);
        }
        self.references.clear();

        if let Err(e) = self.initialize() {
            self.references.clear();
            self.release_after_failed_connect();
            return Err(e);
        }
        self.connected = true;

        tracing::info!("{} connected", self.config.display_name());
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected(self.config.display_name().to_string()));
        }
        self.cameras.disconnect_all()?;
        self.driver.disconnect()?;
        self.connected = false;
        self.references.clear();
        tracing::info!("{} disconnected", self.config.display_name());
        Ok(())
    }

    fn calibrate(&mut self) -> Result<()> {
        self.driver.calibrate()
    }

    fn configure(&mut self) -> Result<()> {
        self.driver.configure()
    }

    fn get_observation(&mut self) -> Result<Observation> {
        self.ensure_connected()?;
        self.observe()
    }

    fn send_action(&mut self, action: &Action) -> Result<Action> {
        self.ensure_connected()?;

        let standard = self.action_to_standard(action)?;
        let target = self.references.compose(self.config.delta_with, standard)?;
        tracing::trace!("{} dispatching {:?}", self.config.display_name(), target.as_slice());
        self.dispatch(&target)?;

        self.visualize()?;

        let joints = self.joint_state()?;
        self.joints_to_model(&joints)
    }
}

impl std::fmt::Debug for ArmController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmController")
            .field("name", &self.config.display_name())
            .field("driver", &self.driver.name())
            .field("mode", &self.config.mode)
            .field("delta_with", &self.config.delta_with)
            .field("cameras", &self.cameras)
            .field("connected", &self.connected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_units, CameraConfig};
    use crate::hardware::{Camera, DummyArm, DummyCamera, RecordingVisualizer};
    use crate::spaces::FeatureType;
    use crate::DeltaMode;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn three_joints() -> RobotConfig {
        RobotConfig::new(["j1", "j2", "gripper"])
    }

    fn action(pairs: &[(&str, f64)]) -> Action {
        pairs.iter().copied().collect()
    }

    fn joint_action(j1: f64, j2: f64, gripper: f64) -> Action {
        action(&[("j1_pos", j1), ("j2_pos", j2), ("gripper_pos", gripper)])
    }

    #[test]
    fn test_observation_features() {
        let config = three_joints().with_camera(CameraConfig::new("cam0", 480, 640));
        let controller = ArmController::new(
            config,
            DummyArm::new(3),
            CameraSet::new().with("cam0", DummyCamera::new(480, 640)),
        )
        .unwrap();

        let expected: Features = [
            ("j1_pos", FeatureType::Float),
            ("j2_pos", FeatureType::Float),
            ("gripper_pos", FeatureType::Float),
            ("cam0", FeatureType::rgb(480, 640)),
        ]
        .into_iter()
        .collect();
        assert_eq!(controller.observation_features(), &expected);
        assert_eq!(controller.action_features(), controller.motor_features());
        assert_eq!(controller.camera_features().len(), 1);
    }

    #[test]
    fn test_requires_connection_without_io() {
        let arm = DummyArm::new(3);
        let mut controller = ArmController::new(three_joints(), arm.clone(), CameraSet::new()).unwrap();

        assert!(!controller.is_connected());
        assert!(matches!(controller.get_observation(), Err(Error::NotConnected(_))));
        assert!(matches!(
            controller.send_action(&joint_action(0.0, 0.0, 0.0)),
            Err(Error::NotConnected(_))
        ));
        assert!(matches!(controller.disconnect(), Err(Error::NotConnected(_))));
        assert_eq!(arm.io_calls(), 0);
    }

    #[test]
    fn test_connect_warms_up_and_initializes() {
        let arm = DummyArm::new(3);
        let camera = DummyCamera::new(48, 64);
        let config = three_joints()
            .with_camera(CameraConfig::new("front", 48, 64))
            .with_init_joint_state(vec![0.1, 0.2, 0.03]);
        let mut controller = ArmController::new(
            config,
            arm.clone(),
            CameraSet::new().with("front", camera.clone()),
        )
        .unwrap();

        controller.connect().unwrap();
        assert!(controller.is_connected());
        assert!(arm.is_connected());
        assert_eq!(camera.reads(), WARMUP_READS);

        let commands = arm.joint_commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].as_slice(), &[0.1, 0.2, 0.03]);

        let refs = controller.references();
        assert_eq!(refs.initial().unwrap().as_slice(), &[0.1, 0.2, 0.03]);
        // warm-up observations ran before the arm moved
        assert_eq!(refs.current().unwrap().as_slice(), &[0.0, 0.0, 0.0]);

        assert!(matches!(controller.connect(), Err(Error::AlreadyConnected(_))));
    }

    #[test]
    fn test_observation_contents() {
        let arm = DummyArm::new(3);
        let config = three_joints().with_camera(CameraConfig::new("front", 4, 8));
        let mut controller = ArmController::new(
            config,
            arm.clone(),
            CameraSet::new().with("front", DummyCamera::new(4, 8)),
        )
        .unwrap();
        controller.connect().unwrap();

        arm.set_joints(&[0.25, -0.5, 0.04]);
        let observation = controller.get_observation().unwrap();
        assert_eq!(
            observation.keys().collect::<Vec<_>>(),
            vec!["j1_pos", "j2_pos", "gripper_pos", "front"]
        );
        assert_eq!(observation.get("j2_pos").and_then(ObservationValue::as_scalar), Some(-0.5));
        let frame = observation.get("front").and_then(ObservationValue::as_image).unwrap();
        assert_eq!(frame.shape(), (4, 8, 3));
        assert_eq!(controller.references().current().unwrap().as_slice(), &[0.25, -0.5, 0.04]);
    }

    #[test]
    fn test_unit_conversion_through_all_spaces() {
        let arm = DummyArm::new(3);
        let config = three_joints()
            .with_joint_units(parse_units(&["001degree", "001degree", "mm"]).unwrap())
            .with_model_joint_units(parse_units(&["degree", "degree", "m"]).unwrap());
        let mut controller = ArmController::new(config, arm.clone(), CameraSet::new()).unwrap();
        controller.connect().unwrap();

        let state = controller.send_action(&joint_action(90.0, -45.0, 0.02)).unwrap();

        let native = arm.joints();
        assert_relative_eq!(native[0], 9000.0, epsilon = 1e-6);
        assert_relative_eq!(native[1], -4500.0, epsilon = 1e-6);
        assert_relative_eq!(native[2], 20.0, epsilon = 1e-9);

        assert_relative_eq!(*state.get("j1_pos").unwrap(), 90.0, epsilon = 1e-9);
        assert_relative_eq!(*state.get("j2_pos").unwrap(), -45.0, epsilon = 1e-9);
        assert_relative_eq!(*state.get("gripper_pos").unwrap(), 0.02, epsilon = 1e-12);

        let standard = controller.joint_state().unwrap();
        assert_relative_eq!(standard[0], PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_units_round_trip_exactly() {
        let arm = DummyArm::new(3);
        let mut controller = ArmController::new(three_joints(), arm, CameraSet::new()).unwrap();
        controller.connect().unwrap();

        let sent = joint_action(0.123456789, -2.5, 0.0375);
        let state = controller.send_action(&sent).unwrap();
        assert_eq!(state, sent);
    }

    #[test]
    fn test_delta_previous_adds_last_observation() {
        let arm = DummyArm::new(3);
        let config = three_joints().with_delta(DeltaMode::Previous);
        let mut controller = ArmController::new(config, arm.clone(), CameraSet::new()).unwrap();
        controller.connect().unwrap();

        arm.set_joints(&[0.1, 0.2, 0.0]);
        controller.get_observation().unwrap();
        controller.send_action(&joint_action(0.5, 0.5, 0.01)).unwrap();

        let last = arm.joint_commands().pop().unwrap();
        assert_relative_eq!(last[0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(last[1], 0.7, epsilon = 1e-12);
        assert_relative_eq!(last[2], 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_delta_initial_adds_connect_state() {
        let arm = DummyArm::new(3);
        arm.set_joints(&[1.0, -1.0, 0.05]);
        let config = three_joints().with_delta(DeltaMode::Initial);
        let mut controller = ArmController::new(config, arm.clone(), CameraSet::new()).unwrap();
        controller.connect().unwrap();

        controller.send_action(&joint_action(0.5, 0.5, 0.0)).unwrap();
        // a second action is still relative to the connect-time state
        controller.send_action(&joint_action(0.25, 0.0, 0.0)).unwrap();

        let commands = arm.joint_commands();
        assert_eq!(commands[0].as_slice(), &[1.5, -0.5, 0.05]);
        assert_eq!(commands[1].as_slice(), &[1.25, -1.0, 0.05]);
    }

    #[test]
    fn test_references_reset_on_disconnect() {
        let arm = DummyArm::new(3);
        let mut controller = ArmController::new(three_joints(), arm.clone(), CameraSet::new()).unwrap();
        controller.connect().unwrap();
        assert!(controller.references().initial().is_some());

        controller.disconnect().unwrap();
        assert!(!arm.is_connected());
        assert!(controller.references().initial().is_none());
        assert!(controller.references().current().is_none());
    }

    #[test]
    fn test_missing_action_key() {
        let mut controller =
            ArmController::new(three_joints(), DummyArm::new(3), CameraSet::new()).unwrap();
        controller.connect().unwrap();
        let partial = action(&[("j1_pos", 0.0), ("j2_pos", 0.0)]);
        assert!(matches!(
            controller.send_action(&partial),
            Err(Error::MissingActionKey(k)) if k == "gripper_pos"
        ));
    }

    #[test]
    fn test_connect_failure_propagates() {
        let arm = DummyArm::new(3);
        arm.fail_next_connect("CAN bus down");
        let mut controller = ArmController::new(three_joints(), arm.clone(), CameraSet::new()).unwrap();

        assert!(matches!(controller.connect(), Err(Error::Hardware(m)) if m == "CAN bus down"));
        assert!(!controller.is_connected());
        controller.connect().unwrap();
    }

    #[test]
    fn test_failed_warm_up_leaves_controller_disconnected() {
        let arm = DummyArm::new(3);
        let camera = DummyCamera::new(2, 2);
        arm.fail_next_read("encoder timeout");
        let config = three_joints()
            .with_camera(CameraConfig::new("front", 2, 2))
            .with_init_joint_state(vec![0.1, 0.2, 0.0])
            .with_delta(DeltaMode::Initial);
        let mut controller = ArmController::new(
            config,
            arm.clone(),
            CameraSet::new().with("front", camera.clone()),
        )
        .unwrap();

        assert!(matches!(controller.connect(), Err(Error::Hardware(m)) if m == "encoder timeout"));
        assert!(!controller.is_connected());
        assert!(!arm.is_connected());
        assert!(!camera.is_connected());
        assert!(controller.references().initial().is_none());
        assert!(arm.joint_commands().is_empty());
        assert!(matches!(
            controller.send_action(&joint_action(0.0, 0.0, 0.0)),
            Err(Error::NotConnected(_))
        ));

        controller.connect().unwrap();
        assert!(controller.is_connected());
        assert_eq!(arm.joint_commands()[0].as_slice(), &[0.1, 0.2, 0.0]);
        assert_eq!(controller.references().initial().unwrap().as_slice(), &[0.1, 0.2, 0.0]);
        controller.send_action(&joint_action(0.5, 0.0, 0.0)).unwrap();
        assert_eq!(arm.joints().as_slice(), &[0.6, 0.2, 0.0]);
    }

    #[test]
    fn test_camera_set_must_match_config() {
        let config = three_joints().with_camera(CameraConfig::new("front", 4, 4));
        assert!(matches!(
            ArmController::new(config.clone(), DummyArm::new(3), CameraSet::new()),
            Err(Error::Config(_))
        ));
        let cameras = CameraSet::new()
            .with("front", DummyCamera::new(4, 4))
            .with("side", DummyCamera::new(4, 4));
        assert!(matches!(
            ArmController::new(config, DummyArm::new(3), cameras),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_end_effector_actions() {
        let arm = DummyArm::new(3);
        arm.set_pose(&[0.3, 0.0, 0.2, 0.0, 0.0, 0.0, 0.01]);
        let config = three_joints()
            .with_mode(ArmKinematicsMode::EndEffector)
            .with_delta(DeltaMode::Initial)
            .with_model_pose_units(
                parse_units(&["mm", "mm", "mm", "degree", "degree", "degree", "m"]).unwrap(),
            );
        let mut controller = ArmController::new(config, arm.clone(), CameraSet::new()).unwrap();
        assert_eq!(
            controller.action_features().keys().collect::<Vec<_>>(),
            vec!["x", "y", "z", "roll", "pitch", "yaw", "gripper"]
        );
        assert_eq!(controller.observation_features().len(), 3);

        controller.connect().unwrap();
        assert_eq!(
            controller.references().initial().unwrap().as_slice(),
            &[0.3, 0.0, 0.2, 0.0, 0.0, 0.0, 0.01]
        );

        let pose_action = action(&[
            ("x", 10.0),
            ("y", 0.0),
            ("z", -5.0),
            ("roll", 0.0),
            ("pitch", 0.0),
            ("yaw", 90.0),
            ("gripper", 0.0),
        ]);
        let state = controller.send_action(&pose_action).unwrap();
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["j1_pos", "j2_pos", "gripper_pos"]);
        assert!(arm.joint_commands().is_empty());

        let pose = arm.pose_commands().pop().unwrap();
        assert_relative_eq!(pose[0], 0.31, epsilon = 1e-12);
        assert_relative_eq!(pose[2], 0.195, epsilon = 1e-12);
        assert_relative_eq!(pose[5], PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(pose[6], 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_end_effector_observation_tracks_pose() {
        let arm = DummyArm::new(3);
        let config = three_joints()
            .with_mode(ArmKinematicsMode::EndEffector)
            .with_delta(DeltaMode::Previous);
        let mut controller = ArmController::new(config, arm.clone(), CameraSet::new()).unwrap();
        controller.connect().unwrap();

        arm.set_pose(&[0.1, 0.2, 0.3, 0.0, 0.0, 0.0, 0.0]);
        let observation = controller.get_observation().unwrap();
        assert!(observation.contains_key("j1_pos"));
        assert_eq!(
            controller.references().current().unwrap().as_slice(),
            &[0.1, 0.2, 0.3, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_kinematics_failure_is_not_fatal() {
        let arm = DummyArm::new(3);
        arm.set_kinematics_failure(Some(-1));
        let config = three_joints().with_mode(ArmKinematicsMode::EndEffector);
        let mut controller = ArmController::new(config, arm.clone(), CameraSet::new()).unwrap();
        controller.connect().unwrap();

        let status = controller
            .set_end_effector_state(&[0.0, 0.0, 0.1, 0.0, 0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(status, KinematicsStatus::Failed { code: -1 });

        let pose_action = action(&[
            ("x", 0.0),
            ("y", 0.0),
            ("z", 0.0),
            ("roll", 0.0),
            ("pitch", 0.0),
            ("yaw", 0.0),
            ("gripper", 0.0),
        ]);
        assert!(controller.send_action(&pose_action).is_ok());
    }

    #[test]
    fn test_init_end_effector_pose() {
        let arm = DummyArm::new(3);
        let config = three_joints().with_init_pose(vec![0.2, 0.0, 0.3, 0.0, PI, 0.0, 0.02]);
        let mut controller = ArmController::new(config, arm.clone(), CameraSet::new()).unwrap();
        controller.connect().unwrap();
        assert_eq!(arm.pose_commands().len(), 1);
        assert!(arm.joint_commands().is_empty());
        // joint mode keeps its initial reference in joint space
        assert_eq!(controller.references().initial().unwrap().as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_visualization_after_action() {
        let visualizer = RecordingVisualizer::new();
        let config = three_joints()
            .with_camera(CameraConfig::new("front", 4, 4))
            .with_visualization(true);
        let mut controller = ArmController::new(
            config,
            DummyArm::new(3),
            CameraSet::new().with("front", DummyCamera::new(4, 4)),
        )
        .unwrap()
        .with_visualizer(visualizer.clone());
        controller.connect().unwrap();
        assert_eq!(visualizer.plots(), 0);

        controller.send_action(&joint_action(0.0, 0.0, 0.0)).unwrap();
        controller.send_action(&joint_action(0.1, 0.0, 0.0)).unwrap();
        assert_eq!(visualizer.plots(), 2);
        assert_eq!(visualizer.image_counts(), vec![1, 1]);
        assert_eq!(visualizer.poses()[0].len(), 1);
    }

    #[test]
    fn test_visualizer_ignored_when_disabled() {
        let visualizer = RecordingVisualizer::new();
        let mut controller = ArmController::new(three_joints(), DummyArm::new(3), CameraSet::new())
            .unwrap()
            .with_visualizer(visualizer.clone());
        controller.connect().unwrap();
        controller.send_action(&joint_action(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(visualizer.plots(), 0);
    }
}
