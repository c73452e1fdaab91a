//! Two arms behind one interface
//!
//! Each arm keeps its own [`ArmController`] (transforms, references, driver).
//! The composite only namespaces keys and owns the cameras shared by both arms.
//! Every fan-out runs left arm first, then right arm, then shared cameras.

use crate::config::BimanualConfig;
use crate::hardware::{ArmDriver, CameraSet, Frame, Visualizer};
use crate::spaces::{Action, Features, Observation, ObservationValue};
use crate::{Error, Result};

use super::arm::{check_cameras, ArmController};
use super::Robot;

/// Key prefix of the left arm
pub const LEFT_PREFIX: &str = "left_";
/// Key prefix of the right arm
pub const RIGHT_PREFIX: &str = "right_";

/// Controller for a pair of arms and their shared cameras
pub struct BimanualController {
    config: BimanualConfig,
    left: ArmController,
    right: ArmController,
    cameras: CameraSet,
    visualizer: Option<Box<dyn Visualizer>>,
    motor_features: Features,
    camera_features: Features,
    observation_features: Features,
    action_features: Features,
}

impl BimanualController {
    /// Create a bimanual controller
    ///
    /// The config is split into two per-arm configs (see
    /// [`BimanualConfig::split`]). `cameras` must hold exactly the shared
    /// cameras the config declares.
    pub fn new(
        config: BimanualConfig,
        left_driver: impl ArmDriver + 'static,
        right_driver: impl ArmDriver + 'static,
        cameras: CameraSet,
    ) -> Result<Self> {
        config.validate()?;
        check_cameras(&config.shared, &cameras)?;

        let (left_config, right_config) = config.split();
        let left = ArmController::new(left_config, left_driver, CameraSet::new())?;
        let right = ArmController::new(right_config, right_driver, CameraSet::new())?;

        let motor_features = prefixed_union(left.motor_features(), right.motor_features());
        let camera_features = crate::spaces::camera_features(&config.shared.cameras);
        let mut observation_features =
            prefixed_union(left.observation_features(), right.observation_features());
        observation_features.merge(camera_features.clone());
        let action_features = prefixed_union(left.action_features(), right.action_features());

        Ok(Self {
            config,
            left,
            right,
            cameras,
            visualizer: None,
            motor_features,
            camera_features,
            observation_features,
            action_features,
        })
    }

    /// Attach a visualizer, used after each action when the shared config enables it
    pub fn with_visualizer(mut self, visualizer: impl Visualizer + 'static) -> Self {
        self.visualizer = Some(Box::new(visualizer));
        self
    }

    /// The configuration
    pub fn config(&self) -> &BimanualConfig {
        &self.config
    }

    /// The left arm
    pub fn left(&self) -> &ArmController {
        &self.left
    }

    /// The right arm
    pub fn right(&self) -> &ArmController {
        &self.right
    }

    /// Prefixed joint features of both arms
    pub fn motor_features(&self) -> &Features {
        &self.motor_features
    }

    /// Features of the shared cameras
    pub fn camera_features(&self) -> &Features {
        &self.camera_features
    }

    /// Split an action into the left and right halves, prefixes removed
    fn split_action(&self, action: &Action) -> (Action, Action) {
        for key in action.keys() {
            if !key.starts_with(LEFT_PREFIX) && !key.starts_with(RIGHT_PREFIX) {
                tracing::debug!("{}: dropping action key '{}' without arm prefix", self.name(), key);
            }
        }
        (
            action.strip_prefix(LEFT_PREFIX),
            action.strip_prefix(RIGHT_PREFIX),
        )
    }

    fn visualize(&mut self) -> Result<()> {
        if !self.config.shared.visualize || self.visualizer.is_none() {
            return Ok(());
        }
        let poses = [self.left.end_effector_state()?, self.right.end_effector_state()?];
        let images: Vec<Frame> = self
            .cameras
            .read_frames()?
            .into_iter()
            .map(|(_, frame)| frame)
            .collect();
        if let Some(visualizer) = self.visualizer.as_mut() {
            visualizer.add(&images, &poses)?;
            visualizer.plot()?;
        }
        Ok(())
    }
}

fn prefixed_union(left: &Features, right: &Features) -> Features {
    let mut features = left.clone().prefixed(LEFT_PREFIX);
    features.merge(right.clone().prefixed(RIGHT_PREFIX));
    features
}

impl Robot for BimanualController {
    fn name(&self) -> &str {
        self.config.shared.display_name()
    }

    fn observation_features(&self) -> &Features {
        &self.observation_features
    }

    fn action_features(&self) -> &Features {
        &self.action_features
    }

    fn is_connected(&self) -> bool {
        self.left.is_connected() && self.right.is_connected() && self.cameras.all_connected()
    }

    fn is_calibrated(&self) -> bool {
        self.left.is_calibrated() && self.right.is_calibrated()
    }

    /// Connect the left arm, the right arm, then the shared cameras
    ///
    /// Parts already connected by an earlier, partially failed call are skipped.
    fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected(self.name().to_string()));
        }
        if !self.left.is_connected() {
            self.left.connect()?;
        }
        if !self.right.is_connected() {
            self.right.connect()?;
        }
        self.cameras.connect_all()?;
        tracing::info!("{} connected", self.name());
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        let left = self.left.is_connected();
        let right = self.right.is_connected();
        // shared cameras only connect after both arms
        if !left && !right {
            return Err(Error::NotConnected(self.name().to_string()));
        }
        if left {
            self.left.disconnect()?;
        }
        if right {
            self.right.disconnect()?;
        }
        self.cameras.disconnect_all()?;
        tracing::info!("{} disconnected", self.name());
        Ok(())
    }

    fn calibrate(&mut self) -> Result<()> {
        self.left.calibrate()?;
        self.right.calibrate()
    }

    fn configure(&mut self) -> Result<()> {
        self.left.configure()?;
        self.right.configure()
    }

    fn get_observation(&mut self) -> Result<Observation> {
        if !self.is_connected() {
            return Err(Error::NotConnected(self.name().to_string()));
        }
        let mut observation = self.left.get_observation()?.prefixed(LEFT_PREFIX);
        observation.merge(self.right.get_observation()?.prefixed(RIGHT_PREFIX));
        for (name, frame) in self.cameras.read_frames()? {
            observation.insert(name, ObservationValue::Image(frame));
        }
        Ok(observation)
    }

    fn send_action(&mut self, action: &Action) -> Result<Action> {
        if !self.is_connected() {
            return Err(Error::NotConnected(self.name().to_string()));
        }
        let (left_action, right_action) = self.split_action(action);

        let mut state = self.left.send_action(&left_action)?.prefixed(LEFT_PREFIX);
        state.merge(self.right.send_action(&right_action)?.prefixed(RIGHT_PREFIX));

        self.visualize()?;
        Ok(state)
    }
}

impl std::fmt::Debug for BimanualController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BimanualController")
            .field("name", &self.name())
            .field("left", &self.left)
            .field("right", &self.right)
            .field("cameras", &self.cameras)
            .finish()
    }
}
