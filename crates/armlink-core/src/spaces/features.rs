//! Feature declarations
//!
//! A feature map tells a client which keys a robot reads or writes and what
//! each key holds. It is built once per controller and never changes.

use serde::{Deserialize, Serialize};

use crate::config::CameraConfig;
use crate::hardware::{Frame, POSE_AXES};

use super::map::NamedMap;

/// Kind of value stored under a feature key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    /// A single float
    Float,
    /// An image of shape `(height, width, channels)`
    Image {
        height: usize,
        width: usize,
        channels: usize,
    },
}

impl FeatureType {
    /// An RGB image feature
    pub fn rgb(height: usize, width: usize) -> Self {
        Self::Image {
            height,
            width,
            channels: Frame::CHANNELS,
        }
    }

    /// Shape of the value (`[]` for floats)
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Float => Vec::new(),
            Self::Image {
                height,
                width,
                channels,
            } => vec![*height, *width, *channels],
        }
    }

    /// Total number of scalars in the value
    pub fn size(&self) -> usize {
        self.shape().iter().product()
    }
}

impl std::fmt::Display for FeatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float => write!(f, "float"),
            Self::Image {
                height,
                width,
                channels,
            } => write!(f, "({}, {}, {})", height, width, channels),
        }
    }
}

/// Ordered map from feature key to its type
pub type Features = NamedMap<FeatureType>;

/// One float feature per joint, keyed `<joint>_pos`
pub fn joint_features<S: AsRef<str>>(joint_names: impl IntoIterator<Item = S>) -> Features {
    joint_names
        .into_iter()
        .map(|name| (format!("{}_pos", name.as_ref()), FeatureType::Float))
        .collect()
}

/// The seven end-effector axes `x, y, z, roll, pitch, yaw, gripper`
pub fn pose_features() -> Features {
    POSE_AXES
        .iter()
        .map(|&axis| (axis, FeatureType::Float))
        .collect()
}

/// One image feature per camera, keyed by camera name
pub fn camera_features(cameras: &[CameraConfig]) -> Features {
    cameras
        .iter()
        .map(|camera| (camera.name.as_str(), FeatureType::rgb(camera.height, camera.width)))
        .collect()
}
