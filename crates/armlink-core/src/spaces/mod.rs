//! Observation and action maps
//!
//! Clients exchange ordered, string-keyed maps with a robot: the feature maps
//! declare what a robot produces and accepts, observations and actions carry
//! the values. Key order is part of the contract (joints in declaration order,
//! cameras after joints, left arm before right arm).
//!
//! # Example
//!
//! ```
//! use armlink_core::spaces::{joint_features, Action};
//!
//! let features = joint_features(["shoulder", "elbow", "gripper"]);
//! assert_eq!(features.keys().collect::<Vec<_>>(), ["shoulder_pos", "elbow_pos", "gripper_pos"]);
//!
//! let action: Action = [("shoulder_pos", 0.1), ("elbow_pos", -0.2), ("gripper_pos", 0.04)]
//!     .into_iter()
//!     .collect();
//! assert_eq!(action.get("elbow_pos"), Some(&-0.2));
//! ```

mod features;
mod map;

pub use features::{camera_features, joint_features, pose_features, FeatureType, Features};
pub use map::NamedMap;

use serde::{Deserialize, Serialize};

use crate::hardware::Frame;

/// A single observation entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObservationValue {
    /// A joint or pose axis value
    Scalar(f64),
    /// A camera frame
    Image(Frame),
}

impl ObservationValue {
    /// The scalar value, if this is one
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Image(_) => None,
        }
    }

    /// The frame, if this is one
    pub fn as_image(&self) -> Option<&Frame> {
        match self {
            Self::Image(frame) => Some(frame),
            Self::Scalar(_) => None,
        }
    }
}

impl From<f64> for ObservationValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Frame> for ObservationValue {
    fn from(frame: Frame) -> Self {
        Self::Image(frame)
    }
}

/// Observation returned by a robot: axis values (model units) and camera frames
pub type Observation = NamedMap<ObservationValue>;

/// Action sent to a robot, or joint state returned by one (model units)
pub type Action = NamedMap<f64>;
