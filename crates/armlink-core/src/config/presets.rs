//! Configurations for arms used in practice
//!
//! Only the unit layout and starting poses live here; the vendor drivers that
//! speak to these arms are separate [`ArmDriver`](crate::hardware::ArmDriver)
//! implementations.

use crate::math::Unit;

use super::{BimanualConfig, InitType, RobotConfig, UnitSpec};

const PIPER_JOINTS: [&str; 7] = [
    "joint_1", "joint_2", "joint_3", "joint_4", "joint_5", "joint_6", "gripper",
];

/// Piper gripper opening commanded at connect (standard space). The gripper
/// axis is `m` in every Piper unit list, so the driver receives it unchanged.
const PIPER_GRIPPER_OPEN: f64 = 60000.0;

/// Realman starting poses (standard space), captured from a working bimanual rig
const REALMAN_LEFT_HOME: [f64; 8] = [-0.84, -2.03, 1.15, 1.15, 2.71, 1.60, -2.99, 888.0];
const REALMAN_RIGHT_HOME: [f64; 8] = [1.16, 2.01, -0.79, -0.68, -2.84, -1.61, 2.37, 832.0];

fn repeat_then_meter(unit: UnitSpec, n: usize) -> Vec<UnitSpec> {
    std::iter::repeat(unit)
        .take(n)
        .chain(std::iter::once(UnitSpec::plain(Unit::METER)))
        .collect()
}

impl RobotConfig {
    /// AgileX Piper: six joints in hundredths of a degree and a gripper
    pub fn piper() -> Self {
        let centideg = UnitSpec::hundredths(Unit::DEGREE);
        let centimm = UnitSpec::hundredths(Unit::MILLIMETER);
        let m = UnitSpec::plain(Unit::METER);
        let mut init_state = vec![0.0; PIPER_JOINTS.len()];
        init_state[PIPER_JOINTS.len() - 1] = PIPER_GRIPPER_OPEN;

        Self {
            id: Some("piper".into()),
            joint_names: PIPER_JOINTS.iter().map(|s| s.to_string()).collect(),
            init_type: InitType::Joint,
            init_state,
            joint_units: repeat_then_meter(centideg, 6),
            pose_units: vec![centimm, centimm, centimm, centideg, centideg, centideg, m],
            model_joint_units: repeat_then_meter(UnitSpec::plain(Unit::RADIAN), 6),
            ..Default::default()
        }
    }

    /// Realman 7-DoF arm: joints and orientation in degrees
    pub fn realman() -> Self {
        let deg = UnitSpec::plain(Unit::DEGREE);
        let m = UnitSpec::plain(Unit::METER);
        Self {
            id: Some("realman".into()),
            joint_units: repeat_then_meter(deg, 7),
            pose_units: vec![m, m, m, deg, deg, deg, m],
            ..Default::default()
        }
    }
}

impl BimanualConfig {
    /// Two Piper arms, both starting from the Piper home pose
    pub fn bi_piper() -> Self {
        let shared = RobotConfig {
            id: Some("bi_piper".into()),
            ..RobotConfig::piper()
        };
        Self::new(shared)
    }

    /// Two Realman arms with mirrored starting poses
    pub fn bi_realman() -> Self {
        let shared = RobotConfig {
            id: Some("bi_realman".into()),
            ..RobotConfig::realman()
        };
        Self::new(shared).with_init_states(REALMAN_LEFT_HOME.to_vec(), REALMAN_RIGHT_HOME.to_vec())
    }
}
