//! Kinematics, numerical inverse kinematics, and safety-gated motion planning
//! for a 4-joint hobby servo arm commanded in pulse widths (µs).
//!
//! The library is purely computational: it never talks to hardware. Every
//! accepted pulse vector is handed back to the caller, and the caller's
//! transport is responsible for serial framing.

use serde::{Deserialize, Serialize};

pub mod arm_config;
pub mod errors;
pub mod ik;
pub mod kinematics;
pub mod planner;
pub mod safety;

pub use arm_config::{ArmConfig, CollisionZone, JointConfig, LinkOffset, RotationAxis};
pub use errors::ConfigError;
pub use ik::{IkParams, IkResult};
pub use kinematics::ArmKinematics;
pub use planner::SafeMovePlan;
pub use safety::{PathCheck, DEFAULT_PATH_SAMPLES};

/// Number of actuated joints.
pub const JOINT_COUNT: usize = 4;

/// Hard servo pulse limits in microseconds. Pulses outside this range can
/// damage the servos, so every public operation clamps to it.
pub const PULSE_MIN: u16 = 500;
pub const PULSE_MAX: u16 = 2500;

/// Center of the servo range; a joint with zero trim sits at 0° here.
pub const PULSE_NEUTRAL: u16 = 1500;

/// Commanded servo pulses, one per joint, always within
/// `[PULSE_MIN, PULSE_MAX]`. Passed explicitly through every call; the
/// library keeps no pulse state of its own.
pub type PulseVector = [u16; JOINT_COUNT];

/// Cartesian tool-tip position in millimeters, world frame (+Z up, origin at
/// the center of the base turntable).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TipPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl TipPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance to another point in mm.
    pub fn distance_to(&self, other: &TipPosition) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Derived pose: tool-tip position plus the calibrated joint angles that
/// produced it. Recomputed on every forward kinematics call, never cached.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Pose {
    pub tip: TipPosition,
    pub angles_deg: [f64; JOINT_COUNT],
}
