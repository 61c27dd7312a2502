// Arm calibration model.
//
// Everything the kinematics needs to know about a specific physical arm
// lives here: per-joint servo calibration, the fixed link translations
// between joint frames, and the base exclusion cylinder. The struct is
// loaded (or built) once, validated, and then passed around read-only;
// there is no global calibration state.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::{JOINT_COUNT, PULSE_MAX, PULSE_MIN, PULSE_NEUTRAL};

/// Rotation axis of a joint in its local frame.
///
/// Stored as explicit per-joint data rather than derived from the joint
/// index, so a different arm (or a 5th joint) cannot silently get the wrong
/// geometry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

/// Per-joint servo calibration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct JointConfig {
    /// Degrees of joint rotation per microsecond of pulse width. Always > 0;
    /// use `direction` to invert a servo.
    pub scale_deg_per_us: f64,
    /// +1 for normal, -1 for inverted mounting.
    pub direction: i8,
    /// Geometric offset in degrees, for joints whose neutral pulse does not
    /// sit exactly at the 0° (vertical) position.
    pub offset_deg: f64,
    /// Calibration trim in µs: the joint is logically at 0° when the pulse
    /// is `1500 + trim`.
    pub trim_us: i16,
    /// Axis this joint rotates about in its local frame.
    pub axis: RotationAxis,
}

impl JointConfig {
    /// Pulse at which this joint reads 0°.
    pub fn neutral_pulse(&self) -> i32 {
        i32::from(PULSE_NEUTRAL) + i32::from(self.trim_us)
    }
}

/// Fixed translation between consecutive joint frames, in mm.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LinkOffset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LinkOffset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Cylindrical exclusion volume around the base housing, rooted at the world
/// origin and aligned with +Z. The tool tip must never enter it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CollisionZone {
    /// Cylinder radius in mm.
    pub radius: f64,
    /// Cylinder height in mm, measured up from z = 0.
    pub height: f64,
}

/// Complete arm calibration: joints, link geometry, and the safety zone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArmConfig {
    pub joints: [JointConfig; JOINT_COUNT],
    /// Translation applied *before* each joint's rotation; `links[0]` is the
    /// base→J1 transition (zero for this arm, the turntable sits at the
    /// origin).
    pub links: [LinkOffset; JOINT_COUNT],
    /// Final translation from the wrist frame to the tool tip.
    pub tool_offset: LinkOffset,
    pub base_zone: CollisionZone,
}

impl ArmConfig {
    /// Calibration of the measured arm, from physical measurement and STL
    /// analysis.
    ///
    /// Servos: J1-J3 are TD-8120MG (270° over 2000µs → 0.135 deg/µs), J4 is
    /// an MG90S (180° over 2000µs → 0.09 deg/µs). Directions, offsets and
    /// trims come from the calibration runs; the J2 offset of 4.3° corrects
    /// a mounting misalignment, and its 29µs trim zeroes the true vertical.
    pub fn measured_arm() -> Self {
        Self {
            joints: [
                JointConfig {
                    scale_deg_per_us: 0.135,
                    direction: -1,
                    offset_deg: 0.0,
                    trim_us: 0,
                    axis: RotationAxis::Z, // base yaw
                },
                JointConfig {
                    scale_deg_per_us: 0.135,
                    direction: 1,
                    offset_deg: 4.3,
                    trim_us: 29,
                    axis: RotationAxis::X, // shoulder pitch
                },
                JointConfig {
                    scale_deg_per_us: 0.135,
                    direction: -1,
                    offset_deg: 0.0,
                    trim_us: 0,
                    axis: RotationAxis::X, // elbow pitch
                },
                JointConfig {
                    scale_deg_per_us: 0.09,
                    direction: -1,
                    offset_deg: 0.0,
                    trim_us: 0,
                    axis: RotationAxis::Z, // wrist yaw
                },
            ],
            links: [
                LinkOffset::ZERO,                      // base center → J1 axis
                LinkOffset::new(1.70, 14.06, 97.48),   // J1 → shoulder
                LinkOffset::new(0.0, 0.0, 120.0),      // shoulder → elbow (humerus)
                LinkOffset::new(11.49, 5.31, 89.75),   // elbow → wrist (forearm)
            ],
            tool_offset: LinkOffset::new(-14.0, -4.64, 50.0),
            // Base housing: 60.625mm diameter, 61mm tall (from the incident
            // report measurements).
            base_zone: CollisionZone {
                radius: 60.625 / 2.0,
                height: 61.0,
            },
        }
    }

    /// Validates the calibration. Must be called once after loading;
    /// the kinematics assume a valid config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (joint, cfg) in self.joints.iter().enumerate() {
            if cfg.scale_deg_per_us <= 0.0 {
                return Err(ConfigError::NonPositiveScale { joint });
            }
            if cfg.direction != 1 && cfg.direction != -1 {
                return Err(ConfigError::InvalidDirection {
                    joint,
                    direction: cfg.direction,
                });
            }
            let neutral = cfg.neutral_pulse();
            if neutral < i32::from(PULSE_MIN) || neutral > i32::from(PULSE_MAX) {
                return Err(ConfigError::NeutralOutOfRange { joint, neutral });
            }
        }
        if self.base_zone.radius <= 0.0 || self.base_zone.height <= 0.0 {
            return Err(ConfigError::DegenerateCollisionZone);
        }
        Ok(())
    }

    /// Loads and validates a calibration file written by the external
    /// calibration tool.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ArmConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self::measured_arm()
    }
}
