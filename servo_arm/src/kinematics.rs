// Forward kinematics for the 4-joint servo arm.
//
// The tool-tip pose is built by composing one homogeneous transform per
// joint: translate to the joint's center first, then rotate about the
// joint's declared axis. Both the translation and the axis are calibration
// data (see `ArmConfig`), never derived from the joint index.

use crate::arm_config::{ArmConfig, LinkOffset, RotationAxis};
use crate::{Pose, PulseVector, TipPosition, JOINT_COUNT, PULSE_MAX, PULSE_MIN};

/// 4x4 homogeneous transformation matrix.
type Mat4 = [[f64; 4]; 4];

const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Kinematic engine for one arm. Owns an immutable calibration and exposes
/// the pulse↔angle codec, forward kinematics, and (in the sibling modules)
/// path checking, IK, and planning. Holds no mutable state, so a shared
/// reference can be used from any thread.
#[derive(Debug, Clone)]
pub struct ArmKinematics {
    config: ArmConfig,
}

impl ArmKinematics {
    /// Create the engine from a validated calibration.
    pub fn from_config(config: ArmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    // ========================================================================
    // Joint angle codec
    // ========================================================================

    /// Joint angle in degrees for a pulse width.
    ///
    /// `1500 + trim` is the neutral (0°) pulse; the delta from neutral is
    /// scaled to degrees, direction-corrected, and offset by the geometric
    /// mounting correction.
    pub fn pulse_to_angle(&self, pulse: f64, joint: usize) -> f64 {
        let cfg = &self.config.joints[joint];
        let delta = pulse - f64::from(cfg.neutral_pulse());
        delta * cfg.scale_deg_per_us * f64::from(cfg.direction) + cfg.offset_deg
    }

    /// Exact algebraic inverse of [`pulse_to_angle`](Self::pulse_to_angle),
    /// rounded to the nearest integer pulse and clamped to the servo range.
    pub fn angle_to_pulse(&self, angle_deg: f64, joint: usize) -> u16 {
        let cfg = &self.config.joints[joint];
        // direction is ±1, so dividing and multiplying are interchangeable
        let oriented = (angle_deg - cfg.offset_deg) * f64::from(cfg.direction);
        let delta = oriented / cfg.scale_deg_per_us;
        let pulse = f64::from(cfg.neutral_pulse()) + delta;
        pulse
            .round()
            .clamp(f64::from(PULSE_MIN), f64::from(PULSE_MAX)) as u16
    }

    /// Pulses that put every joint at its configured 0° (vertical) position:
    /// `1500 + trim` per joint. This is the mandatory intermediate waypoint
    /// for every planned move.
    pub fn home_pulses(&self) -> PulseVector {
        let mut home = [0u16; JOINT_COUNT];
        for (joint, cfg) in self.config.joints.iter().enumerate() {
            // validate() guarantees the neutral pulse is inside the range
            home[joint] = cfg
                .neutral_pulse()
                .clamp(i32::from(PULSE_MIN), i32::from(PULSE_MAX)) as u16;
        }
        home
    }

    // ========================================================================
    // Transform chain
    // ========================================================================

    /// Tool-tip pose for a pulse vector.
    ///
    /// Total function: it does not verify reachability or collision, it only
    /// reports where the given pulses put the tip.
    pub fn forward_kinematics(&self, pulses: &PulseVector) -> Pose {
        let mut as_f64 = [0.0f64; JOINT_COUNT];
        for (dst, src) in as_f64.iter_mut().zip(pulses) {
            *dst = f64::from(*src);
        }
        self.forward_kinematics_f64(&as_f64)
    }

    /// FK over fractional pulses. The path sampler and the IK solver work in
    /// continuous pulse space and only round when a command leaves the crate.
    pub(crate) fn forward_kinematics_f64(&self, pulses: &[f64; JOINT_COUNT]) -> Pose {
        let mut angles_deg = [0.0f64; JOINT_COUNT];
        for joint in 0..JOINT_COUNT {
            angles_deg[joint] = self.pulse_to_angle(pulses[joint], joint);
        }

        // M = T_1 · R_1 · T_2 · R_2 · ...: translate to each joint's center
        // before rotating about its axis, then append the fixed tool offset.
        let mut m = IDENTITY;
        for joint in 0..JOINT_COUNT {
            m = mat_mult(&m, &translation(&self.config.links[joint]));
            m = mat_mult(
                &m,
                &rotation(self.config.joints[joint].axis, angles_deg[joint]),
            );
        }
        m = mat_mult(&m, &translation(&self.config.tool_offset));

        Pose {
            tip: TipPosition::new(m[0][3], m[1][3], m[2][3]),
            angles_deg,
        }
    }
}

impl Default for ArmKinematics {
    fn default() -> Self {
        Self::from_config(ArmConfig::default())
    }
}

/// Rotation about a principal axis by an angle in degrees.
fn rotation(axis: RotationAxis, angle_deg: f64) -> Mat4 {
    let rad = angle_deg.to_radians();
    let c = rad.cos();
    let s = rad.sin();

    match axis {
        RotationAxis::X => [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
        RotationAxis::Y => [
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
        RotationAxis::Z => [
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    }
}

fn translation(offset: &LinkOffset) -> Mat4 {
    [
        [1.0, 0.0, 0.0, offset.x],
        [0.0, 1.0, 0.0, offset.y],
        [0.0, 0.0, 1.0, offset.z],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Multiply two 4x4 homogeneous transformation matrices.
fn mat_mult(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm_config::ArmConfig;

    /// Measured arm with the mounting offsets zeroed, so that the neutral
    /// pulse maps to exactly 0° on every joint.
    fn zero_offset_config() -> ArmConfig {
        let mut config = ArmConfig::measured_arm();
        for joint in &mut config.joints {
            joint.offset_deg = 0.0;
        }
        config
    }

    #[test]
    fn test_neutral_pose() {
        let kin = ArmKinematics::from_config(zero_offset_config());
        let home = kin.home_pulses();
        assert_eq!(home, [1500, 1529, 1500, 1500]);

        let pose = kin.forward_kinematics(&home);
        for (joint, angle) in pose.angles_deg.iter().enumerate() {
            assert!(
                angle.abs() < 1e-9,
                "joint {} should be at 0° at the neutral pulse, got {}",
                joint + 1,
                angle
            );
        }

        // With all angles at zero the chain degenerates to the sum of the
        // link translations:
        //   x = 1.70 + 11.49 - 14.00        = -0.81
        //   y = 14.06 + 5.31 - 4.64         = 14.73
        //   z = 97.48 + 120 + 89.75 + 50    = 357.23
        println!(
            "neutral tip: ({:.4}, {:.4}, {:.4})",
            pose.tip.x, pose.tip.y, pose.tip.z
        );
        assert!((pose.tip.x - -0.81).abs() < 0.01);
        assert!((pose.tip.y - 14.73).abs() < 0.01);
        assert!((pose.tip.z - 357.23).abs() < 0.01);
    }

    #[test]
    fn test_codec_round_trip() {
        let kin = ArmKinematics::default();
        for joint in 0..JOINT_COUNT {
            for pulse in (PULSE_MIN..=PULSE_MAX).step_by(7) {
                let angle = kin.pulse_to_angle(f64::from(pulse), joint);
                let back = kin.angle_to_pulse(angle, joint);
                let diff = (i32::from(back) - i32::from(pulse)).abs();
                assert!(
                    diff <= 1,
                    "joint {} pulse {} round-tripped to {} (angle {:.4})",
                    joint + 1,
                    pulse,
                    back,
                    angle
                );
            }
        }
    }

    #[test]
    fn test_fk_is_deterministic() {
        let kin = ArmKinematics::default();
        let pulses = [1432, 1711, 1388, 1650];
        let a = kin.forward_kinematics(&pulses);
        let b = kin.forward_kinematics(&pulses);
        assert_eq!(a, b);
    }

    #[test]
    fn test_base_yaw_preserves_radius_and_height() {
        // J1 rotates about Z at the world origin, so sweeping it must keep
        // both the tip's distance from the Z axis and its height unchanged.
        let kin = ArmKinematics::default();
        let reference = kin.forward_kinematics(&[1500, 1600, 1450, 1500]).tip;
        let ref_radius = (reference.x * reference.x + reference.y * reference.y).sqrt();

        for j1 in [900u16, 1200, 1800, 2100] {
            let tip = kin.forward_kinematics(&[j1, 1600, 1450, 1500]).tip;
            let radius = (tip.x * tip.x + tip.y * tip.y).sqrt();
            assert!((radius - ref_radius).abs() < 1e-9);
            assert!((tip.z - reference.z).abs() < 1e-9);
        }
    }

    #[test]
    fn test_angle_to_pulse_clamps_to_servo_range() {
        let kin = ArmKinematics::default();
        // 0.135 deg/µs over [500, 2500] covers ±135°; anything further must
        // clamp instead of producing an out-of-range pulse.
        let low = kin.angle_to_pulse(-500.0, 0);
        let high = kin.angle_to_pulse(500.0, 0);
        assert!(low >= PULSE_MIN && low <= PULSE_MAX);
        assert!(high >= PULSE_MIN && high <= PULSE_MAX);
    }
}
