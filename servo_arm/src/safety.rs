// Collision oracle and path sampler.
//
// These are the checks that exist because of the base-strike incident: the
// tool tip must never enter the cylinder occupied by the rotating base
// housing, neither at a commanded target nor anywhere along the way there.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arm_config::CollisionZone;
use crate::kinematics::ArmKinematics;
use crate::{PulseVector, TipPosition, JOINT_COUNT};

/// Default number of segments sampled along an interpolated path.
pub const DEFAULT_PATH_SAMPLES: usize = 20;

impl CollisionZone {
    /// True iff the point lies inside the exclusion cylinder:
    /// `0 ≤ z ≤ height` and radial distance from the Z axis `< radius`.
    pub fn contains(&self, x: f64, y: f64, z: f64) -> bool {
        if z < 0.0 || z > self.height {
            return false;
        }
        (x * x + y * y).sqrt() < self.radius
    }
}

/// Outcome of sampling one pulse-space path against the exclusion cylinder.
/// On a hit, `point` and `progress` describe the first colliding sample
/// (lowest interpolation fraction).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PathCheck {
    pub collision: bool,
    pub point: Option<TipPosition>,
    pub progress: Option<f64>,
}

impl PathCheck {
    fn clear() -> Self {
        Self {
            collision: false,
            point: None,
            progress: None,
        }
    }

    fn hit(point: TipPosition, progress: f64) -> Self {
        Self {
            collision: true,
            point: Some(point),
            progress: Some(progress),
        }
    }
}

impl ArmKinematics {
    /// Checks a straight line in *pulse* space (commands are issued in pulse
    /// space, so that is the path the servos will actually sweep) by running
    /// forward kinematics at `samples + 1` evenly spaced fractions and
    /// testing each tip position against the base cylinder.
    ///
    /// The sample density is fixed regardless of path length, so a collision
    /// pocket thinner than one segment can slip through. Known fidelity
    /// limitation; callers wanting more resolution pass a larger `samples`.
    pub fn check_path_collision(
        &self,
        start: &PulseVector,
        end: &PulseVector,
        samples: usize,
    ) -> PathCheck {
        let samples = samples.max(1);
        for step in 0..=samples {
            let t = step as f64 / samples as f64;
            let mut interpolated = [0.0f64; JOINT_COUNT];
            for joint in 0..JOINT_COUNT {
                let a = f64::from(start[joint]);
                let b = f64::from(end[joint]);
                interpolated[joint] = a + t * (b - a);
            }

            let tip = self.forward_kinematics_f64(&interpolated).tip;
            if self.config().base_zone.contains(tip.x, tip.y, tip.z) {
                debug!(
                    progress = t,
                    x = tip.x,
                    y = tip.y,
                    z = tip.z,
                    "path sample inside base cylinder"
                );
                return PathCheck::hit(tip, t);
            }
        }
        PathCheck::clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm_config::ArmConfig;

    #[test]
    fn test_collision_boundaries() {
        let zone = ArmConfig::measured_arm().base_zone; // radius 30.3125, height 61

        // On the axis, inside the height band.
        assert!(zone.contains(0.0, 0.0, 0.0));
        assert!(zone.contains(0.0, 0.0, 30.0));
        assert!(zone.contains(0.0, 0.0, 61.0)); // top face is inclusive

        // Outside the height band.
        assert!(!zone.contains(0.0, 0.0, -0.01));
        assert!(!zone.contains(0.0, 0.0, 61.01));
        assert!(!zone.contains(0.0, 0.0, 100.0));

        // Radial boundary is exclusive at exactly the radius.
        assert!(zone.contains(zone.radius - 0.01, 0.0, 30.0));
        assert!(!zone.contains(zone.radius, 0.0, 30.0));
        assert!(!zone.contains(50.0, 0.0, 30.0));
        assert!(!zone.contains(20.0, 25.0, 30.0)); // sqrt(20²+25²) ≈ 32
    }

    #[test]
    fn test_clear_path_reports_no_collision() {
        let kin = ArmKinematics::default();
        let home = kin.home_pulses();
        let check = kin.check_path_collision(&[1500, 1600, 1500, 1500], &home, DEFAULT_PATH_SAMPLES);
        assert!(!check.collision);
        assert_eq!(check.point, None);
        assert_eq!(check.progress, None);
    }

    #[test]
    fn test_colliding_path_reports_first_sample() {
        // Blow the cylinder up until it swallows the whole workspace; the
        // very first sample (the start pose) must then be the reported hit.
        let mut config = ArmConfig::measured_arm();
        config.base_zone.radius = 500.0;
        config.base_zone.height = 500.0;
        let kin = ArmKinematics::from_config(config);

        let home = kin.home_pulses();
        let check = kin.check_path_collision(&[1500, 1600, 1500, 1500], &home, DEFAULT_PATH_SAMPLES);
        assert!(check.collision);
        assert_eq!(check.progress, Some(0.0));
        assert!(check.point.is_some());
    }
}
