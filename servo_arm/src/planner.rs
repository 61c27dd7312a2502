// Safety-gated motion planner.
//
// Every accepted move is two-phase: current pose → HOME, then HOME → target.
// Routing through the vertical home pose bounds the Cartesian sweep of any
// commanded move; a direct pulse-space interpolation between two arbitrary
// poses is not a Cartesian straight line and could sweep through the base
// cylinder between clean endpoints.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ik::{IkParams, IkResult};
use crate::kinematics::ArmKinematics;
use crate::safety::{PathCheck, DEFAULT_PATH_SAMPLES};
use crate::{PulseVector, TipPosition};

/// Result of one planning request. Callers must check `approved` before
/// forwarding any pulses to the transport; the diagnostics fields carry
/// whatever was computed before the first failed gate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SafeMovePlan {
    pub approved: bool,
    /// Human-readable rejection reason, `None` when approved.
    pub reason: Option<String>,
    /// The two waypoints to execute in order: always `[HOME, target]`.
    pub path: Option<[PulseVector; 2]>,
    /// Collision report for the current→home phase.
    pub to_home: Option<PathCheck>,
    /// Collision report for the home→target phase.
    pub to_target: Option<PathCheck>,
    /// Solver diagnostics; `None` proves IK was never attempted.
    pub ik: Option<IkResult>,
}

impl SafeMovePlan {
    fn rejected(
        reason: String,
        to_home: Option<PathCheck>,
        to_target: Option<PathCheck>,
        ik: Option<IkResult>,
    ) -> Self {
        Self {
            approved: false,
            reason: Some(reason),
            path: None,
            to_home,
            to_target,
            ik,
        }
    }
}

impl ArmKinematics {
    /// Plans a collision-checked move to `target`, validating each gate in
    /// order and short-circuiting at the first failure:
    ///
    /// 1. the raw target must be outside the base cylinder (no IK otherwise),
    /// 2. the path from `current` to HOME must sample clear,
    /// 3. IK, seeded from HOME so the solve is independent of the current
    ///    pose, must converge,
    /// 4. the path from HOME to the solved pulses must sample clear.
    pub fn safe_move_to_target(&self, target: TipPosition, current: &PulseVector) -> SafeMovePlan {
        let zone = &self.config().base_zone;
        if zone.contains(target.x, target.y, target.z) {
            warn!(
                x = target.x,
                y = target.y,
                z = target.z,
                "move rejected: target inside base cylinder"
            );
            return SafeMovePlan::rejected(
                format!(
                    "target ({:.1}, {:.1}, {:.1}) collides with base",
                    target.x, target.y, target.z
                ),
                None,
                None,
                None,
            );
        }

        let home = self.home_pulses();

        let to_home = self.check_path_collision(current, &home, DEFAULT_PATH_SAMPLES);
        if to_home.collision {
            let progress = to_home.progress.unwrap_or(0.0);
            warn!(progress, "move rejected: path to home collides");
            return SafeMovePlan::rejected(
                format!("path to home collides at progress {:.2}", progress),
                Some(to_home),
                None,
                None,
            );
        }

        let ik = self.solve_ik(target, Some(home), &IkParams::default());
        if !ik.converged {
            warn!(
                error_mm = ik.error_mm,
                iterations = ik.iterations,
                "move rejected: IK did not converge"
            );
            return SafeMovePlan::rejected(
                format!(
                    "IK failed: error = {:.2}mm after {} iterations",
                    ik.error_mm, ik.iterations
                ),
                Some(to_home),
                None,
                Some(ik),
            );
        }

        let to_target = self.check_path_collision(&home, &ik.pulses, DEFAULT_PATH_SAMPLES);
        if to_target.collision {
            let progress = to_target.progress.unwrap_or(0.0);
            warn!(progress, "move rejected: path from home to target collides");
            return SafeMovePlan::rejected(
                format!("path from home to target collides at progress {:.2}", progress),
                Some(to_home),
                Some(to_target),
                Some(ik),
            );
        }

        debug!(
            error_mm = ik.error_mm,
            iterations = ik.iterations,
            "move approved"
        );
        SafeMovePlan {
            approved: true,
            reason: None,
            path: Some([home, ik.pulses]),
            to_home: Some(to_home),
            to_target: Some(to_target),
            ik: Some(ik),
        }
    }
}
