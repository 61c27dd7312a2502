// Numerical inverse kinematics.
//
// Damped Gauss-Newton in pulse space: estimate a 3×N Jacobian by finite
// differences, invert it with an SVD pseudo-inverse, and step toward the
// target until the tip error drops under tolerance or the iteration budget
// runs out. Unreachable targets are a reported value, never a panic.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::kinematics::ArmKinematics;
use crate::{PulseVector, TipPosition, JOINT_COUNT, PULSE_MAX, PULSE_MIN, PULSE_NEUTRAL};

/// Solver constants. All four are deliberately plain knobs, with no adaptive
/// step size or line search, so a solve is reproducible from its inputs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct IkParams {
    /// Iteration budget; also the deterministic worst-case cost of a solve.
    pub max_iterations: usize,
    /// Convergence threshold on the tip error, in mm.
    pub tolerance_mm: f64,
    /// Fraction of the Gauss-Newton step applied per iteration.
    pub learning_rate: f64,
    /// Finite-difference perturbation per joint, in µs.
    pub epsilon_us: f64,
}

impl Default for IkParams {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance_mm: 1.0,
            learning_rate: 0.5,
            epsilon_us: 1.0,
        }
    }
}

/// Outcome of one IK solve.
///
/// When `converged` is false the pulses are the best effort reached at the
/// iteration limit (possibly pinned at a clamp boundary). They are returned
/// for inspection only and must never be forwarded to hardware as a success.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IkResult {
    pub pulses: PulseVector,
    pub converged: bool,
    pub error_mm: f64,
    pub iterations: usize,
}

impl ArmKinematics {
    /// Solves for the pulses that put the tool tip at `target`.
    ///
    /// Starts from `initial` (all-neutral 1500µs when `None`). Identical
    /// inputs always produce identical results; different starting guesses
    /// may settle into different local optima, which is expected for a
    /// numerical solver on a redundant-for-position arm.
    pub fn solve_ik(
        &self,
        target: TipPosition,
        initial: Option<PulseVector>,
        params: &IkParams,
    ) -> IkResult {
        let mut pulses: [f64; JOINT_COUNT] = match initial {
            Some(p) => p.map(f64::from),
            None => [f64::from(PULSE_NEUTRAL); JOINT_COUNT],
        };

        for iteration in 0..params.max_iterations {
            let current = self.forward_kinematics_f64(&pulses).tip;
            let error_vec = DVector::from_column_slice(&[
                target.x - current.x,
                target.y - current.y,
                target.z - current.z,
            ]);
            let error_mm = error_vec.norm();
            if error_mm < params.tolerance_mm {
                debug!(iterations = iteration, error_mm, "IK converged");
                return IkResult {
                    pulses: round_pulses(&pulses),
                    converged: true,
                    error_mm,
                    iterations: iteration,
                };
            }

            // Finite-difference Jacobian: column i is how the tip moves per
            // µs of joint i, with the other joints held at the base state.
            let mut jacobian = DMatrix::<f64>::zeros(3, JOINT_COUNT);
            for joint in 0..JOINT_COUNT {
                let mut perturbed = pulses;
                perturbed[joint] += params.epsilon_us;
                let tip = self.forward_kinematics_f64(&perturbed).tip;
                jacobian[(0, joint)] = (tip.x - current.x) / params.epsilon_us;
                jacobian[(1, joint)] = (tip.y - current.y) / params.epsilon_us;
                jacobian[(2, joint)] = (tip.z - current.z) / params.epsilon_us;
            }

            // Moore-Penrose pseudo-inverse via SVD. The only failure mode is
            // SVD non-convergence; give up on the step and report best effort.
            let delta = match jacobian.pseudo_inverse(1e-10) {
                Ok(pinv) => pinv * &error_vec,
                Err(_) => break,
            };

            for joint in 0..JOINT_COUNT {
                // Clamp immediately, not reject: the solver may stall at a
                // boundary without converging, which the caller sees as a
                // non-converged result.
                pulses[joint] = (pulses[joint] + params.learning_rate * delta[joint])
                    .clamp(f64::from(PULSE_MIN), f64::from(PULSE_MAX));
            }
        }

        let final_tip = self.forward_kinematics_f64(&pulses).tip;
        let error_mm = target.distance_to(&final_tip);
        debug!(
            error_mm,
            iterations = params.max_iterations,
            "IK exhausted its iteration budget"
        );
        IkResult {
            pulses: round_pulses(&pulses),
            converged: false,
            error_mm,
            iterations: params.max_iterations,
        }
    }
}

fn round_pulses(pulses: &[f64; JOINT_COUNT]) -> PulseVector {
    let mut rounded = [0u16; JOINT_COUNT];
    for (dst, src) in rounded.iter_mut().zip(pulses) {
        *dst = src
            .round()
            .clamp(f64::from(PULSE_MIN), f64::from(PULSE_MAX)) as u16;
    }
    rounded
}
