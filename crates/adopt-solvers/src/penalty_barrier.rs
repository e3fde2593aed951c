//! Penalty-barrier (inequality and mixed constraints)
//!
//! Adds a smooth quadratic penalty `(rho_k/2) max(0, g_k(x))^2` per
//! inequality (zero inside the feasible region, growing as the boundary is
//! approached from outside, exploding for sustained violation) and
//! folds equality violations into the same mechanism via
//! `(rho_j/2) h_j(x)^2`. The penalty is C^1 and defined everywhere, so
//! feasibility is never assumed at the initial guess.
//!
//! Penalties adapt per constraint: only the constraints still violated
//! after an inner solve have their weight grown, so one stubborn constraint
//! cannot force the whole problem onto a needlessly stiff surface.
//!
//! Inequality shadow prices are estimated as `mu_k = rho_k * max(0, g_k(x*))`
//! (nonnegative, nonzero only for active constraints): relaxing an active
//! constraint to `g_k <= eps` improves the optimal objective by about
//! `mu_k * eps`. Equality multipliers come out as `rho_j * h_j(x*)`,
//! matching the augmented-Lagrangian convention.

use crate::bfgs;
use crate::config::SolverConfig;
use adopt_core::constraint::violated_indices;
use adopt_core::{
    Algorithm, Constraint, Error, ObjectiveFunction, OptimizationResult, Result, Vector,
};

/// Outer penalty-growth rounds.
const OUTER_MAX: usize = 30;
/// Initial per-constraint penalty weight.
const RHO_INITIAL: f64 = 10.0;
/// Penalty growth factor per round.
const RHO_GROWTH: f64 = 10.0;
/// Penalty ceiling; reaching it with violations left means infeasible.
const RHO_MAX: f64 = 1e8;

/// `obj` plus the quadratic penalty at fixed per-constraint weights.
struct PenalizedObjective<'a> {
    inner: &'a dyn ObjectiveFunction,
    constraints: &'a [Constraint],
    rho: Vec<f64>,
}

impl ObjectiveFunction for PenalizedObjective<'_> {
    fn eval(&self, x: &Vector) -> adopt_core::Result<f64> {
        let mut value = self.inner.eval(x)?;
        for (constraint, &rho) in self.constraints.iter().zip(self.rho.iter()) {
            let violation = constraint.violation(x);
            value += 0.5 * rho * violation * violation;
        }
        Ok(value)
    }
}

/// Minimize `obj` subject to `g_k(x) <= 0` and `h_j(x) = 0` constraints.
pub fn minimize(
    obj: &dyn ObjectiveFunction,
    x0: &Vector,
    constraints: &[Constraint],
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    config.validate()?;
    let deadline = config.solve_deadline();
    let constraint_tol = config.tolerance * 100.0;

    let mut x = x0.clone();
    let mut rho = vec![RHO_INITIAL; constraints.len()];
    let mut outer = 0;

    loop {
        if outer >= OUTER_MAX || config.interrupted(deadline) {
            break;
        }
        outer += 1;

        let penalized = PenalizedObjective { inner: obj, constraints, rho: rho.clone() };
        // Share one absolute deadline across every inner solve.
        let inner_config = SolverConfig { deadline, time_limit: None, ..config.clone() };
        let inner = bfgs::minimize_lbfgs(&penalized, &x, &inner_config)?;
        x = inner.solution;

        let violations: Vec<f64> = constraints.iter().map(|c| c.violation(&x)).collect();
        let max_violation = violations.iter().copied().fold(0.0_f64, f64::max);

        if max_violation <= constraint_tol {
            let value = obj.eval(&x)?;
            let multipliers = multiplier_estimates(constraints, &x, &rho);
            return Ok(OptimizationResult::new(x, value, outer, true, Algorithm::PenaltyBarrier)
                .with_multipliers(multipliers));
        }

        // Stiffen only the constraints still out of tolerance.
        let mut exhausted = false;
        for (r, &violation) in rho.iter_mut().zip(violations.iter()) {
            if violation > constraint_tol {
                if *r >= RHO_MAX {
                    exhausted = true;
                } else {
                    *r *= RHO_GROWTH;
                }
            }
        }
        log::debug!(
            "penalty-barrier round {outer}: max violation {max_violation:.3e}, \
             max penalty {:.1e}",
            rho.iter().copied().fold(0.0_f64, f64::max)
        );

        if exhausted {
            return Err(Error::InfeasibleProblem {
                reason: format!(
                    "penalty growth exhausted with max violation {max_violation:.3e}"
                ),
                violated_constraints: violated_indices(constraints, &x, constraint_tol),
            });
        }
    }

    // Budget or clock ran out while still pushing toward feasibility.
    let value = obj.eval(&x)?;
    let multipliers = multiplier_estimates(constraints, &x, &rho);
    Ok(OptimizationResult::new(x, value, outer, false, Algorithm::PenaltyBarrier)
        .with_multipliers(multipliers))
}

/// Shadow-price estimates at the returned point.
fn multiplier_estimates(constraints: &[Constraint], x: &Vector, rho: &[f64]) -> Vec<f64> {
    constraints
        .iter()
        .zip(rho.iter())
        .map(|(c, &rho_k)| {
            let value = c.value(x);
            if c.is_inequality() { rho_k * value.max(0.0) } else { rho_k * value }
        })
        .collect()
}
