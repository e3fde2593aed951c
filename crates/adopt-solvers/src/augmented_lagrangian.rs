//! Augmented Lagrangian (equality constraints)
//!
//! Minimizes `f(x) + sum_j lambda_j h_j(x) + (rho/2) sum_j h_j(x)^2`,
//! alternating an unconstrained inner solve with multiplier updates
//! `lambda_j <- lambda_j + rho h_j(x)` and penalty growth when violations
//! stall. Converged multipliers are the shadow prices: tightening
//! constraint j's target by `eps` (requiring `h_j(x) = -eps`) moves the
//! optimal objective by about `lambda_j * eps`.
//!
//! Transient infeasibility is absorbed by construction; the solver raises
//! [`adopt_core::Error::InfeasibleProblem`] only once penalty growth is
//! exhausted with violations still above tolerance. Constraints are never
//! enforced by projecting an unconstrained result; that would change the
//! optimum and break the shadow-price interpretation.

use crate::bfgs;
use crate::config::SolverConfig;
use adopt_core::constraint::violated_indices;
use adopt_core::{
    Algorithm, Constraint, Error, ObjectiveFunction, OptimizationResult, Result, Vector,
};

/// Outer multiplier-update iterations.
const OUTER_MAX: usize = 50;
/// Penalty growth factor.
const RHO_GROWTH: f64 = 10.0;
/// Penalty ceiling; reaching it with violations left means infeasible.
const RHO_MAX: f64 = 1e8;
/// Violations must shrink by this factor per round to avoid penalty growth.
const SUFFICIENT_DECREASE: f64 = 0.25;

/// The augmented Lagrangian of `obj` for fixed multipliers and penalty.
struct AugmentedObjective<'a> {
    inner: &'a dyn ObjectiveFunction,
    constraints: &'a [Constraint],
    lambda: Vec<f64>,
    rho: f64,
}

impl ObjectiveFunction for AugmentedObjective<'_> {
    fn eval(&self, x: &Vector) -> adopt_core::Result<f64> {
        let mut value = self.inner.eval(x)?;
        for (constraint, &lambda) in self.constraints.iter().zip(self.lambda.iter()) {
            let h = constraint.value(x);
            value += lambda * h + 0.5 * self.rho * h * h;
        }
        Ok(value)
    }
}

/// Minimize `obj` subject to equality constraints `h_j(x) = 0`.
pub fn minimize(
    obj: &dyn ObjectiveFunction,
    x0: &Vector,
    constraints: &[Constraint],
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    config.validate()?;
    if constraints.iter().any(Constraint::is_inequality) {
        return Err(Error::InvalidConfiguration(
            "augmented Lagrangian handles equality constraints only; \
             route inequality problems to the penalty-barrier solver"
                .into(),
        ));
    }
    let deadline = config.solve_deadline();
    let constraint_tol = config.tolerance * 100.0;

    let mut x = x0.clone();
    let mut lambda = vec![0.0; constraints.len()];
    let mut rho = 10.0;
    let mut prev_violation = f64::INFINITY;
    let mut outer = 0;

    for round in 0..OUTER_MAX {
        if config.interrupted(deadline) {
            break;
        }
        outer = round + 1;

        let aug = AugmentedObjective { inner: obj, constraints, lambda: lambda.clone(), rho };
        // Share one absolute deadline across every inner solve.
        let inner_config = SolverConfig { deadline, time_limit: None, ..config.clone() };
        let inner = bfgs::minimize_lbfgs(&aug, &x, &inner_config)?;
        x = inner.solution;

        let h: Vec<f64> = constraints.iter().map(|c| c.value(&x)).collect();
        let max_violation = h.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

        // Multiplier estimates move toward the true shadow prices.
        for (l, &hj) in lambda.iter_mut().zip(h.iter()) {
            *l += rho * hj;
        }

        if max_violation <= constraint_tol {
            let value = obj.eval(&x)?;
            return Ok(OptimizationResult::new(
                x,
                value,
                outer,
                true,
                Algorithm::AugmentedLagrangian,
            )
            .with_multipliers(lambda));
        }

        if max_violation > SUFFICIENT_DECREASE * prev_violation {
            if rho >= RHO_MAX {
                return Err(Error::InfeasibleProblem {
                    reason: format!(
                        "penalty growth exhausted at rho = {rho:.1e} with max violation \
                         {max_violation:.3e}"
                    ),
                    violated_constraints: violated_indices(constraints, &x, constraint_tol),
                });
            }
            rho *= RHO_GROWTH;
            log::debug!(
                "augmented Lagrangian round {round}: violation {max_violation:.3e} stalled, \
                 penalty now {rho:.1e}"
            );
        }
        prev_violation = max_violation;
    }

    // Outer budget exhausted without infeasibility evidence: non-fatal.
    let value = obj.eval(&x)?;
    Ok(OptimizationResult::new(x, value, outer, false, Algorithm::AugmentedLagrangian)
        .with_multipliers(lambda))
}
