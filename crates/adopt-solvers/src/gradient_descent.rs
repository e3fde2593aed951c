//! Gradient descent
//!
//! First-order descent with optional momentum and Nesterov look-ahead. Slow
//! (hundreds to thousands of iterations) but it never raises a numerical
//! failure on its own, which makes it the universal fallback: if the
//! gradient turns non-finite the solver stops at the last finite iterate
//! with `converged: false` instead of propagating garbage.

use crate::config::SolverConfig;
use adopt_core::{Algorithm, ObjectiveFunction, OptimizationResult, Result, Vector};

/// Minimize `obj` from `x0` by gradient descent.
pub fn minimize(
    obj: &dyn ObjectiveFunction,
    x0: &Vector,
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    config.validate()?;
    let deadline = config.solve_deadline();

    let n = x0.dim();
    let lr = config.learning_rate;
    let beta = config.momentum;

    let mut x = x0.clone();
    let mut last_good = x.clone();
    let mut velocity = Vector::zeros(n);
    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..config.max_iterations {
        if config.interrupted(deadline) {
            break;
        }
        iterations = iter + 1;

        // Nesterov evaluates the gradient at the look-ahead point x + beta*v
        // before the update; plain momentum and vanilla descent use x itself.
        let grad_point =
            if config.use_nesterov { &x + &(&velocity * beta) } else { x.clone() };
        let grad = obj.gradient(&grad_point)?;

        if !grad.is_finite() {
            // Walked into a non-finite region: back off to the last iterate
            // with a finite gradient and stop.
            x = last_good.clone();
            iterations = iter;
            break;
        }

        if grad.norm() < config.tolerance {
            converged = true;
            break;
        }

        let step = if beta > 0.0 {
            velocity = &(&velocity * beta) - &(&grad * lr);
            velocity.clone()
        } else {
            -&(&grad * lr)
        };

        last_good = x.clone();
        x = &x + &step;

        if step.norm() < config.tolerance {
            converged = true;
            break;
        }
    }

    let mut objective_value = obj.eval(&x)?;
    if !objective_value.is_finite() {
        x = last_good;
        objective_value = obj.eval(&x)?;
        converged = false;
    }
    Ok(OptimizationResult::new(x, objective_value, iterations, converged, Algorithm::GradientDescent))
}
