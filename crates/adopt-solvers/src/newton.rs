//! Newton-Raphson
//!
//! Solves `H d = -g` each iteration for quadratic convergence (1-5
//! iterations) on smooth, well-conditioned, low-dimensional problems.
//!
//! Intentionally unforgiving: a singular or diverging Hessian, a NaN/Inf
//! gradient, a domain-invalid evaluation, or an exhausted iteration cap all
//! abort with [`adopt_core::Error::NumericalInstability`] rather than
//! propagate garbage forward. The adaptive selector is responsible for not
//! routing problems here that cannot satisfy those preconditions (ratio
//! objectives like `a/sqrt(b)` included).

use crate::config::SolverConfig;
use crate::line_search::backtracking_armijo;
use adopt_core::{Algorithm, Error, ObjectiveFunction, OptimizationResult, Result, Vector};
use nalgebra::{DMatrix, DVector};

/// Hessian entries at or above this magnitude are treated as the divergence
/// signature of a non-twice-differentiable objective.
const HESSIAN_DIVERGENCE: f64 = 1e6;

/// Iterates fleeing past this multiple of the starting scale are diverging
/// (the signature of ratio-shaped objectives whose infimum is not
/// attained), not converging.
const ITERATE_GROWTH: f64 = 1e4;

/// Minimize `obj` from `x0` by damped Newton-Raphson.
pub fn minimize(
    obj: &dyn ObjectiveFunction,
    x0: &Vector,
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    config.validate()?;
    let deadline = config.solve_deadline();

    let n = x0.dim();
    let mut x = x0.clone();

    for iter in 0..config.max_iterations {
        if config.interrupted(deadline) {
            return finish(obj, x, iter, false);
        }

        let grad = obj
            .gradient(&x)
            .map_err(|e| wrap_eval(e, iter, &x))?;
        if !grad.is_finite() {
            return Err(Error::instability(
                "non-finite gradient",
                iter,
                Some(x.into_vec()),
            ));
        }

        if grad.norm() < config.tolerance {
            return finish(obj, x, iter, true);
        }

        let hess = obj
            .hessian(&x)
            .map_err(|e| wrap_eval(e, iter, &x))?;
        check_hessian(&hess, iter, &x)?;

        let rhs = DVector::from_iterator(n, grad.iter().map(|g| -g));
        let direction = match hess.lu().solve(&rhs) {
            Some(d) if d.iter().all(|v| v.is_finite()) => {
                Vector::from_vec(d.iter().copied().collect())
            }
            _ => {
                return Err(Error::instability(
                    "singular or ill-conditioned Hessian: linear solve failed",
                    iter,
                    Some(x.into_vec()),
                ));
            }
        };

        let x_next = if config.use_line_search {
            let f0 = obj.eval(&x).map_err(|e| wrap_eval(e, iter, &x))?;
            match backtracking_armijo(obj, &x, &direction, f0, &grad)
                .map_err(|e| wrap_eval(e, iter, &x))?
            {
                Some(step) => step.x_new,
                None => {
                    return Err(Error::instability(
                        "line search found no acceptable damped Newton step",
                        iter,
                        Some(x.into_vec()),
                    ));
                }
            }
        } else {
            &x + &direction
        };

        let step_norm = (&x_next - &x).norm();
        x = x_next;

        if x.norm() > (1.0 + x0.norm()) * ITERATE_GROWTH {
            return Err(Error::instability(
                "iterates diverged far beyond the starting scale",
                iter + 1,
                Some(x.into_vec()),
            ));
        }

        if step_norm < config.tolerance {
            return finish(obj, x, iter + 1, true);
        }
    }

    // For Newton the cap is a failure mode, not a soft budget: quadratic
    // convergence either happened in a handful of iterations or the problem
    // violated a precondition.
    Err(Error::instability(
        format!("iteration cap {} exceeded without convergence", config.max_iterations),
        config.max_iterations,
        Some(x.into_vec()),
    ))
}

fn finish(
    obj: &dyn ObjectiveFunction,
    x: Vector,
    iterations: usize,
    converged: bool,
) -> Result<OptimizationResult> {
    let value = obj.eval(&x).map_err(|e| wrap_eval(e, iterations, &x))?;
    if !value.is_finite() {
        return Err(Error::instability(
            "objective is non-finite at the final iterate",
            iterations,
            Some(x.into_vec()),
        ));
    }
    Ok(OptimizationResult::new(x, value, iterations, converged, Algorithm::NewtonRaphson))
}

fn check_hessian(hess: &DMatrix<f64>, iter: usize, x: &Vector) -> Result<()> {
    for &entry in hess.iter() {
        if !entry.is_finite() {
            return Err(Error::instability(
                "non-finite Hessian entry (objective not twice-differentiable here)",
                iter,
                Some(x.as_slice().to_vec()),
            ));
        }
        if entry.abs() >= HESSIAN_DIVERGENCE {
            return Err(Error::instability(
                format!("Hessian entry magnitude {:.3e} signals divergence", entry.abs()),
                iter,
                Some(x.as_slice().to_vec()),
            ));
        }
    }
    Ok(())
}

/// Evaluation failures inside Newton are numerical-instability aborts.
fn wrap_eval(err: Error, iterations: usize, x: &Vector) -> Error {
    match err {
        Error::Evaluation(msg) => Error::instability(
            format!("domain-invalid evaluation: {msg}"),
            iterations,
            Some(x.as_slice().to_vec()),
        ),
        other => other,
    }
}
