//! BFGS and L-BFGS
//!
//! Quasi-Newton methods maintaining a positive-definite approximate inverse
//! Hessian from successive gradient differences: no evaluations beyond the
//! gradient, roughly Newton's speed at a fraction of the cost. The dense
//! variant stores the full n x n approximation; L-BFGS keeps only the last
//! k correction pairs, which is what makes it usable above 100 variables.
//!
//! Updates are skipped unless the curvature condition `s.y > 0` holds, so
//! the approximation stays positive definite; a non-descent direction
//! resets to steepest descent.

use crate::config::SolverConfig;
use crate::line_search::strong_wolfe;
use adopt_core::{Algorithm, Error, ObjectiveFunction, OptimizationResult, Result, Vector};
use nalgebra::{DMatrix, DVector};
use std::collections::VecDeque;

/// Curvature threshold below which a correction pair is discarded.
const CURVATURE_MIN: f64 = 1e-10;

/// Minimize `obj` from `x0` with dense BFGS.
pub fn minimize(
    obj: &dyn ObjectiveFunction,
    x0: &Vector,
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    config.validate()?;
    let deadline = config.solve_deadline();

    let n = x0.dim();
    let mut x = x0.clone();
    let mut f_val = obj.eval(&x)?;
    let mut grad = obj.gradient(&x)?;
    let mut h_inv: DMatrix<f64> = DMatrix::identity(n, n);

    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..config.max_iterations {
        if config.interrupted(deadline) {
            break;
        }

        guard_finite(f_val, &grad, iter, &x)?;
        if grad.norm() < config.tolerance {
            converged = true;
            break;
        }
        iterations = iter + 1;

        let g = DVector::from_column_slice(grad.as_slice());
        let mut d_vec = -(&h_inv * &g);
        // Reset a corrupted approximation rather than follow an ascent
        // direction.
        if d_vec.dot(&g) >= 0.0 {
            h_inv = DMatrix::identity(n, n);
            d_vec = -g.clone();
        }
        let direction = Vector::from_vec(d_vec.iter().copied().collect());

        let Some(step) = strong_wolfe(obj, &x, &direction, f_val, &grad)? else {
            // Numerically flat: report best-so-far rather than invent a step.
            break;
        };

        let grad_new = obj.gradient(&step.x_new)?;
        let s = &step.x_new - &x;
        let y = &grad_new - &grad;
        let sy = s.dot(&y);

        if sy > CURVATURE_MIN {
            let rho = 1.0 / sy;
            let s_v = DVector::from_column_slice(s.as_slice());
            let y_v = DVector::from_column_slice(y.as_slice());
            // H <- (I - rho s y^T) H (I - rho y s^T) + rho s s^T
            let identity = DMatrix::<f64>::identity(n, n);
            let left = &identity - &s_v * y_v.transpose() * rho;
            let right = &identity - &y_v * s_v.transpose() * rho;
            h_inv = &left * h_inv * &right + &s_v * s_v.transpose() * rho;
        }

        let step_norm = s.norm();
        x = step.x_new;
        f_val = step.value;
        grad = grad_new;

        if step_norm < config.tolerance {
            converged = true;
            break;
        }
    }

    Ok(OptimizationResult::new(x, f_val, iterations, converged, Algorithm::Bfgs))
}

/// Correction-pair history for L-BFGS, bounded to the `m` most recent pairs.
struct History {
    pairs: VecDeque<(Vector, Vector, f64)>,
    memory: usize,
}

impl History {
    fn new(memory: usize) -> Self {
        Self { pairs: VecDeque::with_capacity(memory), memory }
    }

    fn push(&mut self, s: Vector, y: Vector, rho: f64) {
        if self.pairs.len() == self.memory {
            self.pairs.pop_front();
        }
        self.pairs.push_back((s, y, rho));
    }

    /// Two-loop recursion: d = -H_k g_k without materializing H_k.
    fn direction(&self, grad: &Vector) -> Vector {
        let k = self.pairs.len();
        if k == 0 {
            return -grad;
        }

        let mut q = grad.clone();
        let mut alpha = vec![0.0; k];

        for (i, (s, y, rho)) in self.pairs.iter().enumerate().rev() {
            alpha[i] = rho * s.dot(&q);
            q = &q - &(y * alpha[i]);
        }

        // Scale by gamma = s.y / y.y from the newest pair.
        let (s_last, y_last, _) = &self.pairs[k - 1];
        let yy = y_last.dot(y_last);
        let gamma = if yy > 1e-30 { s_last.dot(y_last) / yy } else { 1.0 };
        let mut r = &q * gamma;

        for (i, (s, y, rho)) in self.pairs.iter().enumerate() {
            let beta = rho * y.dot(&r);
            r = &r + &(s * (alpha[i] - beta));
        }

        -r
    }
}

/// Minimize `obj` from `x0` with limited-memory BFGS
/// (`config.lbfgs_memory` correction pairs).
pub fn minimize_lbfgs(
    obj: &dyn ObjectiveFunction,
    x0: &Vector,
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    config.validate()?;
    let deadline = config.solve_deadline();

    let mut x = x0.clone();
    let mut f_val = obj.eval(&x)?;
    let mut grad = obj.gradient(&x)?;
    let mut history = History::new(config.lbfgs_memory);

    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..config.max_iterations {
        if config.interrupted(deadline) {
            break;
        }

        guard_finite(f_val, &grad, iter, &x)?;
        if grad.norm() < config.tolerance {
            converged = true;
            break;
        }
        iterations = iter + 1;

        let mut direction = history.direction(&grad);
        if direction.dot(&grad) >= 0.0 {
            direction = -&grad;
        }

        let Some(step) = strong_wolfe(obj, &x, &direction, f_val, &grad)? else {
            break;
        };

        let grad_new = obj.gradient(&step.x_new)?;
        let s = &step.x_new - &x;
        let y = &grad_new - &grad;
        let sy = s.dot(&y);
        if sy > CURVATURE_MIN {
            history.push(s.clone(), y, 1.0 / sy);
        }

        let step_norm = s.norm();
        x = step.x_new;
        f_val = step.value;
        grad = grad_new;

        if step_norm < config.tolerance {
            converged = true;
            break;
        }
    }

    Ok(OptimizationResult::new(x, f_val, iterations, converged, Algorithm::Lbfgs))
}

/// NaN/Inf in the value or gradient would corrupt the inverse-Hessian
/// approximation; bail out before it can.
fn guard_finite(f_val: f64, grad: &Vector, iter: usize, x: &Vector) -> Result<()> {
    if !f_val.is_finite() || !grad.is_finite() {
        return Err(Error::instability(
            "non-finite objective or gradient",
            iter,
            Some(x.as_slice().to_vec()),
        ));
    }
    Ok(())
}
