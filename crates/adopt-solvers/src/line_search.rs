//! Line searches
//!
//! Two flavors: a backtracking Armijo search (cheap, used to damp Newton
//! steps and inside the penalty solvers) and a strong-Wolfe bracket/zoom
//! search (used by BFGS and L-BFGS, where the curvature condition keeps the
//! secant update well-posed).

use adopt_core::{ObjectiveFunction, Result, Vector};

/// Armijo sufficient-decrease coefficient.
const C1: f64 = 1e-4;
/// Wolfe curvature coefficient.
const C2: f64 = 0.9;

/// Accepted step from a line search.
#[derive(Debug, Clone)]
pub struct LineSearchStep {
    /// Step length along the direction.
    pub alpha: f64,
    /// New point `x + alpha * d`.
    pub x_new: Vector,
    /// Objective value at `x_new`.
    pub value: f64,
    /// Objective evaluations consumed.
    pub evals: usize,
}

/// Backtracking line search with the Armijo condition.
///
/// Halves the step from 1.0 until `f(x + a d) <= f(x) + c1 a g.d`. Returns
/// `Ok(None)` when no acceptable step exists within the backtrack budget
/// (typically a non-descent direction or a numerically flat region).
pub fn backtracking_armijo(
    obj: &dyn ObjectiveFunction,
    x: &Vector,
    direction: &Vector,
    f0: f64,
    grad: &Vector,
) -> Result<Option<LineSearchStep>> {
    let dir_deriv = grad.dot(direction);
    let mut alpha = 1.0;
    let mut evals = 0;

    for _ in 0..40 {
        let x_new = x + &(direction * alpha);
        let value = obj.eval(&x_new)?;
        evals += 1;

        if value.is_finite() && value <= f0 + C1 * alpha * dir_deriv {
            return Ok(Some(LineSearchStep { alpha, x_new, value, evals }));
        }
        alpha *= 0.5;
    }

    Ok(None)
}

/// Strong-Wolfe line search (bracket then zoom, Nocedal & Wright Alg. 3.5/3.6
/// with bisection refinement).
///
/// Returns `Ok(None)` when no step satisfying both conditions is found.
pub fn strong_wolfe(
    obj: &dyn ObjectiveFunction,
    x: &Vector,
    direction: &Vector,
    f0: f64,
    grad: &Vector,
) -> Result<Option<LineSearchStep>> {
    let g0_dot_d = grad.dot(direction);
    if g0_dot_d >= 0.0 {
        // Not a descent direction; nothing to search.
        return Ok(None);
    }

    let mut alpha_prev = 0.0;
    let mut f_prev = f0;
    let mut alpha = 1.0;
    let mut evals = 0;

    for i in 0..20 {
        let x_new = x + &(direction * alpha);
        let f_new = obj.eval(&x_new)?;
        evals += 1;

        if !f_new.is_finite() || f_new > f0 + C1 * alpha * g0_dot_d || (i > 0 && f_new >= f_prev) {
            return zoom(obj, x, direction, f0, g0_dot_d, alpha_prev, f_prev, alpha, evals);
        }

        let g_dot_d = obj.gradient(&x_new)?.dot(direction);
        if g_dot_d.abs() <= C2 * g0_dot_d.abs() {
            return Ok(Some(LineSearchStep { alpha, x_new, value: f_new, evals }));
        }
        if g_dot_d >= 0.0 {
            return zoom(obj, x, direction, f0, g0_dot_d, alpha, f_new, alpha_prev, evals);
        }

        alpha_prev = alpha;
        f_prev = f_new;
        alpha *= 2.0;
    }

    Ok(None)
}

/// Refine a bracketing interval `[alpha_lo, alpha_hi]` by bisection until a
/// strong-Wolfe point is found. `alpha_lo` always carries the lowest
/// objective value seen so far.
#[allow(clippy::too_many_arguments)]
fn zoom(
    obj: &dyn ObjectiveFunction,
    x: &Vector,
    direction: &Vector,
    f0: f64,
    g0_dot_d: f64,
    mut alpha_lo: f64,
    mut f_lo: f64,
    mut alpha_hi: f64,
    mut evals: usize,
) -> Result<Option<LineSearchStep>> {
    for _ in 0..30 {
        let alpha = 0.5 * (alpha_lo + alpha_hi);
        if (alpha_hi - alpha_lo).abs() < 1e-12 {
            break;
        }

        let x_new = x + &(direction * alpha);
        let f_new = obj.eval(&x_new)?;
        evals += 1;

        if !f_new.is_finite() || f_new > f0 + C1 * alpha * g0_dot_d || f_new >= f_lo {
            alpha_hi = alpha;
            continue;
        }

        let g_dot_d = obj.gradient(&x_new)?.dot(direction);
        if g_dot_d.abs() <= C2 * g0_dot_d.abs() {
            return Ok(Some(LineSearchStep { alpha, x_new, value: f_new, evals }));
        }
        if g_dot_d * (alpha_hi - alpha_lo) >= 0.0 {
            alpha_hi = alpha_lo;
        }
        alpha_lo = alpha;
        f_lo = f_new;
    }

    // Fall back to the best Armijo point seen, if any.
    if alpha_lo > 0.0 && f_lo < f0 {
        let x_new = x + &(direction * alpha_lo);
        return Ok(Some(LineSearchStep { alpha: alpha_lo, x_new, value: f_lo, evals }));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_armijo_accepts_unit_step_on_easy_quadratic() {
        let f = |x: &Vector| x[0] * x[0];
        let x = Vector::from_slice(&[1.0]);
        let grad = Vector::from_slice(&[2.0]);
        // Newton direction for x^2 is exactly -x.
        let d = Vector::from_slice(&[-1.0]);

        let step = backtracking_armijo(&f, &x, &d, 1.0, &grad).unwrap().unwrap();
        assert_relative_eq!(step.alpha, 1.0);
        assert_relative_eq!(step.value, 0.0);
    }

    #[test]
    fn test_armijo_rejects_ascent_direction() {
        let f = |x: &Vector| x[0] * x[0];
        let x = Vector::from_slice(&[1.0]);
        let grad = Vector::from_slice(&[2.0]);
        let d = Vector::from_slice(&[1.0]);

        assert!(backtracking_armijo(&f, &x, &d, 1.0, &grad).unwrap().is_none());
    }

    #[test]
    fn test_wolfe_satisfies_both_conditions() {
        let f = |x: &Vector| (x[0] - 3.0).powi(2);
        let x = Vector::from_slice(&[0.0]);
        let f0 = 9.0;
        let grad = Vector::from_slice(&[-6.0]);
        let d = Vector::from_slice(&[1.0]);

        let step = strong_wolfe(&f, &x, &d, f0, &grad).unwrap().unwrap();
        // Sufficient decrease.
        assert!(step.value <= f0 + C1 * step.alpha * grad.dot(&d));
        // Curvature: |f'(x + a)| = |2(a - 3)| <= c2 * 6
        assert!((2.0 * (step.alpha - 3.0)).abs() <= C2 * 6.0);
    }

    #[test]
    fn test_wolfe_shrinks_past_barrier() {
        // Blows up past x = 1; the search must settle inside the domain.
        let f = |x: &Vector| {
            if x[0] >= 1.0 { f64::INFINITY } else { x[0] * x[0] - (1.0 - x[0]).ln() }
        };
        let x = Vector::from_slice(&[0.0]);
        let f0 = 0.0;
        let grad = Vector::from_slice(&[1.0]);
        let d = Vector::from_slice(&[-2.0]);

        let step = strong_wolfe(&f, &x, &d, f0, &grad).unwrap();
        if let Some(step) = step {
            assert!(step.x_new[0] < 1.0);
            assert!(step.value.is_finite());
        }
    }
}
