//! Adaptive-step finite-difference differentiation
//!
//! Central differences with a per-coordinate step scaled by
//! `max(|x_i|, 1)`, adapting automatically to scalar precision. First
//! differences use `sqrt(machine_epsilon)` (~1e-8 for f64); second
//! differences use the fourth root (~1e-4), below which the `h^2` in the
//! denominator would amplify rounding noise past the curvature being
//! measured. A gradient costs `2n` evaluations; a Hessian costs `O(n^2)`,
//! the reason Newton-family methods become impractical above roughly 10
//! dimensions.
//!
//! This layer does NOT guard against non-smooth objectives: at a kink or
//! near-zero divisor, Hessian entries may come back huge (magnitude >= 1e6)
//! or non-finite. Callers own that check.

use crate::traits::ObjectiveFunction;
use crate::vector::Vector;
use crate::{Error, Result};
use nalgebra::DMatrix;

/// Per-coordinate step for first differences.
#[inline]
fn gradient_step(xi: f64) -> f64 {
    f64::EPSILON.sqrt() * xi.abs().max(1.0)
}

/// Per-coordinate step for second differences.
#[inline]
fn hessian_step(xi: f64) -> f64 {
    f64::EPSILON.powf(0.25) * xi.abs().max(1.0)
}

/// Central-difference gradient of `f` at `x`. Costs `2n` evaluations.
pub fn gradient<F: ObjectiveFunction + ?Sized>(f: &F, x: &Vector) -> Result<Vector> {
    let n = x.dim();
    if n == 0 {
        return Err(Error::InvalidConfiguration("cannot differentiate a 0-dimensional point".into()));
    }

    let mut grad = Vector::zeros(n);
    for i in 0..n {
        let h = gradient_step(x[i]);

        let mut x_plus = x.clone();
        x_plus[i] += h;
        let f_plus = f.eval(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[i] -= h;
        let f_minus = f.eval(&x_minus)?;

        grad[i] = (f_plus - f_minus) / (2.0 * h);
    }

    Ok(grad)
}

/// Central-difference Hessian of `f` at `x`. Costs `O(n^2)` evaluations.
///
/// The four-point off-diagonal formula fills the matrix symmetrically, so
/// the result is exactly symmetric even when `f` is only approximately so
/// under floating-point error.
pub fn hessian<F: ObjectiveFunction + ?Sized>(f: &F, x: &Vector) -> Result<DMatrix<f64>> {
    let n = x.dim();
    if n == 0 {
        return Err(Error::InvalidConfiguration("cannot differentiate a 0-dimensional point".into()));
    }

    let f0 = f.eval(x)?;
    let mut h_mat = DMatrix::zeros(n, n);

    for i in 0..n {
        let hi = hessian_step(x[i]);

        // Diagonal: (f(x + h e_i) - 2 f(x) + f(x - h e_i)) / h^2
        let mut x_p = x.clone();
        x_p[i] += hi;
        let f_p = f.eval(&x_p)?;

        let mut x_m = x.clone();
        x_m[i] -= hi;
        let f_m = f.eval(&x_m)?;

        h_mat[(i, i)] = (f_p - 2.0 * f0 + f_m) / (hi * hi);

        // Off-diagonal: four-point central formula, mirrored.
        for j in (i + 1)..n {
            let hj = hessian_step(x[j]);

            let mut x_pp = x.clone();
            x_pp[i] += hi;
            x_pp[j] += hj;
            let f_pp = f.eval(&x_pp)?;

            let mut x_pm = x.clone();
            x_pm[i] += hi;
            x_pm[j] -= hj;
            let f_pm = f.eval(&x_pm)?;

            let mut x_mp = x.clone();
            x_mp[i] -= hi;
            x_mp[j] += hj;
            let f_mp = f.eval(&x_mp)?;

            let mut x_mm = x.clone();
            x_mm[i] -= hi;
            x_mm[j] -= hj;
            let f_mm = f.eval(&x_mm)?;

            let value = (f_pp - f_pm - f_mp + f_mm) / (4.0 * hi * hj);
            h_mat[(i, j)] = value;
            h_mat[(j, i)] = value;
        }
    }

    Ok(h_mat)
}
