//! Objective-function abstraction
//!
//! An objective is a pure `Vector -> scalar` mapping, assumed side-effect
//! free and safely re-callable, including concurrently (hence the
//! `Send + Sync` bound, a caller contract the engine relies on for swarm
//! evaluation and multi-start fan-out).

use crate::diff;
use crate::vector::Vector;
use crate::Result;
use nalgebra::DMatrix;

/// Scalar objective over a real vector space.
///
/// `gradient` and `hessian` default to the numerical differentiation layer
/// ([`crate::diff`]); implementors with analytic derivatives override them.
pub trait ObjectiveFunction: Send + Sync {
    /// Evaluate the objective at `x`.
    fn eval(&self, x: &Vector) -> Result<f64>;

    /// Gradient at `x`. Numeric central differences unless overridden.
    fn gradient(&self, x: &Vector) -> Result<Vector> {
        diff::gradient(self, x)
    }

    /// Hessian at `x`. Numeric central differences unless overridden.
    ///
    /// For objectives that are not twice-differentiable at `x`, entries may
    /// be huge or non-finite; callers must guard (see [`crate::diff`]).
    fn hessian(&self, x: &Vector) -> Result<DMatrix<f64>> {
        diff::hessian(self, x)
    }
}

/// Plain closures are objectives with numeric derivatives.
impl<F> ObjectiveFunction for F
where
    F: Fn(&Vector) -> f64 + Send + Sync,
{
    fn eval(&self, x: &Vector) -> Result<f64> {
        Ok(self(x))
    }
}

/// A closure objective paired with a caller-supplied analytic gradient.
///
/// Saves the `2n` evaluations per gradient that the numeric default costs.
pub struct WithGradient<F, G> {
    objective: F,
    gradient: G,
}

impl<F, G> WithGradient<F, G>
where
    F: Fn(&Vector) -> f64 + Send + Sync,
    G: Fn(&Vector) -> Vector + Send + Sync,
{
    /// Pair `objective` with its analytic `gradient`.
    pub fn new(objective: F, gradient: G) -> Self {
        Self { objective, gradient }
    }
}

impl<F, G> ObjectiveFunction for WithGradient<F, G>
where
    F: Fn(&Vector) -> f64 + Send + Sync,
    G: Fn(&Vector) -> Vector + Send + Sync,
{
    fn eval(&self, x: &Vector) -> Result<f64> {
        Ok((self.objective)(x))
    }

    fn gradient(&self, x: &Vector) -> Result<Vector> {
        Ok((self.gradient)(x))
    }
}

/// A closure objective with analytic gradient and Hessian callbacks.
pub struct WithHessian<F, G, H> {
    objective: F,
    gradient: G,
    hessian: H,
}

impl<F, G, H> WithHessian<F, G, H>
where
    F: Fn(&Vector) -> f64 + Send + Sync,
    G: Fn(&Vector) -> Vector + Send + Sync,
    H: Fn(&Vector) -> DMatrix<f64> + Send + Sync,
{
    /// Pair `objective` with analytic `gradient` and `hessian` callbacks.
    pub fn new(objective: F, gradient: G, hessian: H) -> Self {
        Self { objective, gradient, hessian }
    }
}

impl<F, G, H> ObjectiveFunction for WithHessian<F, G, H>
where
    F: Fn(&Vector) -> f64 + Send + Sync,
    G: Fn(&Vector) -> Vector + Send + Sync,
    H: Fn(&Vector) -> DMatrix<f64> + Send + Sync,
{
    fn eval(&self, x: &Vector) -> Result<f64> {
        Ok((self.objective)(x))
    }

    fn gradient(&self, x: &Vector) -> Result<Vector> {
        Ok((self.gradient)(x))
    }

    fn hessian(&self, x: &Vector) -> Result<DMatrix<f64>> {
        Ok((self.hessian)(x))
    }
}
