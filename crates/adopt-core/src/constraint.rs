//! Constraint model
//!
//! A problem owns an ordered list of constraints; indices into that list
//! identify constraints in results and errors. Satisfaction is always
//! within a tolerance: `|f(x)| <= tol` for an equality `f(x) = 0`,
//! `g(x) <= tol` for an inequality `g(x) <= 0`.

use crate::vector::Vector;
use std::fmt;
use std::sync::Arc;

type ConstraintFn = dyn Fn(&Vector) -> f64 + Send + Sync;

/// Tagged equality / inequality constraint.
///
/// Cloning is cheap (the constraint function is shared, not copied), which
/// lets branch-and-bound assemble per-node relaxations without touching the
/// caller-owned originals.
#[derive(Clone)]
pub enum Constraint {
    /// `f(x) = 0`
    Equality(Arc<ConstraintFn>),
    /// `g(x) <= 0`
    Inequality(Arc<ConstraintFn>),
}

impl Constraint {
    /// Equality constraint `f(x) = 0`.
    pub fn equality(f: impl Fn(&Vector) -> f64 + Send + Sync + 'static) -> Self {
        Constraint::Equality(Arc::new(f))
    }

    /// Inequality constraint `g(x) <= 0`.
    pub fn inequality(g: impl Fn(&Vector) -> f64 + Send + Sync + 'static) -> Self {
        Constraint::Inequality(Arc::new(g))
    }

    /// Raw constraint-function value at `x`.
    pub fn value(&self, x: &Vector) -> f64 {
        match self {
            Constraint::Equality(f) | Constraint::Inequality(f) => (**f)(x),
        }
    }

    /// Violation magnitude at `x`: `|f(x)|` for an equality,
    /// `max(0, g(x))` for an inequality. Zero when satisfied exactly.
    pub fn violation(&self, x: &Vector) -> f64 {
        match self {
            Constraint::Equality(_) => self.value(x).abs(),
            Constraint::Inequality(_) => self.value(x).max(0.0),
        }
    }

    /// Satisfaction predicate within `tol`.
    pub fn is_satisfied(&self, x: &Vector, tol: f64) -> bool {
        self.violation(x) <= tol
    }

    /// True for the equality variant.
    pub fn is_equality(&self) -> bool {
        matches!(self, Constraint::Equality(_))
    }

    /// True for the inequality variant.
    pub fn is_inequality(&self) -> bool {
        matches!(self, Constraint::Inequality(_))
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Equality(_) => write!(f, "Equality(f(x) = 0)"),
            Constraint::Inequality(_) => write!(f, "Inequality(g(x) <= 0)"),
        }
    }
}

/// Indices of constraints in `constraints` violated at `x` beyond `tol`.
pub fn violated_indices(constraints: &[Constraint], x: &Vector, tol: f64) -> Vec<usize> {
    constraints
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_satisfied(x, tol))
        .map(|(i, _)| i)
        .collect()
}
