//! Adaptive algorithm selection
//!
//! A pure function from problem shape to an [`Algorithm`] tag plus a
//! human-readable justification. The decision order encodes the safety
//! rules first - Newton-Raphson is never recommended for constrained,
//! large, or preference-overridden-unsafe problems - and preferences only
//! bias tolerances and budgets elsewhere in the engine, never these
//! structural branches.

use adopt_core::{Algorithm, Constraint, Vector};
use adopt_solvers::SolverConfig;

/// Dimension above which second-order and quasi-Newton bookkeeping is not
/// worth it and plain gradient descent wins.
const LARGE_PROBLEM: usize = 100;
/// Dimension up to which a numeric Hessian (O(n^2) evaluations) is cheap
/// enough for Newton-Raphson.
const NEWTON_LIMIT: usize = 5;
/// Extended Newton range when the caller prefers accuracy.
const NEWTON_LIMIT_ACCURATE: usize = 10;

/// What the selector saw and what it recommends.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemAnalysis {
    /// Problem dimension.
    pub size: usize,
    /// Any constraints at all.
    pub has_constraints: bool,
    /// At least one inequality constraint.
    pub has_inequalities: bool,
    /// The algorithm the engine will run.
    pub recommended: Algorithm,
    /// Why.
    pub reason: String,
}

/// Analyze a problem and recommend an algorithm.
///
/// Deterministic: identical inputs always produce identical
/// recommendations. First match wins:
/// inequalities -> penalty-barrier; equality-only -> augmented Lagrangian;
/// dimension > 100 -> gradient descent; small -> Newton-Raphson;
/// otherwise gradient descent.
pub fn analyze_problem(
    initial_guess: &Vector,
    constraints: &[Constraint],
    has_gradient: bool,
    config: &SolverConfig,
) -> ProblemAnalysis {
    let size = initial_guess.dim();
    let has_inequalities = constraints.iter().any(Constraint::is_inequality);
    let has_constraints = !constraints.is_empty();
    let derivatives = if has_gradient { "analytic gradient" } else { "numeric differentiation" };

    let (recommended, reason) = if has_inequalities {
        (
            Algorithm::PenaltyBarrier,
            format!(
                "{} constraint(s) including inequalities: penalty-barrier enforces g(x) <= 0 \
                 without assuming a feasible start",
                constraints.len()
            ),
        )
    } else if has_constraints {
        (
            Algorithm::AugmentedLagrangian,
            format!(
                "{} equality constraint(s): augmented Lagrangian converges with shadow prices",
                constraints.len()
            ),
        )
    } else if size > LARGE_PROBLEM {
        (
            Algorithm::GradientDescent,
            format!(
                "unconstrained with {size} variables (> {LARGE_PROBLEM}): second-order methods \
                 are impractical, gradient descent with {derivatives} scales"
            ),
        )
    } else if size <= NEWTON_LIMIT
        || (config.prefer_accuracy && size < NEWTON_LIMIT_ACCURATE)
    {
        (
            Algorithm::NewtonRaphson,
            format!(
                "unconstrained, smooth-assumed, {size} variable(s): Newton-Raphson converges \
                 quadratically at this dimension"
            ),
        )
    } else {
        (
            Algorithm::GradientDescent,
            format!(
                "unconstrained with {size} variables: gradient descent with {derivatives} is \
                 the safe default"
            ),
        )
    };

    ProblemAnalysis { size, has_constraints, has_inequalities, recommended, reason }
}
