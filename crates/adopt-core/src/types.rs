//! Result and algorithm types
//!
//! Results are produced once per solve and never mutated after return.

use crate::vector::Vector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The algorithms the engine can dispatch to.
///
/// The adaptive selector is a pure function from problem shape into this
/// enum; solvers never pick each other at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// First-order descent with optional momentum / Nesterov look-ahead.
    GradientDescent,
    /// Second-order Newton-Raphson with damping.
    NewtonRaphson,
    /// Dense quasi-Newton with a rank-2 inverse-Hessian update.
    Bfgs,
    /// Limited-memory BFGS bounded to the last k correction pairs.
    Lbfgs,
    /// Equality constraints via multiplier estimates.
    AugmentedLagrangian,
    /// Inequality / mixed constraints via a growing penalty.
    PenaltyBarrier,
    /// Integer constraints via relaxation, branching, pruning.
    BranchAndBound,
    /// Derivative-free simplex search.
    NelderMead,
    /// Population-based global search.
    ParticleSwarm,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::GradientDescent => "gradient descent",
            Algorithm::NewtonRaphson => "Newton-Raphson",
            Algorithm::Bfgs => "BFGS",
            Algorithm::Lbfgs => "L-BFGS",
            Algorithm::AugmentedLagrangian => "augmented Lagrangian",
            Algorithm::PenaltyBarrier => "penalty-barrier",
            Algorithm::BranchAndBound => "branch-and-bound",
            Algorithm::NelderMead => "Nelder-Mead",
            Algorithm::ParticleSwarm => "particle swarm",
        };
        write!(f, "{name}")
    }
}

/// Outcome of a single solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best point found.
    pub solution: Vector,

    /// Objective value at `solution`.
    pub objective_value: f64,

    /// Iterations performed (outer iterations for nested solvers).
    pub iterations: usize,

    /// Whether the convergence criterion was met within budget. `false`
    /// means budget exhaustion with best-so-far state: reported, non-fatal.
    pub converged: bool,

    /// Algorithm that produced this result.
    pub algorithm: Algorithm,

    /// Human-readable justification when the adaptive selector chose the
    /// algorithm. `None` for direct solver calls.
    pub selection_reason: Option<String>,

    /// Converged multiplier per supplied constraint (shadow prices), when a
    /// constrained solver produced this result.
    pub lagrange_multipliers: Option<Vec<f64>>,

    /// Subproblems explored, when branch-and-bound produced this result.
    pub nodes_explored: Option<usize>,
}

impl OptimizationResult {
    /// Result with the required fields; optional fields start empty.
    pub fn new(
        solution: Vector,
        objective_value: f64,
        iterations: usize,
        converged: bool,
        algorithm: Algorithm,
    ) -> Self {
        Self {
            solution,
            objective_value,
            iterations,
            converged,
            algorithm,
            selection_reason: None,
            lagrange_multipliers: None,
            nodes_explored: None,
        }
    }

    /// Attach the selector's justification.
    pub fn with_selection_reason(mut self, reason: impl Into<String>) -> Self {
        self.selection_reason = Some(reason.into());
        self
    }

    /// Attach converged multipliers.
    pub fn with_multipliers(mut self, multipliers: Vec<f64>) -> Self {
        self.lagrange_multipliers = Some(multipliers);
        self
    }

    /// Attach the branch-and-bound node count.
    pub fn with_nodes_explored(mut self, nodes: usize) -> Self {
        self.nodes_explored = Some(nodes);
        self
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OptimizationResult(f={:.6}, iterations={}, converged={}, algorithm={})",
            self.objective_value, self.iterations, self.converged, self.algorithm
        )
    }
}

/// Outcome of a parallel multi-start run, built once at fan-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelOptimizationResult {
    /// Lowest-objective solution across all finished starts.
    pub solution: Vector,

    /// Objective value at `solution`.
    pub objective_value: f64,

    /// Every start that finished before the deadline, in start order.
    pub all_results: Vec<OptimizationResult>,

    /// Converged starts over requested starts.
    pub success_rate: f64,
}

impl ParallelOptimizationResult {
    /// Reduce finished starts to the minimum-objective result.
    ///
    /// `requested` is the number of starts asked for: the denominator of
    /// `success_rate` even when some starts missed the deadline.
    ///
    /// Returns `None` when no start finished.
    pub fn from_results(results: Vec<OptimizationResult>, requested: usize) -> Option<Self> {
        let best = results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.objective_value.is_finite())
            .min_by(|(_, a), (_, b)| a.objective_value.total_cmp(&b.objective_value))
            .map(|(i, _)| i)?;

        let converged = results.iter().filter(|r| r.converged).count();
        let success_rate = if requested == 0 { 0.0 } else { converged as f64 / requested as f64 };

        Some(Self {
            solution: results[best].solution.clone(),
            objective_value: results[best].objective_value,
            all_results: results,
            success_rate,
        })
    }
}
