//! Shared solver configuration
//!
//! One configuration struct serves every algorithm; each solver reads the
//! fields that apply to it and ignores the rest. `validate()` fails fast
//! with [`Error::InvalidConfiguration`] before any iteration runs.

use adopt_core::{Algorithm, CancelToken, Error, Result};
use std::time::{Duration, Instant};

/// Configuration for a single solve.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Iteration budget (outer iterations for nested solvers).
    pub max_iterations: usize,
    /// Convergence tolerance on gradient norm / step size / violation.
    pub tolerance: f64,
    /// Gradient-descent step size.
    pub learning_rate: f64,
    /// Momentum coefficient in `[0, 1)`; `0` disables momentum.
    pub momentum: f64,
    /// Evaluate the gradient at the look-ahead point `x + beta*v`.
    pub use_nesterov: bool,
    /// Damp Newton steps with a backtracking line search.
    pub use_line_search: bool,
    /// Correction pairs kept by L-BFGS.
    pub lbfgs_memory: usize,
    /// Particle count for particle swarm.
    pub swarm_size: usize,
    /// Starting points for parallel multi-start.
    pub num_starts: usize,
    /// Node budget for branch-and-bound.
    pub max_nodes: usize,
    /// Wall-clock budget for one solve (branch-and-bound) or a whole
    /// multi-start fan-out.
    pub time_limit: Option<Duration>,
    /// Absolute deadline. Set by multi-start so every in-flight solve shares
    /// one cutoff; takes precedence over `time_limit`.
    pub deadline: Option<Instant>,
    /// Loosen tolerances and shrink budgets. Never overrides the selector's
    /// structural branches.
    pub prefer_speed: bool,
    /// Tighten tolerances and grow budgets. Never overrides the selector's
    /// structural branches.
    pub prefer_accuracy: bool,
    /// Seed for every stochastic component (swarm init, start sampling).
    pub seed: u64,
    /// Force a specific algorithm instead of consulting the selector.
    pub algorithm: Option<Algorithm>,
    /// Cooperative cancellation, checked between iterations.
    pub cancel: Option<CancelToken>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            learning_rate: 0.01,
            momentum: 0.0,
            use_nesterov: false,
            use_line_search: false,
            lbfgs_memory: 10,
            swarm_size: 30,
            num_starts: 8,
            max_nodes: 10_000,
            time_limit: None,
            deadline: None,
            prefer_speed: false,
            prefer_accuracy: false,
            seed: 0,
            algorithm: None,
            cancel: None,
        }
    }
}

impl SolverConfig {
    /// Reject configurations that cannot produce a meaningful solve.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfiguration("max_iterations must be > 0".into()));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "tolerance must be finite and > 0, got {}",
                self.tolerance
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "learning_rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(Error::InvalidConfiguration(format!(
                "momentum must be in [0, 1), got {}",
                self.momentum
            )));
        }
        if self.use_nesterov && self.momentum == 0.0 {
            return Err(Error::InvalidConfiguration(
                "Nesterov look-ahead requires momentum > 0".into(),
            ));
        }
        if self.lbfgs_memory == 0 {
            return Err(Error::InvalidConfiguration("lbfgs_memory must be > 0".into()));
        }
        if self.swarm_size == 0 {
            return Err(Error::InvalidConfiguration("swarm_size must be > 0".into()));
        }
        if self.num_starts == 0 {
            return Err(Error::InvalidConfiguration("num_starts must be > 0".into()));
        }
        if self.max_nodes == 0 {
            return Err(Error::InvalidConfiguration("max_nodes must be > 0".into()));
        }
        if self.prefer_speed && self.prefer_accuracy {
            return Err(Error::InvalidConfiguration(
                "prefer_speed and prefer_accuracy are mutually exclusive".into(),
            ));
        }
        Ok(())
    }

    /// Apply preference biasing to tolerance and iteration budget.
    ///
    /// Biases only the knobs, never which algorithm runs.
    pub fn with_preference_bias(mut self) -> Self {
        if self.prefer_speed {
            self.tolerance *= 100.0;
            self.max_iterations = (self.max_iterations / 2).max(1);
        } else if self.prefer_accuracy {
            self.tolerance /= 100.0;
            self.max_iterations = self.max_iterations.saturating_mul(2);
        }
        self
    }

    /// Absolute cutoff for this solve, from `deadline` or `time_limit`.
    pub fn solve_deadline(&self) -> Option<Instant> {
        self.deadline.or_else(|| self.time_limit.map(|limit| Instant::now() + limit))
    }

    /// Whether the solve should stop now (cancelled or past `deadline`).
    pub fn interrupted(&self, deadline: Option<Instant>) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
            || deadline.is_some_and(|d| Instant::now() >= d)
    }
}
