//! Error types for ADOPT
//!
//! Budget exhaustion is deliberately NOT an error: solvers that run out of
//! iterations return their best-so-far state with `converged: false` so the
//! caller can accept or retry. The variants here are the failures that must
//! never be passed off as a result.

use thiserror::Error;

/// ADOPT error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration rejected before any iteration ran (dimension mismatch,
    /// zero swarm size, non-positive tolerance, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Singular or ill-conditioned Hessian, NaN/Inf propagation, or a
    /// domain-invalid evaluation. Carries enough state to retry with a
    /// different algorithm.
    #[error("numerical instability after {iterations} iterations: {reason}")]
    NumericalInstability {
        /// What went wrong.
        reason: String,
        /// Iterations completed before the failure.
        iterations: usize,
        /// Last iterate before the failure, if one was reached.
        last_iterate: Option<Vec<f64>>,
    },

    /// No feasible point exists: branch-and-bound exhausted its tree with no
    /// integer-feasible node, or penalty growth was exhausted with
    /// constraints still violated.
    #[error("infeasible problem: {reason}")]
    InfeasibleProblem {
        /// What could not be satisfied.
        reason: String,
        /// Indices (into the supplied constraint list) still violated.
        violated_constraints: Vec<usize>,
    },

    /// Objective callback failed to produce a value.
    #[error("objective evaluation failed: {0}")]
    Evaluation(String),
}

impl Error {
    /// Shorthand for a [`Error::NumericalInstability`] with an iterate.
    pub fn instability(
        reason: impl Into<String>,
        iterations: usize,
        last_iterate: Option<Vec<f64>>,
    ) -> Self {
        Error::NumericalInstability { reason: reason.into(), iterations, last_iterate }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::instability("singular Hessian", 3, Some(vec![1.0, 2.0]));
        let msg = err.to_string();
        assert!(msg.contains("3 iterations"));
        assert!(msg.contains("singular Hessian"));
    }

    #[test]
    fn test_infeasible_carries_indices() {
        let err = Error::InfeasibleProblem {
            reason: "penalty growth exhausted".into(),
            violated_constraints: vec![0, 2],
        };
        match err {
            Error::InfeasibleProblem { violated_constraints, .. } => {
                assert_eq!(violated_constraints, vec![0, 2]);
            }
            _ => panic!("wrong variant"),
        }
    }
}
