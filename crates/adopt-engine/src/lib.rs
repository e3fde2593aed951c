//! # adopt-engine
//!
//! Adaptive front end for the ADOPT optimization engine.
//!
//! This crate provides:
//! - [`analyze_problem`] - pure problem-shape analysis with an algorithm
//!   recommendation and justification
//! - [`solve`] / [`solve_in_region`] / [`solve_integer`] - the uniform
//!   entry points that validate, select, dispatch, and stamp results
//! - [`multi_start`] / [`multi_start_in_region`] - concurrent fan-out over
//!   N starting points with a reduce-to-minimum fan-in
//!
//! ## Architecture
//!
//! The engine depends on solver implementations through their shared
//! config/result contract, never the other way around. Algorithm choice is
//! data ([`adopt_core::Algorithm`]), so callers can log it, serialize it,
//! or override it.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Parallel multi-start fan-out.
pub mod multistart;
/// Problem analysis and algorithm recommendation.
pub mod selector;
/// Uniform solve entry points.
pub mod solve;

pub use multistart::{multi_start, multi_start_in_region};
pub use selector::{ProblemAnalysis, analyze_problem};
pub use solve::{solve, solve_in_region, solve_integer};

pub use adopt_core::{
    Algorithm, CancelToken, Constraint, Error, ObjectiveFunction, OptimizationResult,
    ParallelOptimizationResult, Result, Vector, WithGradient, WithHessian,
};
pub use adopt_solvers::{IntegerProgramSpecification, SolverConfig};
