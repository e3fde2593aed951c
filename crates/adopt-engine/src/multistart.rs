//! Parallel multi-start
//!
//! Fans one base algorithm out across N independent starting points - the
//! safest parallel path: every solve owns its state, and the only shared
//! step is the fan-in reduction to the minimum. Start i derives seed
//! `config.seed + i` so the whole run is reproducible.
//!
//! Cancellation propagates to every in-flight solve through the shared
//! [`CancelToken`]; a `time_limit` bounds the whole fan-out, and starts
//! that miss the deadline are excluded from `all_results` and the
//! reduction while still counting toward `success_rate`'s denominator.

use crate::solve::run_algorithm;
use adopt_core::{
    Algorithm, Error, ObjectiveFunction, OptimizationResult, ParallelOptimizationResult, Result,
    Vector,
};
use adopt_solvers::SolverConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

/// Run `base` from every supplied start, concurrently, and keep the best.
pub fn multi_start(
    obj: &dyn ObjectiveFunction,
    starts: &[Vector],
    base: Algorithm,
    config: &SolverConfig,
) -> Result<ParallelOptimizationResult> {
    config.validate()?;
    if starts.is_empty() {
        return Err(Error::InvalidConfiguration("multi-start needs at least one start".into()));
    }
    let dim = starts[0].dim();
    for (i, start) in starts.iter().enumerate() {
        if start.dim() != dim {
            return Err(Error::InvalidConfiguration(format!(
                "start {i} has dimension {} but start 0 has {dim}",
                start.dim()
            )));
        }
        if !start.is_finite() {
            return Err(Error::InvalidConfiguration(format!(
                "start {i} contains non-finite components"
            )));
        }
    }
    if matches!(base, Algorithm::ParticleSwarm | Algorithm::BranchAndBound) {
        return Err(Error::InvalidConfiguration(format!(
            "{base} is not a point-started base algorithm for multi-start"
        )));
    }

    let deadline = config.solve_deadline();
    let requested = starts.len();

    let outcomes: Vec<Option<OptimizationResult>> = starts
        .par_iter()
        .enumerate()
        .map(|(i, start)| {
            if config.interrupted(deadline) {
                // The whole fan-out is already past its budget; this start
                // never ran.
                return None;
            }
            let worker_config = SolverConfig {
                deadline,
                time_limit: None,
                seed: config.seed.wrapping_add(i as u64),
                algorithm: None,
                ..config.clone()
            };
            let outcome = run_algorithm(obj, start, &[], base, &worker_config);
            let finished_in_time = deadline.is_none_or(|d| Instant::now() < d);
            match outcome {
                Ok(result) if finished_in_time => Some(result),
                Ok(_) => None,
                Err(err) => {
                    // One bad start must not sink the fan-out; that start
                    // simply does not converge.
                    log::debug!("multi-start worker {i} failed: {err}");
                    None
                }
            }
        })
        .collect();

    let finished: Vec<OptimizationResult> = outcomes.into_iter().flatten().collect();

    ParallelOptimizationResult::from_results(finished, requested).ok_or_else(|| {
        Error::instability("no start finished (cancelled, past the deadline, or all failed)", 0, None)
    })
}

/// Draw `config.num_starts` starting points uniformly from `region`, then
/// run [`multi_start`].
pub fn multi_start_in_region(
    obj: &dyn ObjectiveFunction,
    region: &[(f64, f64)],
    base: Algorithm,
    config: &SolverConfig,
) -> Result<ParallelOptimizationResult> {
    config.validate()?;
    if region.is_empty() {
        return Err(Error::InvalidConfiguration("search region is empty".into()));
    }
    for (i, &(lo, hi)) in region.iter().enumerate() {
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(Error::InvalidConfiguration(format!(
                "search region dimension {i} is invalid: ({lo}, {hi})"
            )));
        }
    }

    // One sequential generator: start k of a larger run equals start k of a
    // smaller run with the same seed, so growing N never loses ground.
    let mut rng = StdRng::seed_from_u64(config.seed);
    let starts: Vec<Vector> = (0..config.num_starts)
        .map(|_| {
            Vector::from_vec(region.iter().map(|&(lo, hi)| rng.random_range(lo..=hi)).collect())
        })
        .collect();

    multi_start(obj, &starts, base, config)
}
