//! Particle swarm optimization
//!
//! Population-based global search over a bounding region: each particle
//! carries position, velocity, and personal best; the velocity update
//! blends inertia, a cognitive pull toward the personal best, and a social
//! pull toward the swarm best, each independently randomly scaled per
//! dimension. Robust to multi-modal landscapes at the cost of many more
//! evaluations than any local method.
//!
//! All randomness flows from the explicit `config.seed`, never a hidden
//! global generator, so runs are reproducible and parallel tasks never
//! contend. Within one generation, position evaluations are independent and
//! fan out on rayon; personal/swarm-best bookkeeping and the velocity
//! updates happen after that implicit barrier, before the next generation.

use crate::config::SolverConfig;
use adopt_core::{Algorithm, Error, ObjectiveFunction, OptimizationResult, Result, Vector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Clerc-constriction style coefficients.
const INERTIA: f64 = 0.729;
const COGNITIVE: f64 = 1.49445;
const SOCIAL: f64 = 1.49445;

/// Generations without meaningful improvement before declaring convergence.
const STALL_LIMIT: usize = 25;

struct Particle {
    position: Vector,
    velocity: Vector,
    best_position: Vector,
    best_value: f64,
}

/// Minimize `obj` over the axis-aligned `region` (one `(lo, hi)` per
/// dimension).
pub fn minimize(
    obj: &dyn ObjectiveFunction,
    region: &[(f64, f64)],
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    config.validate()?;
    validate_region(region)?;
    let deadline = config.solve_deadline();

    let n = region.len();
    let spans: Vec<f64> = region.iter().map(|(lo, hi)| hi - lo).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);

    // Seed the swarm uniformly over the region.
    let mut particles: Vec<Particle> = (0..config.swarm_size)
        .map(|_| {
            let position = Vector::from_vec(
                region.iter().map(|&(lo, hi)| rng.random_range(lo..=hi)).collect(),
            );
            let velocity = Vector::from_vec(
                spans.iter().map(|&s| rng.random_range(-s..=s)).collect(),
            );
            Particle {
                best_position: position.clone(),
                position,
                velocity,
                best_value: f64::INFINITY,
            }
        })
        .collect();

    let mut swarm_best = particles[0].position.clone();
    let mut swarm_best_value = f64::INFINITY;
    let mut stall = 0usize;
    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..config.max_iterations {
        if config.interrupted(deadline) {
            break;
        }
        iterations = iter + 1;

        // Fan out the generation's evaluations; the collect is the barrier.
        let values: Vec<f64> = particles
            .par_iter()
            .map(|p| obj.eval(&p.position))
            .collect::<Result<Vec<_>>>()?;

        // Sequential bookkeeping after the barrier.
        let mut improved = false;
        for (particle, &value) in particles.iter_mut().zip(values.iter()) {
            if value < particle.best_value {
                particle.best_value = value;
                particle.best_position = particle.position.clone();
            }
            if value < swarm_best_value - config.tolerance {
                improved = true;
            }
            if value < swarm_best_value {
                swarm_best_value = value;
                swarm_best = particle.position.clone();
            }
        }

        stall = if improved { 0 } else { stall + 1 };
        if stall >= STALL_LIMIT {
            converged = true;
            break;
        }

        // Velocity and position updates, per dimension, with independent
        // random scalings.
        for particle in particles.iter_mut() {
            for d in 0..n {
                let r_cog: f64 = rng.random();
                let r_soc: f64 = rng.random();
                let v = INERTIA * particle.velocity[d]
                    + COGNITIVE * r_cog * (particle.best_position[d] - particle.position[d])
                    + SOCIAL * r_soc * (swarm_best[d] - particle.position[d]);
                // Clamp to the region span to keep particles from tunneling
                // across the whole box in one step.
                particle.velocity[d] = v.clamp(-spans[d], spans[d]);
                particle.position[d] += particle.velocity[d];
            }
        }
    }

    if !swarm_best_value.is_finite() {
        return Err(Error::instability(
            "swarm never observed a finite objective value",
            iterations,
            Some(swarm_best.into_vec()),
        ));
    }

    Ok(OptimizationResult::new(
        swarm_best,
        swarm_best_value,
        iterations,
        converged,
        Algorithm::ParticleSwarm,
    ))
}

fn validate_region(region: &[(f64, f64)]) -> Result<()> {
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
    Ok(())
}
