//! Uniform solve entry point
//!
//! Validates, consults the adaptive selector (unless the configuration
//! forces an algorithm), dispatches, and stamps the result with the
//! algorithm used and the selector's justification.

use crate::selector::analyze_problem;
use adopt_core::{
    Algorithm, Constraint, Error, ObjectiveFunction, OptimizationResult, Result, Vector,
};
use adopt_solvers::branch_bound::IntegerProgramSpecification;
use adopt_solvers::{
    SolverConfig, augmented_lagrangian, bfgs, branch_bound, gradient_descent, nelder_mead, newton,
    particle_swarm, penalty_barrier,
};

/// Solve from an initial guess, picking the algorithm adaptively.
pub fn solve(
    obj: &dyn ObjectiveFunction,
    initial_guess: &Vector,
    constraints: &[Constraint],
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    config.validate()?;
    validate_guess(initial_guess)?;

    let effective = config.clone().with_preference_bias();

    if let Some(algorithm) = config.algorithm {
        return run_algorithm(obj, initial_guess, constraints, algorithm, &effective)
            .map(|r| r.with_selection_reason("explicitly requested by configuration"));
    }

    let analysis = analyze_problem(initial_guess, constraints, true, config);
    log::debug!(
        "selected {} for a {}-dimensional problem: {}",
        analysis.recommended,
        analysis.size,
        analysis.reason
    );

    // Safety outranks the recommendation: before committing to
    // Newton-Raphson, probe the Hessian at the start. Ratio-shaped and
    // kinked objectives show up as diverging or non-finite entries, and
    // those must be routed to the universal fallback instead of aborting.
    let (algorithm, reason) = if analysis.recommended == Algorithm::NewtonRaphson
        && !hessian_probe_is_sane(obj, initial_guess)
    {
        log::debug!("Hessian probe rejected Newton-Raphson; falling back to gradient descent");
        (
            Algorithm::GradientDescent,
            format!(
                "{} - but the Hessian probe at the start diverged, so gradient descent \
                 runs instead",
                analysis.reason
            ),
        )
    } else {
        (analysis.recommended, analysis.reason)
    };

    run_algorithm(obj, initial_guess, constraints, algorithm, &effective)
        .map(|r| r.with_selection_reason(reason))
}

/// Solve over a bounding region (derivative-free global search).
pub fn solve_in_region(
    obj: &dyn ObjectiveFunction,
    region: &[(f64, f64)],
    constraints: &[Constraint],
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    if !constraints.is_empty() {
        return Err(Error::InvalidConfiguration(
            "region search is unconstrained; encode requirements in the objective or solve \
             from an initial guess with constraints"
                .into(),
        ));
    }
    particle_swarm::minimize(obj, region, config)
        .map(|r| r.with_selection_reason("bounding region supplied: particle swarm explores it"))
}

/// Solve with integrality requirements via branch-and-bound.
pub fn solve_integer(
    obj: &dyn ObjectiveFunction,
    initial_guess: &Vector,
    constraints: &[Constraint],
    spec: &IntegerProgramSpecification,
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    validate_guess(initial_guess)?;
    let effective = config.clone().with_preference_bias();
    branch_bound::minimize(obj, initial_guess, constraints, spec, &effective).map(|r| {
        r.with_selection_reason(format!(
            "{} variable(s) constrained to integers: branch-and-bound over continuous \
             relaxations",
            spec.indices().len()
        ))
    })
}

/// Run one concrete algorithm. Used by [`solve`] and by multi-start workers.
pub(crate) fn run_algorithm(
    obj: &dyn ObjectiveFunction,
    x0: &Vector,
    constraints: &[Constraint],
    algorithm: Algorithm,
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    let constrained_capable = matches!(
        algorithm,
        Algorithm::AugmentedLagrangian | Algorithm::PenaltyBarrier | Algorithm::BranchAndBound
    );
    if !constraints.is_empty() && !constrained_capable {
        return Err(Error::InvalidConfiguration(format!(
            "{algorithm} cannot honor constraints; pick a constrained solver or let the \
             selector decide"
        )));
    }

    match algorithm {
        Algorithm::GradientDescent => gradient_descent::minimize(obj, x0, config),
        Algorithm::NewtonRaphson => newton::minimize(obj, x0, config),
        Algorithm::Bfgs => bfgs::minimize(obj, x0, config),
        Algorithm::Lbfgs => bfgs::minimize_lbfgs(obj, x0, config),
        Algorithm::AugmentedLagrangian => {
            augmented_lagrangian::minimize(obj, x0, constraints, config)
        }
        Algorithm::PenaltyBarrier => penalty_barrier::minimize(obj, x0, constraints, config),
        Algorithm::NelderMead => nelder_mead::minimize(obj, x0, config),
        Algorithm::ParticleSwarm => Err(Error::InvalidConfiguration(
            "particle swarm searches a region, not a point; call solve_in_region".into(),
        )),
        Algorithm::BranchAndBound => Err(Error::InvalidConfiguration(
            "branch-and-bound needs an IntegerProgramSpecification; call solve_integer".into(),
        )),
    }
}

/// Numeric Hessian sanity check at the starting point. Mirrors the Newton
/// solver's own divergence thresholds so the probe predicts what the solver
/// would reject.
fn hessian_probe_is_sane(obj: &dyn ObjectiveFunction, x0: &Vector) -> bool {
    match obj.hessian(x0) {
        Ok(h) => h.iter().all(|entry| entry.is_finite() && entry.abs() < 1e6),
        Err(_) => false,
    }
}

fn validate_guess(initial_guess: &Vector) -> Result<()> {
    if initial_guess.is_empty() {
        return Err(Error::InvalidConfiguration("initial guess has dimension 0".into()));
    }
    if !initial_guess.is_finite() {
        return Err(Error::InvalidConfiguration(
            "initial guess contains non-finite components".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_routes_small_unconstrained_to_newton() {
        let f = |x: &Vector| (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2);
        let result =
            solve(&f, &Vector::zeros(2), &[], &SolverConfig::default()).unwrap();

        assert_eq!(result.algorithm, Algorithm::NewtonRaphson);
        assert!(result.selection_reason.is_some());
        assert_relative_eq!(result.solution[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(result.solution[1], 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_routes_constrained_to_constrained_solver() {
        let f = |x: &Vector| x.dot(x);
        let constraints = vec![Constraint::equality(|x: &Vector| x[0] + x[1] - 1.0)];
        let result =
            solve(&f, &Vector::zeros(2), &constraints, &SolverConfig::default()).unwrap();

        assert_eq!(result.algorithm, Algorithm::AugmentedLagrangian);
        assert!(result.lagrange_multipliers.is_some());
        assert_relative_eq!(result.solution[0], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_forced_algorithm_bypasses_selector() {
        let f = |x: &Vector| x.dot(x);
        let config = SolverConfig {
            algorithm: Some(Algorithm::NelderMead),
            ..SolverConfig::default()
        };
        let result = solve(&f, &Vector::from_slice(&[2.0, 2.0]), &[], &config).unwrap();
        assert_eq!(result.algorithm, Algorithm::NelderMead);
        assert_eq!(
            result.selection_reason.as_deref(),
            Some("explicitly requested by configuration")
        );
    }

    #[test]
    fn test_forced_unconstrained_algorithm_rejects_constraints() {
        let f = |x: &Vector| x.dot(x);
        let constraints = vec![Constraint::equality(|x: &Vector| x[0] - 1.0)];
        let config = SolverConfig {
            algorithm: Some(Algorithm::GradientDescent),
            ..SolverConfig::default()
        };
        let err = solve(&f, &Vector::zeros(1), &constraints, &config);
        assert!(matches!(err, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_empty_guess() {
        let f = |x: &Vector| x.dot(x);
        let err = solve(&f, &Vector::zeros(0), &[], &SolverConfig::default());
        assert!(matches!(err, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_nan_guess() {
        let f = |x: &Vector| x.dot(x);
        let err = solve(
            &f,
            &Vector::from_slice(&[f64::NAN, 0.0]),
            &[],
            &SolverConfig::default(),
        );
        assert!(matches!(err, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_hessian_probe_downgrades_newton_on_cusped_objective() {
        // sqrt(|x|) is 1-dimensional (Newton territory by size) but its
        // Hessian probe diverges at the cusp; the engine must fall back.
        let f = |x: &Vector| x[0].abs().sqrt();
        let result = solve(&f, &Vector::zeros(1), &[], &SolverConfig::default()).unwrap();

        assert_eq!(result.algorithm, Algorithm::GradientDescent);
        assert!(result.selection_reason.as_deref().unwrap().contains("probe"));
    }

    #[test]
    fn test_region_entry_runs_particle_swarm() {
        let f = |x: &Vector| (x[0] - 3.0).powi(2);
        let config = SolverConfig { seed: 5, max_iterations: 300, ..SolverConfig::default() };
        let result = solve_in_region(&f, &[(-10.0, 10.0)], &[], &config).unwrap();
        assert_eq!(result.algorithm, Algorithm::ParticleSwarm);
        assert_relative_eq!(result.solution[0], 3.0, epsilon = 1e-2);
    }
}
