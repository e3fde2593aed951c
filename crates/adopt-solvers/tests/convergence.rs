//! Cross-solver convergence properties on reference problems.

use adopt_core::{Constraint, Error, ObjectiveFunction, Vector};
use adopt_solvers::config::SolverConfig;
use adopt_solvers::{augmented_lagrangian, bfgs, gradient_descent, nelder_mead, newton};
use approx::assert_relative_eq;

/// f(x) = ||Ax - b||^2 for a fixed well-conditioned A.
struct LeastSquares {
    a: [[f64; 2]; 2],
    b: [f64; 2],
}

impl ObjectiveFunction for LeastSquares {
    fn eval(&self, x: &Vector) -> adopt_core::Result<f64> {
        let r0 = self.a[0][0] * x[0] + self.a[0][1] * x[1] - self.b[0];
        let r1 = self.a[1][0] * x[0] + self.a[1][1] * x[1] - self.b[1];
        Ok(r0 * r0 + r1 * r1)
    }
}

#[test]
fn newton_solves_convex_quadratic_from_any_start() {
    let problem = LeastSquares { a: [[2.0, 1.0], [1.0, 3.0]], b: [1.0, 2.0] };
    // Minimizer of ||Ax - b||^2 with invertible A is x* = A^{-1} b = (0.2, 0.6).
    let config = SolverConfig::default();

    for start in [[0.0, 0.0], [50.0, -30.0], [-7.0, 7.0], [1e3, 1e3]] {
        let result = newton::minimize(&problem, &Vector::from_slice(&start), &config).unwrap();
        assert!(result.converged);
        assert!(
            result.iterations <= 3,
            "start {start:?} took {} iterations",
            result.iterations
        );
        assert_relative_eq!(result.solution[0], 0.2, epsilon = 1e-5);
        assert_relative_eq!(result.solution[1], 0.6, epsilon = 1e-5);
        assert!(result.objective_value < 1e-6);
    }
}

/// Negative Sharpe ratio: -(r.w - rf) / sqrt(w' Sigma w). The second
/// derivative of 1/sqrt(q) is unbounded as q -> 0, exactly the shape
/// Newton-Raphson must refuse to push through.
struct NegativeSharpe {
    returns: [f64; 2],
    risk_free: f64,
    covariance: [[f64; 2]; 2],
}

impl ObjectiveFunction for NegativeSharpe {
    fn eval(&self, w: &Vector) -> adopt_core::Result<f64> {
        let excess = self.returns[0] * w[0] + self.returns[1] * w[1] - self.risk_free;
        let variance = self.covariance[0][0] * w[0] * w[0]
            + 2.0 * self.covariance[0][1] * w[0] * w[1]
            + self.covariance[1][1] * w[1] * w[1];
        Ok(-excess / variance.sqrt())
    }
}

#[test]
fn newton_raises_instability_on_sharpe_ratio_never_nan() {
    let sharpe = NegativeSharpe {
        returns: [0.10, 0.12],
        risk_free: 0.02,
        covariance: [[0.04, 0.01], [0.01, 0.09]],
    };
    let config = SolverConfig { max_iterations: 40, ..Default::default() };

    match newton::minimize(&sharpe, &Vector::from_slice(&[0.5, 0.5]), &config) {
        Err(Error::NumericalInstability { iterations, last_iterate, .. }) => {
            assert!(iterations <= 40);
            // Enough state to retry with a different algorithm.
            assert!(last_iterate.is_some());
        }
        Ok(result) => panic!("Newton must not return a result here, got {result}"),
        Err(other) => panic!("expected NumericalInstability, got {other:?}"),
    }
}

#[test]
fn gradient_descent_is_the_fallback_for_the_sharpe_shape() {
    // The same objective the Newton test rejects is fine for plain descent
    // with a conservative learning rate.
    let sharpe = NegativeSharpe {
        returns: [0.10, 0.12],
        risk_free: 0.02,
        covariance: [[0.04, 0.01], [0.01, 0.09]],
    };
    let config = SolverConfig {
        learning_rate: 0.05,
        max_iterations: 2000,
        tolerance: 1e-4,
        ..Default::default()
    };
    let result =
        gradient_descent::minimize(&sharpe, &Vector::from_slice(&[0.5, 0.5]), &config).unwrap();

    // A finite, improving result - never NaN.
    assert!(result.objective_value.is_finite());
    assert!(result.objective_value <= sharpe.eval(&Vector::from_slice(&[0.5, 0.5])).unwrap());
}

#[test]
fn constrained_results_satisfy_every_constraint() {
    // A batch of equality-constrained problems, all checked against the
    // 1e-4 satisfaction tolerance.
    let cases: Vec<(Box<dyn Fn(&Vector) -> f64 + Send + Sync>, Vec<Constraint>, Vec<f64>)> = vec![
        (
            Box::new(|x: &Vector| x.dot(x)),
            vec![Constraint::equality(|x: &Vector| x[0] + x[1] - 1.0)],
            vec![0.0, 1.0],
        ),
        (
            Box::new(|x: &Vector| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2)),
            vec![Constraint::equality(|x: &Vector| x[0] - 2.0 * x[1])],
            vec![1.0, 1.0],
        ),
        (
            Box::new(|x: &Vector| x[0].powi(4) + x[1] * x[1] + x[0] * x[1]),
            vec![Constraint::equality(|x: &Vector| x[0] + x[1] - 2.0)],
            vec![0.0, 0.0],
        ),
    ];

    for (objective, constraints, start) in cases {
        let result = augmented_lagrangian::minimize(
            &objective,
            &Vector::from_slice(&start),
            &constraints,
            &SolverConfig::default(),
        )
        .unwrap();
        assert!(result.converged);
        for (i, c) in constraints.iter().enumerate() {
            assert!(
                c.is_satisfied(&result.solution, 1e-4),
                "constraint {i} violated at {:?}",
                result.solution.as_slice()
            );
        }
    }
}

#[test]
fn shadow_price_predicts_objective_shift() {
    // min x^2 + y^2 s.t. x + y = 1, then tighten the target by eps (require
    // x + y = 1 - eps): the optimal objective must move by about
    // lambda * eps - the finite-difference reading of the shadow price.
    let objective = |x: &Vector| x.dot(x);
    let config = SolverConfig::default();

    let base = augmented_lagrangian::minimize(
        &objective,
        &Vector::from_slice(&[0.0, 1.0]),
        &[Constraint::equality(|x: &Vector| x[0] + x[1] - 1.0)],
        &config,
    )
    .unwrap();
    let lambda = base.lagrange_multipliers.as_ref().unwrap()[0];
    assert_relative_eq!(lambda, -1.0, epsilon = 1e-2);

    let eps = 1e-2;
    let tightened = augmented_lagrangian::minimize(
        &objective,
        &Vector::from_slice(&[0.0, 1.0]),
        &[Constraint::equality(move |x: &Vector| x[0] + x[1] - (1.0 - eps))],
        &config,
    )
    .unwrap();

    let predicted = base.objective_value + lambda * eps;
    assert_relative_eq!(tightened.objective_value, predicted, epsilon = 1e-3);
}

#[test]
fn quasi_newton_and_simplex_agree_without_gradients() {
    // Same smooth bowl, one solver with gradients and one without; both
    // must land on the same minimizer.
    let f = |x: &Vector| (x[0] - 1.5).powi(2) + 2.0 * (x[1] + 0.5).powi(2) + 1.0;
    let config = SolverConfig::default();
    let x0 = Vector::from_slice(&[4.0, 4.0]);

    let quasi = bfgs::minimize(&f, &x0, &config).unwrap();
    let simplex = nelder_mead::minimize(
        &f,
        &x0,
        &SolverConfig { tolerance: 1e-9, ..config },
    )
    .unwrap();

    assert!(quasi.converged && simplex.converged);
    assert_relative_eq!(quasi.solution[0], simplex.solution[0], epsilon = 1e-3);
    assert_relative_eq!(quasi.solution[1], simplex.solution[1], epsilon = 1e-3);
    assert_relative_eq!(quasi.objective_value, 1.0, epsilon = 1e-6);
}
