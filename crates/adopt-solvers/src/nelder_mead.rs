//! Nelder-Mead simplex search
//!
//! Derivative-free: maintains n+1 vertices, reflecting the worst across the
//! centroid of the rest each iteration, then conditionally expanding,
//! contracting, or shrinking based on how the reflected value compares to
//! the best / second-worst / worst (standard coefficients: reflection 1.0,
//! expansion 2.0, contraction 0.5, shrink 0.5). Tolerant of noise and
//! discontinuities at n+1 evaluations per iteration; no convergence
//! guarantee on non-convex surfaces.

use crate::config::SolverConfig;
use adopt_core::{Algorithm, ObjectiveFunction, OptimizationResult, Result, Vector};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Relative perturbation for nonzero coordinates of the initial simplex.
const INIT_STEP_REL: f64 = 0.05;
/// Absolute perturbation for zero coordinates of the initial simplex.
const INIT_STEP_ABS: f64 = 0.00025;

/// Minimize `obj` from `x0` with the Nelder-Mead simplex.
pub fn minimize(
    obj: &dyn ObjectiveFunction,
    x0: &Vector,
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    config.validate()?;
    let deadline = config.solve_deadline();
    let n = x0.dim();

    // Initial simplex: x0 plus one vertex per coordinate perturbation.
    let mut vertices: Vec<(Vector, f64)> = Vec::with_capacity(n + 1);
    vertices.push((x0.clone(), obj.eval(x0)?));
    for i in 0..n {
        let mut v = x0.clone();
        v[i] += if v[i] != 0.0 { INIT_STEP_REL * v[i] } else { INIT_STEP_ABS };
        let value = obj.eval(&v)?;
        vertices.push((v, value));
    }

    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..config.max_iterations {
        if config.interrupted(deadline) {
            break;
        }

        // Best first, worst last. NaN orders to the back so a noisy
        // evaluation cannot become the "best" vertex.
        vertices.sort_by(|a, b| a.1.total_cmp(&b.1));

        let value_spread = vertices[n].1 - vertices[0].1;
        let vertex_spread = (&vertices[n].0 - &vertices[0].0).norm();
        if value_spread.abs() < config.tolerance && vertex_spread < config.tolerance {
            converged = true;
            break;
        }
        iterations = iter + 1;

        // Centroid of all but the worst vertex.
        let mut centroid = Vector::zeros(n);
        for (v, _) in vertices.iter().take(n) {
            centroid = &centroid + v;
        }
        centroid = &centroid * (1.0 / n as f64);

        let best = vertices[0].1;
        let second_worst = vertices[n - 1].1;
        let worst = vertices[n].1;

        let reflected = &centroid + &(&(&centroid - &vertices[n].0) * REFLECTION);
        let f_reflected = obj.eval(&reflected)?;

        if f_reflected < best {
            // Expansion: keep pushing in the same direction.
            let expanded = &centroid + &(&(&reflected - &centroid) * EXPANSION);
            let f_expanded = obj.eval(&expanded)?;
            vertices[n] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
        } else if f_reflected < second_worst {
            vertices[n] = (reflected, f_reflected);
        } else {
            // Contraction, toward the better of worst/reflected.
            let toward =
                if f_reflected < worst { &reflected } else { &vertices[n].0 };
            let contracted = &centroid + &(&(toward - &centroid) * CONTRACTION);
            let f_contracted = obj.eval(&contracted)?;

            if f_contracted < worst.min(f_reflected) {
                vertices[n] = (contracted, f_contracted);
            } else {
                // Shrink everything toward the best vertex.
                let anchor = vertices[0].0.clone();
                for (v, value) in vertices.iter_mut().skip(1) {
                    *v = &anchor + &(&(&*v - &anchor) * SHRINK);
                    *value = obj.eval(v)?;
                }
            }
        }
    }

    vertices.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (solution, objective_value) = vertices.swap_remove(0);
    Ok(OptimizationResult::new(
        solution,
        objective_value,
        iterations,
        converged,
        Algorithm::NelderMead,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere() {
        let f = |x: &Vector| x.dot(x);
        let config = SolverConfig { tolerance: 1e-8, ..Default::default() };
        let result = minimize(&f, &Vector::from_slice(&[2.0, -3.0]), &config).unwrap();

        assert!(result.converged);
        assert!(result.objective_value < 1e-6);
    }

    #[test]
    fn test_rosenbrock_no_gradient() {
        let f = |x: &Vector| {
            (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2)
        };
        let config =
            SolverConfig { tolerance: 1e-10, max_iterations: 5000, ..Default::default() };
        let result = minimize(&f, &Vector::from_slice(&[-1.2, 1.0]), &config).unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.solution[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.solution[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_tolerates_kink() {
        // |x| + |y| has no gradient at the minimum; simplex search does not
        // care.
        let f = |x: &Vector| x[0].abs() + x[1].abs();
        let config =
            SolverConfig { tolerance: 1e-9, max_iterations: 2000, ..Default::default() };
        let result = minimize(&f, &Vector::from_slice(&[1.0, -1.5]), &config).unwrap();

        assert!(result.objective_value < 1e-4);
    }

    #[test]
    fn test_tolerates_discontinuity() {
        // Step discontinuity away from the minimum.
        let f = |x: &Vector| {
            let base = (x[0] - 2.0).powi(2);
            if x[0] < 0.0 { base + 5.0 } else { base }
        };
        let config = SolverConfig { max_iterations: 2000, ..Default::default() };
        let result = minimize(&f, &Vector::from_slice(&[-3.0]), &config).unwrap();

        assert_relative_eq!(result.solution[0], 2.0, epsilon = 1e-2);
    }

    #[test]
    fn test_budget_exhaustion_reports_best_vertex() {
        let f = |x: &Vector| x.dot(x);
        let config = SolverConfig { max_iterations: 3, ..Default::default() };
        let result = minimize(&f, &Vector::from_slice(&[5.0, 5.0]), &config).unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
        // Best vertex is still no worse than the start.
        assert!(result.objective_value <= 50.0);
    }
}
