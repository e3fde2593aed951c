use adopt_core::Vector;
use adopt_solvers::config::SolverConfig;
use adopt_solvers::{bfgs, gradient_descent, nelder_mead, newton};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn rosenbrock(x: &Vector) -> f64 {
    (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2)
}

fn quadratic_bowl(x: &Vector) -> f64 {
    (0..x.dim()).map(|i| (x[i] - 0.5).powi(2) * (1.0 + i as f64)).sum()
}

fn bench_rosenbrock(c: &mut Criterion) {
    let x0 = Vector::from_slice(&[0.0, 0.0]);
    let config = SolverConfig::default();

    let mut group = c.benchmark_group("rosenbrock_2d");

    group.bench_function("bfgs", |b| {
        b.iter(|| bfgs::minimize(&rosenbrock, black_box(&x0), &config).unwrap())
    });

    group.bench_function("lbfgs", |b| {
        b.iter(|| bfgs::minimize_lbfgs(&rosenbrock, black_box(&x0), &config).unwrap())
    });

    group.bench_function("nelder_mead", |b| {
        let nm_config = SolverConfig { max_iterations: 5000, ..config.clone() };
        b.iter(|| nelder_mead::minimize(&rosenbrock, black_box(&x0), &nm_config).unwrap())
    });

    group.finish();
}

fn bench_quadratic(c: &mut Criterion) {
    let config = SolverConfig::default();

    let mut group = c.benchmark_group("quadratic_bowl");

    for n in [2usize, 8] {
        let x0 = Vector::zeros(n);
        group.bench_function(format!("newton_{n}d"), |b| {
            b.iter(|| newton::minimize(&quadratic_bowl, black_box(&x0), &config).unwrap())
        });
        group.bench_function(format!("gradient_descent_{n}d"), |b| {
            let gd_config =
                SolverConfig { learning_rate: 0.05, max_iterations: 10_000, ..config.clone() };
            b.iter(|| {
                gradient_descent::minimize(&quadratic_bowl, black_box(&x0), &gd_config).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_constrained(c: &mut Criterion) {
    use adopt_core::Constraint;
    use adopt_solvers::{augmented_lagrangian, penalty_barrier};

    let objective = |x: &Vector| x.dot(x);
    let config = SolverConfig::default();

    let mut group = c.benchmark_group("constrained");

    group.bench_function("augmented_lagrangian_line", |b| {
        let constraints = vec![Constraint::equality(|x: &Vector| x[0] + x[1] - 1.0)];
        let x0 = Vector::from_slice(&[0.0, 1.0]);
        b.iter(|| {
            augmented_lagrangian::minimize(&objective, black_box(&x0), &constraints, &config)
                .unwrap()
        })
    });

    group.bench_function("penalty_barrier_halfspace", |b| {
        let constraints = vec![Constraint::inequality(|x: &Vector| 2.0 - x[0] - x[1])];
        let x0 = Vector::zeros(2);
        b.iter(|| {
            penalty_barrier::minimize(&objective, black_box(&x0), &constraints, &config).unwrap()
        })
    });

    group.finish();
}

fn bench_numeric_differentiation(c: &mut Criterion) {
    use adopt_core::diff;

    let mut group = c.benchmark_group("numeric_differentiation");

    for n in [4usize, 16, 64] {
        let f = |x: &Vector| (0..x.dim()).map(|i| (x[i] - 0.1 * i as f64).powi(2)).sum::<f64>();
        let x = Vector::filled(n, 0.3);
        group.bench_function(format!("gradient_{n}d"), |b| {
            b.iter(|| diff::gradient(&f, black_box(&x)).unwrap())
        });
    }

    // The O(n^2) wall that keeps Newton small.
    for n in [4usize, 10] {
        let f = |x: &Vector| (0..x.dim()).map(|i| (x[i] - 0.1 * i as f64).powi(2)).sum::<f64>();
        let x = Vector::filled(n, 0.3);
        group.bench_function(format!("hessian_{n}d"), |b| {
            b.iter(|| diff::hessian(&f, black_box(&x)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rosenbrock, bench_quadratic, bench_constrained, bench_numeric_differentiation);
criterion_main!(benches);
