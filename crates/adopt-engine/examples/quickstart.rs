//! Tour of the engine's entry points on small reference problems.
//!
//! Run with: `cargo run --example quickstart`

use adopt_engine::{
    Algorithm, Constraint, IntegerProgramSpecification, SolverConfig, Vector, multi_start_in_region,
    solve, solve_integer,
};

fn main() -> adopt_engine::Result<()> {
    // 1. Unconstrained: the selector picks Newton-Raphson at this size.
    let bowl = |x: &Vector| (x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2);
    let result = solve(&bowl, &Vector::zeros(2), &[], &SolverConfig::default())?;
    println!("[unconstrained] {result}");
    println!("  chosen because: {}", result.selection_reason.as_deref().unwrap_or("-"));

    // 2. Equality-constrained: augmented Lagrangian with shadow prices.
    let objective = |x: &Vector| x.dot(x);
    let budget_line = vec![Constraint::equality(|x: &Vector| x[0] + x[1] - 1.0)];
    let constrained =
        solve(&objective, &Vector::from_slice(&[0.0, 1.0]), &budget_line, &SolverConfig::default())?;
    println!("[constrained]   {constrained}");
    println!(
        "  shadow price of the budget line: {:.4}",
        constrained.lagrange_multipliers.as_ref().unwrap()[0]
    );

    // 3. Binary knapsack via branch-and-bound.
    let value = |x: &Vector| -(350.0 * x[0] + 150.0 * x[1] + 180.0 * x[2]);
    let budget = vec![Constraint::inequality(|x: &Vector| {
        200.0 * x[0] + 100.0 * x[1] + 150.0 * x[2] - 250.0
    })];
    let picked = solve_integer(
        &value,
        &Vector::zeros(3),
        &budget,
        &IntegerProgramSpecification::binary(3),
        &SolverConfig::default(),
    )?;
    println!(
        "[knapsack]      take {:?} for value {} ({} nodes)",
        picked.solution.as_slice(),
        -picked.objective_value,
        picked.nodes_explored.unwrap_or(0)
    );

    // 4. Multi-start over a two-basin surface.
    let bumpy = |x: &Vector| {
        let v = x[0];
        0.05 * (v - 2.8).powi(2) * (v + 3.1).powi(2) + 0.4 * v
    };
    let config = SolverConfig { num_starts: 12, seed: 42, ..SolverConfig::default() };
    let swept = multi_start_in_region(&bumpy, &[(-6.0, 6.0)], Algorithm::Bfgs, &config)?;
    println!(
        "[multi-start]   best {:.4} at x = {:.4}, {}/{} starts converged",
        swept.objective_value,
        swept.solution[0],
        (swept.success_rate * config.num_starts as f64).round() as usize,
        config.num_starts
    );

    Ok(())
}
