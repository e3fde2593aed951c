//! Branch-and-bound (integer constraints)
//!
//! Exact search for integer-constrained problems: solve the continuous
//! relaxation of a node, branch a fractional specified coordinate into
//! `x_i <= floor(v)` / `x_i >= ceil(v)` children, keep the best
//! integer-feasible objective as the incumbent bound, and prune any node
//! whose relaxed bound cannot beat it.
//!
//! The tree is an explicit LIFO stack of node descriptors (box bounds plus
//! depth) rather than a pointer-linked structure: depth-first order finds
//! incumbents early, ownership stays trivial, and concurrent exploration
//! remains a possible later hardening (the incumbent would then need
//! atomic/locked updates).

use crate::config::SolverConfig;
use crate::penalty_barrier;
use adopt_core::{
    Algorithm, Constraint, Error, ObjectiveFunction, OptimizationResult, Result, Vector,
};

/// Coordinates closer to an integer than this are treated as integral.
const INTEGRALITY_TOL: f64 = 1e-4;
/// Default box for integer variables when the problem is not binary.
const DEFAULT_BOUND: f64 = 1e4;

/// Which variables must come out integral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerProgramSpecification {
    indices: Vec<usize>,
    binary: bool,
}

impl IntegerProgramSpecification {
    /// Mixed-integer: only the given variable indices must be integral.
    pub fn mixed(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self { indices, binary: false }
    }

    /// Pure integer program over `n` variables.
    pub fn pure(n: usize) -> Self {
        Self { indices: (0..n).collect(), binary: false }
    }

    /// 0/1 program over `n` variables: integral with `0 <= x_i <= 1`.
    pub fn binary(n: usize) -> Self {
        Self { indices: (0..n).collect(), binary: true }
    }

    /// The variable indices required to be integral.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Whether the 0/1 special case applies.
    pub fn is_binary(&self) -> bool {
        self.binary
    }
}

/// One subproblem: box bounds over the integer variables.
#[derive(Debug, Clone)]
struct Node {
    lower: Vec<f64>,
    upper: Vec<f64>,
    depth: usize,
}

/// Minimize `obj` subject to `constraints` with the integrality
/// requirements in `spec`.
pub fn minimize(
    obj: &dyn ObjectiveFunction,
    x0: &Vector,
    constraints: &[Constraint],
    spec: &IntegerProgramSpecification,
    config: &SolverConfig,
) -> Result<OptimizationResult> {
    config.validate()?;
    let n = x0.dim();
    if let Some(&out_of_range) = spec.indices().iter().find(|&&i| i >= n) {
        return Err(Error::InvalidConfiguration(format!(
            "integer index {out_of_range} out of range for dimension {n}"
        )));
    }
    if spec.indices().is_empty() {
        return Err(Error::InvalidConfiguration(
            "integer program specification names no variables".into(),
        ));
    }
    let deadline = config.solve_deadline();

    let bound = if spec.is_binary() { (0.0, 1.0) } else { (-DEFAULT_BOUND, DEFAULT_BOUND) };
    let root = Node { lower: vec![bound.0; n], upper: vec![bound.1; n], depth: 0 };

    let mut stack = vec![root];
    let mut incumbent: Option<(Vector, f64)> = None;
    let mut nodes_explored = 0usize;
    let mut limit_hit = false;

    while let Some(node) = stack.pop() {
        if nodes_explored >= config.max_nodes || config.interrupted(deadline) {
            limit_hit = true;
            break;
        }
        nodes_explored += 1;

        // Continuous relaxation over this node's box.
        let relaxed = match solve_relaxation(obj, x0, constraints, spec, &node, config, deadline) {
            Ok(r) => r,
            // An infeasible box is a pruned subtree, not a failed solve.
            Err(Error::InfeasibleProblem { .. }) => continue,
            Err(other) => return Err(other),
        };

        // Bound: this subtree cannot beat the incumbent. An unconverged
        // relaxation is not a trustworthy bound, so it never prunes.
        if let Some((_, best)) = &incumbent {
            if relaxed.converged && relaxed.objective_value >= best - config.tolerance {
                continue;
            }
        }

        match most_fractional(&relaxed.solution, spec) {
            None => {
                // Integer-feasible candidate: snap and re-check.
                let snapped = snap_integers(&relaxed.solution, spec);
                let feasible = constraints
                    .iter()
                    .all(|c| c.is_satisfied(&snapped, INTEGRALITY_TOL.max(config.tolerance * 100.0)));
                if !feasible {
                    continue;
                }
                let value = obj.eval(&snapped)?;
                if incumbent.as_ref().is_none_or(|(_, best)| value < *best) {
                    log::debug!(
                        "branch-and-bound: new incumbent {value:.6} at node {nodes_explored} \
                         (depth {})",
                        node.depth
                    );
                    incumbent = Some((snapped, value));
                }
            }
            Some((branch_idx, v)) => {
                let mut below = node.clone();
                below.upper[branch_idx] = v.floor();
                below.depth += 1;
                if below.lower[branch_idx] <= below.upper[branch_idx] {
                    stack.push(below);
                }

                let mut above = node;
                above.lower[branch_idx] = v.ceil();
                above.depth += 1;
                if above.lower[branch_idx] <= above.upper[branch_idx] {
                    stack.push(above);
                }
            }
        }
    }

    match incumbent {
        Some((solution, value)) => {
            // Exhausted tree = proven optimal; limits leave a feasible
            // best-so-far.
            let converged = !limit_hit || stack.is_empty();
            Ok(OptimizationResult::new(
                solution,
                value,
                nodes_explored,
                converged,
                Algorithm::BranchAndBound,
            )
            .with_nodes_explored(nodes_explored))
        }
        None if limit_hit => Err(Error::InfeasibleProblem {
            reason: format!(
                "search limit reached after {nodes_explored} nodes with no integer-feasible \
                 point found"
            ),
            violated_constraints: Vec::new(),
        }),
        None => Err(Error::InfeasibleProblem {
            reason: format!(
                "tree exhausted after {nodes_explored} nodes: no integer-feasible point exists"
            ),
            violated_constraints: Vec::new(),
        }),
    }
}

/// Solve the continuous relaxation of `node` (user constraints plus the
/// node's box bounds on the integer variables).
fn solve_relaxation(
    obj: &dyn ObjectiveFunction,
    x0: &Vector,
    constraints: &[Constraint],
    spec: &IntegerProgramSpecification,
    node: &Node,
    config: &SolverConfig,
    deadline: Option<std::time::Instant>,
) -> Result<OptimizationResult> {
    let mut relaxed_constraints: Vec<Constraint> =
        Vec::with_capacity(constraints.len() + 2 * spec.indices().len());
    // Cheap clones: the constraint functions are shared, the originals stay
    // caller-owned.
    relaxed_constraints.extend(constraints.iter().cloned());
    for &i in spec.indices() {
        let (lo, hi) = (node.lower[i], node.upper[i]);
        relaxed_constraints.push(Constraint::inequality(move |x: &Vector| lo - x[i]));
        relaxed_constraints.push(Constraint::inequality(move |x: &Vector| x[i] - hi));
    }

    // Start from the box-clamped initial guess so every node's inner solve
    // begins near its own feasible region.
    let mut start = x0.clone();
    for &i in spec.indices() {
        start[i] = start[i].clamp(node.lower[i], node.upper[i]);
    }

    // One absolute deadline shared by every node's inner solve.
    let relax_config = SolverConfig { deadline, time_limit: None, ..config.clone() };
    penalty_barrier::minimize(obj, &start, &relaxed_constraints, &relax_config)
}

/// The specified coordinate farthest from an integer, if any.
fn most_fractional(x: &Vector, spec: &IntegerProgramSpecification) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64, f64)> = None;
    for &i in spec.indices() {
        let v = x[i];
        let frac = (v - v.round()).abs();
        if frac > INTEGRALITY_TOL && best.as_ref().is_none_or(|(_, _, f)| frac > *f) {
            best = Some((i, v, frac));
        }
    }
    best.map(|(i, v, _)| (i, v))
}

/// Round the specified coordinates to their nearest integers.
fn snap_integers(x: &Vector, spec: &IntegerProgramSpecification) -> Vector {
    let mut snapped = x.clone();
    for &i in spec.indices() {
        snapped[i] = snapped[i].round();
    }
    snapped
}
