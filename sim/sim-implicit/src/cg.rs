//! Preconditioner-free conjugate gradient over the composite operator.
//!
//! The operator is symmetric positive-definite by caller contract, so plain
//! CG applies: one operator evaluation per iteration, two scalar reductions
//! (`α` and `β`), and three vector updates. Everything inside an iteration
//! is data-parallel; the loop itself is strictly sequential because `α` and
//! `β` must be fully materialized before the next evaluation can start.
//! Rayon's fork-join supplies that synchronization point.
//!
//! Failure is never an error here. Running out of iterations and losing
//! curvature in the search direction both return a [`SolveResult`] with
//! `converged == false` and honest diagnostics; the caller decides whether
//! to accept the partial solution, loosen the tolerance, or escalate.

use nalgebra::DVector;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::operator::{CompositeOperator, PARALLEL_CUTOVER};
use crate::params::SolverParams;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Curvature floor for `pᵀ·A·p`. At or below this the direction carries no
/// usable curvature and the iteration stops rather than dividing by it.
const MIN_CURVATURE: f64 = 1e-15;

/// Outcome of one conjugate-gradient solve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveResult {
    /// Whether the residual norm reached the tolerance.
    pub converged: bool,
    /// Iterations actually executed.
    pub iterations: usize,
    /// Final residual norm `‖b - A·x‖`.
    pub residual: f64,
}

/// Solve `op · x = b`, refining `x` in place from its current value.
///
/// `x` doubles as initial guess and solution estimate; a warm start from
/// the previous frame usually saves iterations. The estimate is left at
/// its latest value even when the solve reports non-convergence, so a
/// partial result is always available.
///
/// Dimensions of `op`, `b`, and `x` must agree (caller contract,
/// debug-asserted only).
pub fn solve(
    op: &CompositeOperator<'_>,
    b: &DVector<f64>,
    x: &mut DVector<f64>,
    params: &SolverParams,
) -> SolveResult {
    let n = op.dim();
    debug_assert_eq!(b.len(), n);
    debug_assert_eq!(x.len(), n);

    let mut q = DVector::zeros(n);
    op.apply(x, &mut q);
    let mut r = b.clone();
    axpy(-1.0, &q, &mut r);
    let mut p = r.clone();

    let mut rr = dot(&r, &r);
    let mut residual = rr.sqrt();
    if residual <= params.tolerance {
        debug!(residual, "initial guess already within tolerance");
        return SolveResult {
            converged: true,
            iterations: 0,
            residual,
        };
    }

    for iteration in 0..params.max_iterations {
        op.apply(&p, &mut q);
        let pq = dot(&p, &q);
        if pq <= MIN_CURVATURE {
            // Degenerate direction: stop where we are instead of blowing
            // up the step. Reported like non-convergence, not a crash.
            let converged = residual <= params.tolerance;
            warn!(iteration, pq, residual, "search direction lost curvature");
            return SolveResult {
                converged,
                iterations: iteration,
                residual,
            };
        }

        let alpha = rr / pq;
        axpy(alpha, &p, x);
        axpy(-alpha, &q, &mut r);

        let rr_next = dot(&r, &r);
        residual = rr_next.sqrt();
        if residual <= params.tolerance {
            debug!(iterations = iteration + 1, residual, "converged");
            return SolveResult {
                converged: true,
                iterations: iteration + 1,
                residual,
            };
        }

        let beta = rr_next / rr;
        xpby(&r, beta, &mut p);
        rr = rr_next;
    }

    warn!(
        iterations = params.max_iterations,
        residual, "iteration budget exhausted"
    );
    SolveResult {
        converged: false,
        iterations: params.max_iterations,
        residual,
    }
}

/// Parallel tree-reduced inner product.
fn dot(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    let (a, b) = (a.as_slice(), b.as_slice());
    if a.len() >= PARALLEL_CUTOVER {
        a.par_iter().zip(b.par_iter()).map(|(x, y)| x * y).sum()
    } else {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }
}

/// `y += alpha · x`, element-parallel.
fn axpy(alpha: f64, x: &DVector<f64>, y: &mut DVector<f64>) {
    let x = x.as_slice();
    if x.len() >= PARALLEL_CUTOVER {
        y.as_mut_slice()
            .par_iter_mut()
            .zip(x.par_iter())
            .for_each(|(y, x)| *y += alpha * x);
    } else {
        for (y, x) in y.as_mut_slice().iter_mut().zip(x) {
            *y += alpha * x;
        }
    }
}

/// `p ← r + beta · p`, element-parallel.
fn xpby(r: &DVector<f64>, beta: f64, p: &mut DVector<f64>) {
    let r = r.as_slice();
    if r.len() >= PARALLEL_CUTOVER {
        p.as_mut_slice()
            .par_iter_mut()
            .zip(r.par_iter())
            .for_each(|(p, r)| *p = r + beta * *p);
    } else {
        for (p, r) in p.as_mut_slice().iter_mut().zip(r) {
            *p = r + beta * *p;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::sparse::{DynSparseMatrix, FixedSparseMatrix};
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_diagonal_converges_in_one_iteration() {
        // Single node, identity-scale operator: 2·x = [4, 0, 0].
        let dynamic = DynSparseMatrix::empty(3);
        let fixed = FixedSparseMatrix::empty(3);
        let op = CompositeOperator::new(&dynamic, &fixed, &[], 2.0);

        let b = DVector::from_vec(vec![4.0, 0.0, 0.0]);
        let mut x = DVector::zeros(3);
        let params = SolverParams::default()
            .with_tolerance(1e-6)
            .with_max_iterations(10);

        let result = solve(&op, &b, &mut x, &params);

        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        assert!(result.residual <= params.tolerance);
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(x[2], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_distinct_diagonal_converges_within_dimension() {
        // CG is exact in at most n iterations for an n-dimensional SPD
        // system; a diagonal with three distinct entries needs all three.
        let dynamic =
            DynSparseMatrix::from_triplets(3, 3, &[(0, 0, 1.0), (1, 1, 2.0), (2, 2, 4.0)]);
        let fixed = FixedSparseMatrix::empty(3);
        let op = CompositeOperator::new(&dynamic, &fixed, &[], 0.0);

        let b = DVector::from_vec(vec![1.0, 4.0, 12.0]);
        let mut x = DVector::zeros(3);
        let params = SolverParams::default().with_tolerance(1e-10);

        let result = solve(&op, &b, &mut x, &params);

        assert!(result.converged);
        assert!(result.iterations <= 3);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-8);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-8);
        assert_relative_eq!(x[2], 3.0, epsilon = 1e-8);
    }

    #[test]
    fn test_exact_initial_guess_takes_no_iterations() {
        let dynamic = DynSparseMatrix::empty(3);
        let fixed = FixedSparseMatrix::empty(3);
        let op = CompositeOperator::new(&dynamic, &fixed, &[], 3.0);

        let b = DVector::from_vec(vec![3.0, 6.0, 9.0]);
        let mut x = DVector::from_vec(vec![1.0, 2.0, 3.0]);

        let result = solve(&op, &b, &mut x, &SolverParams::default());

        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert_eq!(x, DVector::from_vec(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_budget_exhaustion_is_reported_not_fatal() {
        // A coupled system cannot meet an unreachable tolerance in one
        // iteration; the solve must say so and still leave a usable x.
        let dynamic = DynSparseMatrix::from_triplets(
            3,
            3,
            &[(0, 0, 2.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 2.0), (2, 2, 1.0)],
        );
        let fixed = FixedSparseMatrix::empty(3);
        let op = CompositeOperator::new(&dynamic, &fixed, &[], 0.5);

        let b = DVector::from_vec(vec![1.0, 1.0, 1.0]);
        let mut x = DVector::zeros(3);
        let params = SolverParams::default()
            .with_tolerance(1e-30)
            .with_max_iterations(1);

        let result = solve(&op, &b, &mut x, &params);

        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        assert!(result.residual.is_finite());
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_curvature_breakdown_stops_early() {
        // The zero operator gives pᵀ·A·p = 0 on the first direction. That
        // is a breakdown, reported through the flag without NaN or panic.
        let dynamic = DynSparseMatrix::empty(3);
        let fixed = FixedSparseMatrix::empty(3);
        let op = CompositeOperator::new(&dynamic, &fixed, &[], 0.0);

        let b = DVector::from_vec(vec![1.0, 0.0, 0.0]);
        let mut x = DVector::zeros(3);
        let params = SolverParams::default().with_max_iterations(50);

        let result = solve(&op, &b, &mut x, &params);

        assert!(!result.converged);
        assert_eq!(result.iterations, 0);
        assert!(result.residual.is_finite());
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_block_diagonal_system() {
        // Two nodes with SPD blocks plus regularization; verify against
        // the residual definition rather than a hand-computed solution.
        let dynamic = DynSparseMatrix::empty(6);
        let fixed = FixedSparseMatrix::empty(6);
        let blocks = vec![
            nalgebra::Matrix3::new(2.0, 0.5, 0.0, 0.5, 2.0, 0.0, 0.0, 0.0, 1.0),
            nalgebra::Matrix3::identity() * 3.0,
        ];
        let op = CompositeOperator::new(&dynamic, &fixed, &blocks, 0.25);

        let b = DVector::from_vec(vec![1.0, -2.0, 0.5, 3.0, 0.0, -1.0]);
        let mut x = DVector::zeros(6);
        let params = SolverParams::default().with_tolerance(1e-10);

        let result = solve(&op, &b, &mut x, &params);
        assert!(result.converged);

        let residual = (b - op.apply_alloc(&x)).norm();
        assert!(residual <= 1e-9);
    }

    #[test]
    fn test_large_system_takes_parallel_path() {
        // Past the cutover the operator apply, reductions, and vector
        // updates all run on rayon; result must match the sequential math.
        let n = 3 * PARALLEL_CUTOVER;
        let dynamic = DynSparseMatrix::empty(n);
        let fixed = FixedSparseMatrix::empty(n);
        let op = CompositeOperator::new(&dynamic, &fixed, &[], 4.0);

        let b = DVector::from_fn(n, |i, _| (i % 7) as f64 - 3.0);
        let mut x = DVector::zeros(n);
        let params = SolverParams::default().with_tolerance(1e-10);

        let result = solve(&op, &b, &mut x, &params);

        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        for i in 0..n {
            assert_relative_eq!(x[i], b[i] / 4.0, epsilon = 1e-12);
        }
    }
}
