//! Composite linear operator for the implicit step.
//!
//! The system matrix of one solve is the sum of four structurally different
//! contributions, kept separate so each subsystem can author its own physics
//! without the solver knowing about any of them:
//!
//! - a [`DynSparseMatrix`] rebuilt when contact topology changes,
//! - a [`FixedSparseMatrix`] whose pattern persists across frames,
//! - a block-diagonal sequence of per-node 3×3 matrices, typically
//!   curvature-weighted outer products of contact normals,
//! - a uniform scalar multiple of the identity that keeps the sum strictly
//!   positive-definite when the other parts are only semidefinite.
//!
//! [`CompositeOperator::apply`] evaluates the summed matrix-vector product
//! in one row-parallel pass; rows are independent, so the pass scales to
//! hundreds of thousands of degrees of freedom. The operator is symmetric
//! exactly when both sparse parts and every block are symmetric, which is
//! the caller's contract for the conjugate-gradient solver.

use nalgebra::{DVector, Matrix3};
use rayon::prelude::*;

use crate::sparse::{DynSparseMatrix, FixedSparseMatrix};

/// Problem size above which row loops and reductions run on rayon.
///
/// Below this, fork-join overhead outweighs the work per row.
pub(crate) const PARALLEL_CUTOVER: usize = 512;

/// The four-part system matrix, applied as one logical linear map.
///
/// Holds references only; all contributions stay owned by the caller and
/// are read-only for the lifetime of the operator.
#[derive(Debug, Clone, Copy)]
pub struct CompositeOperator<'a> {
    dynamic: &'a DynSparseMatrix,
    fixed: &'a FixedSparseMatrix,
    blocks: &'a [Matrix3<f64>],
    regularization: f64,
}

impl<'a> CompositeOperator<'a> {
    /// Combine the four contributions into one operator.
    ///
    /// `blocks` is either empty or holds one 3×3 block per node, with the
    /// vector dimension equal to three times the node count. Dimension
    /// agreement is debug-asserted only; in release builds mismatches are
    /// the caller's contract.
    #[must_use]
    pub fn new(
        dynamic: &'a DynSparseMatrix,
        fixed: &'a FixedSparseMatrix,
        blocks: &'a [Matrix3<f64>],
        regularization: f64,
    ) -> Self {
        debug_assert_eq!(dynamic.nrows(), dynamic.ncols());
        debug_assert_eq!(fixed.nrows(), fixed.ncols());
        debug_assert_eq!(dynamic.nrows(), fixed.nrows());
        debug_assert!(blocks.is_empty() || 3 * blocks.len() == dynamic.nrows());
        Self {
            dynamic,
            fixed,
            blocks,
            regularization,
        }
    }

    /// Vector dimension the operator acts on.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dynamic.nrows()
    }

    /// The scalar identity multiple.
    #[must_use]
    pub fn regularization(&self) -> f64 {
        self.regularization
    }

    /// Evaluate `out = (A + B + blockdiag(C) + D·I) · x`.
    ///
    /// Every output entry is written, including rows where neither sparse
    /// part stores an entry. No other state is touched.
    pub fn apply(&self, x: &DVector<f64>, out: &mut DVector<f64>) {
        let n = self.dim();
        debug_assert_eq!(x.len(), n);
        debug_assert_eq!(out.len(), n);

        let xs = x.as_slice();
        if n >= PARALLEL_CUTOVER {
            out.as_mut_slice()
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, o)| *o = self.row_value(xs, i));
        } else {
            for (i, o) in out.iter_mut().enumerate() {
                *o = self.row_value(xs, i);
            }
        }
    }

    /// [`apply`](Self::apply) into a freshly allocated vector.
    #[must_use]
    pub fn apply_alloc(&self, x: &DVector<f64>) -> DVector<f64> {
        let mut out = DVector::zeros(self.dim());
        self.apply(x, &mut out);
        out
    }

    fn row_value(&self, x: &[f64], i: usize) -> f64 {
        let mut sum = self.regularization * x[i];
        for csr in [self.dynamic.csr(), self.fixed.csr()] {
            let row = csr.row(i);
            for (&col, &val) in row.col_indices().iter().zip(row.values()) {
                sum += val * x[col];
            }
        }
        if !self.blocks.is_empty() {
            let node = i / 3;
            let base = 3 * node;
            let block = &self.blocks[node];
            let local = i - base;
            for c in 0..3 {
                sum += block[(local, c)] * x[base + c];
            }
        }
        sum
    }
}
