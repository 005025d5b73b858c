//! Sparse matrix containers for the implicit solve.
//!
//! The system matrix carries two compressed-row contributions with very
//! different lifetimes, so they get separate containers:
//!
//! - [`DynSparseMatrix`] — the pattern changes whenever contact topology
//!   changes, typically every frame. It is rebuilt wholesale from a triplet
//!   list; no structural metadata survives across builds.
//! - [`FixedSparseMatrix`] — the pattern follows persistent coupling
//!   (material stiffness over a fixed discretization) and is established
//!   once. Only values change between solves, through checked writes, so
//!   the caller never pays pattern re-derivation per frame.
//!
//! Both store scalar entries in CSR form (row offsets, column indices,
//! values) and present the same algebraic row contract to the composite
//! operator. Rows without stored entries contribute implicit zeros.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix, SparseEntryMut};

use crate::error::{SparseError, SparseResult};

/// Entries smaller than this are dropped during triplet assembly.
const ENTRY_DROP_TOL: f64 = 1e-15;

/// A CSR matrix whose sparsity pattern is rebuilt from scratch each frame.
///
/// Duplicate triplets are summed, and near-zero values are dropped so the
/// stored pattern reflects actual coupling.
#[derive(Debug, Clone)]
pub struct DynSparseMatrix {
    matrix: CsrMatrix<f64>,
}

impl DynSparseMatrix {
    /// Build from `(row, col, value)` triplets.
    ///
    /// # Panics
    ///
    /// Panics if a triplet lies outside `nrows` × `ncols`.
    #[must_use]
    pub fn from_triplets(nrows: usize, ncols: usize, triplets: &[(usize, usize, f64)]) -> Self {
        let mut coo = CooMatrix::new(nrows, ncols);
        for &(row, col, val) in triplets {
            if val.abs() > ENTRY_DROP_TOL {
                coo.push(row, col, val);
            }
        }
        Self {
            matrix: CsrMatrix::from(&coo),
        }
    }

    /// A square matrix with no stored entries.
    #[must_use]
    pub fn empty(n: usize) -> Self {
        Self {
            matrix: CsrMatrix::zeros(n, n),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of columns.
    #[must_use]
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// The underlying CSR storage.
    #[must_use]
    pub fn csr(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    /// Matrix-vector product `self * v`.
    #[must_use]
    pub fn mul_vec(&self, v: &DVector<f64>) -> DVector<f64> {
        csr_mul_vec(&self.matrix, v)
    }

    /// Dense copy, for tests and small systems.
    #[must_use]
    pub fn to_dense(&self) -> DMatrix<f64> {
        csr_to_dense(&self.matrix)
    }
}

/// A CSR matrix whose sparsity pattern is fixed at construction.
///
/// Values are written through [`set`](Self::set) and [`add`](Self::add),
/// which reject positions outside the pattern; [`clear`](Self::clear)
/// resets all values to zero while keeping the structure, ready for the
/// next assembly pass.
#[derive(Debug, Clone)]
pub struct FixedSparseMatrix {
    matrix: CsrMatrix<f64>,
}

impl FixedSparseMatrix {
    /// Build a zero-valued matrix with the given `(row, col)` pattern.
    ///
    /// Duplicate positions collapse to a single entry.
    ///
    /// # Panics
    ///
    /// Panics if a pattern position lies outside `nrows` × `ncols`.
    #[must_use]
    pub fn with_pattern(nrows: usize, ncols: usize, pattern: &[(usize, usize)]) -> Self {
        let mut coo = CooMatrix::new(nrows, ncols);
        for &(row, col) in pattern {
            coo.push(row, col, 0.0);
        }
        Self {
            matrix: CsrMatrix::from(&coo),
        }
    }

    /// A square matrix with an empty pattern.
    #[must_use]
    pub fn empty(n: usize) -> Self {
        Self {
            matrix: CsrMatrix::zeros(n, n),
        }
    }

    /// Overwrite the value at `(row, col)`.
    ///
    /// # Errors
    ///
    /// [`SparseError::OutOfBounds`] outside the matrix,
    /// [`SparseError::EntryOutsidePattern`] where the pattern has no entry.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> SparseResult<()> {
        *self.entry_mut(row, col)? = value;
        Ok(())
    }

    /// Accumulate into the value at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn add(&mut self, row: usize, col: usize, value: f64) -> SparseResult<()> {
        *self.entry_mut(row, col)? += value;
        Ok(())
    }

    /// Reset all values to zero, keeping the pattern.
    pub fn clear(&mut self) {
        for v in self.matrix.values_mut() {
            *v = 0.0;
        }
    }

    /// Whether the pattern has an entry at `(row, col)`.
    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.matrix.nrows()
            && col < self.matrix.ncols()
            && self
                .matrix
                .get_row(row)
                .is_some_and(|r| r.col_indices().binary_search(&col).is_ok())
    }

    /// Number of rows.
    #[must_use]
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of columns.
    #[must_use]
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Number of pattern entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// The underlying CSR storage.
    #[must_use]
    pub fn csr(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    /// Matrix-vector product `self * v`.
    #[must_use]
    pub fn mul_vec(&self, v: &DVector<f64>) -> DVector<f64> {
        csr_mul_vec(&self.matrix, v)
    }

    /// Dense copy, for tests and small systems.
    #[must_use]
    pub fn to_dense(&self) -> DMatrix<f64> {
        csr_to_dense(&self.matrix)
    }

    fn entry_mut(&mut self, row: usize, col: usize) -> SparseResult<&mut f64> {
        let (nrows, ncols) = (self.matrix.nrows(), self.matrix.ncols());
        if row >= nrows || col >= ncols {
            return Err(SparseError::OutOfBounds {
                row,
                col,
                nrows,
                ncols,
            });
        }
        match self.matrix.get_entry_mut(row, col) {
            Some(SparseEntryMut::NonZero(value)) => Ok(value),
            _ => Err(SparseError::EntryOutsidePattern { row, col }),
        }
    }
}

fn csr_mul_vec(matrix: &CsrMatrix<f64>, v: &DVector<f64>) -> DVector<f64> {
    let mut result = DVector::zeros(matrix.nrows());
    for (row_idx, row) in matrix.row_iter().enumerate() {
        let mut sum = 0.0;
        for (&col_idx, &val) in row.col_indices().iter().zip(row.values()) {
            sum += val * v[col_idx];
        }
        result[row_idx] = sum;
    }
    result
}

fn csr_to_dense(matrix: &CsrMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(matrix.nrows(), matrix.ncols());
    for (row_idx, row) in matrix.row_iter().enumerate() {
        for (&col_idx, &val) in row.col_indices().iter().zip(row.values()) {
            dense[(row_idx, col_idx)] = val;
        }
    }
    dense
}
