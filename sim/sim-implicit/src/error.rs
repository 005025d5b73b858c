//! Error types for sparse container construction and mutation.
//!
//! Only structural mistakes are checked: writing where the fixed pattern
//! has no entry, or addressing outside the matrix. Numerical preconditions
//! (symmetry, positive-definiteness, matching dimensions at solve time) are
//! the caller's contract and are not validated at runtime.

use thiserror::Error;

/// Errors from sparse container operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SparseError {
    /// The fixed sparsity pattern has no entry at this position.
    #[error("no entry at ({row}, {col}) in the fixed sparsity pattern")]
    EntryOutsidePattern {
        /// Row of the rejected write.
        row: usize,
        /// Column of the rejected write.
        col: usize,
    },

    /// The position lies outside the matrix.
    #[error("position ({row}, {col}) out of bounds for a {nrows}x{ncols} matrix")]
    OutOfBounds {
        /// Row of the rejected access.
        row: usize,
        /// Column of the rejected access.
        col: usize,
        /// Number of matrix rows.
        nrows: usize,
        /// Number of matrix columns.
        ncols: usize,
    },
}

/// Result type for sparse container operations.
pub type SparseResult<T> = std::result::Result<T, SparseError>;
