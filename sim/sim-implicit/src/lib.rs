//! Composite sparse operator and parallel conjugate-gradient solver for
//! contact-aware implicit time stepping.
//!
//! One implicit step solves `H · dx = rhs`, where `H` is assembled from
//! several structurally distinct physical contributions. This crate keeps
//! the four contributions separate and presents them to the solver as one
//! logical linear map:
//!
//! | Part | Structure | Typical origin | Rebuilt |
//! |------|-----------|----------------|---------|
//! | `A`  | CSR, dynamic pattern | contact-pair coupling | every frame |
//! | `B`  | CSR, fixed pattern   | material stiffness over fixed topology | values only |
//! | `C`  | per-node 3×3 blocks  | barrier curvature `c · n·nᵀ` per contact | every frame |
//! | `D`  | scalar × identity    | mass/damping regularization | rarely |
//!
//! Splitting the matrix this way lets each subsystem author its own effect
//! and lets the caller skip re-deriving structural metadata for couplings
//! that never change, while the conjugate-gradient solver only ever sees
//! [`CompositeOperator::apply`].
//!
//! # Concurrency
//!
//! The operator apply is row-parallel (rows are independent), and the
//! solver's reductions are parallel tree sums, both over rayon with a
//! sequential fallback for small systems. The CG loop itself is sequential
//! across iterations; that one synchronization per iteration is inherent to
//! the method.
//!
//! # Example
//!
//! Single node held by a pure mass term, as in the smallest implicit step:
//!
//! ```
//! use nalgebra::DVector;
//! use sim_implicit::{
//!     solve, CompositeOperator, DynSparseMatrix, FixedSparseMatrix, SolverParams,
//! };
//!
//! let contact = DynSparseMatrix::empty(3);
//! let stiffness = FixedSparseMatrix::empty(3);
//! let op = CompositeOperator::new(&contact, &stiffness, &[], 2.0);
//!
//! let rhs = DVector::from_vec(vec![4.0, 0.0, 0.0]);
//! let mut dx = DVector::zeros(3);
//! let result = solve(&op, &rhs, &mut dx, &SolverParams::default());
//!
//! assert!(result.converged);
//! assert_eq!(result.iterations, 1);
//! assert!((dx[0] - 2.0).abs() < 1e-9);
//! ```
//!
//! # Layer 0 Crate
//!
//! Zero framework dependencies. Usable from headless training loops,
//! analysis tools, and other engines.

#![doc(html_root_url = "https://docs.rs/sim-implicit/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod cg;
mod error;
mod operator;
mod params;
mod sparse;

pub use cg::{solve, SolveResult};
pub use error::{SparseError, SparseResult};
pub use operator::CompositeOperator;
pub use params::SolverParams;
pub use sparse::{DynSparseMatrix, FixedSparseMatrix};
