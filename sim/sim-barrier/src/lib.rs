//! Smooth one-sided barrier potentials for contact-aware simulation.
//!
//! This crate provides the energy models used to softly enforce
//! non-penetration during an implicit time step. A barrier potential is zero
//! for any admissible configuration and rises steeply as the forbidden
//! region is entered, so the penalty only acts where it is needed and the
//! step stays differentiable as contacts switch on and off.
//!
//! # Why C¹ continuity matters
//!
//! The implicit step linearizes the total energy around the current state
//! and feeds the barrier's curvature into the system matrix. If value,
//! gradient, or curvature jumped at the activation boundary, the assembled
//! operator would change discontinuously between solves and a Newton-type
//! iteration would stall or oscillate. Every model here vanishes together
//! with its first derivative at activation.
//!
//! # Models
//!
//! - [`halfspace`] — cubic barrier between a point and an oriented plane,
//!   with exact analytic gradient, scalar curvature, and rank-one Hessian.
//!   This is the model that feeds the implicit solver's block-diagonal
//!   contribution.
//! - [`gap`] — scalar penalties over a clearance value (quadratic and
//!   logarithmic), for constraints that reduce to a single signed gap.
//!
//! # Example
//!
//! ```
//! use nalgebra::Vector3;
//! use sim_barrier::halfspace;
//!
//! let floor = Vector3::zeros();
//! let up = Vector3::z();
//! let eps = 0.05;
//!
//! // A point 1 cm below the floor is penetrating: the barrier pushes back
//! // along the normal.
//! let x = Vector3::new(0.0, 0.0, -0.01);
//! assert!(halfspace::energy(&x, &floor, &up, eps) > 0.0);
//! assert!(halfspace::gradient(&x, &floor, &up, eps).z < 0.0);
//!
//! // A point above the floor feels nothing.
//! let x = Vector3::new(0.0, 0.0, 0.01);
//! assert_eq!(halfspace::energy(&x, &floor, &up, eps), 0.0);
//! ```
//!
//! # Layer 0 Crate
//!
//! Zero framework dependencies; pure functions over `nalgebra` value types.
//! Usable from headless training loops, analysis tools, and other engines.

#![doc(html_root_url = "https://docs.rs/sim-barrier/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

pub mod gap;
pub mod halfspace;

pub use halfspace::HalfSpace;
