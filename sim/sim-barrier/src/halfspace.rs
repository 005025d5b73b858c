//! Cubic barrier between a point and an oriented half-space.
//!
//! The admissible region is the side of the plane the unit normal points
//! into. With `d = (x - y) · n` the signed distance of the point `x` from
//! the plane through `y`, the barrier is
//!
//! ```text
//! E(d) = -d³ / (3·eps)   for d < 0
//!        0               for d ≥ 0
//! ```
//!
//! so energy, gradient, and curvature all vanish at `d = 0`. The width
//! parameter `eps > 0` sets the stiffness scale: a larger `eps` gives a
//! softer penalty.
//!
//! The caller owns the contact pair list. For each active pair it
//! accumulates [`gradient`] into the right-hand side and [`hessian`] into
//! the per-node block-diagonal term of the system matrix before solving.
//!
//! All functions are total for `eps > 0`; behavior for `eps ≤ 0` is the
//! caller's contract.

use nalgebra::{Matrix3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Barrier energy for a point `x` against the plane through `y` with unit
/// outward normal `normal`.
///
/// Returns `-d³/(3·eps)` while penetrating (`d < 0`), zero otherwise.
#[must_use]
pub fn energy(x: &Vector3<f64>, y: &Vector3<f64>, normal: &Vector3<f64>, eps: f64) -> f64 {
    let d = (x - y).dot(normal);
    if d < 0.0 {
        -d * d * d / (3.0 * eps)
    } else {
        0.0
    }
}

/// First derivative of [`energy`] with respect to `x`.
///
/// Points against the normal while penetrating: `-(d²/eps)·n` for `d < 0`,
/// the zero vector otherwise.
#[must_use]
pub fn gradient(
    x: &Vector3<f64>,
    y: &Vector3<f64>,
    normal: &Vector3<f64>,
    eps: f64,
) -> Vector3<f64> {
    let d = (x - y).dot(normal);
    if d < 0.0 {
        normal * (-(d * d) / eps)
    } else {
        Vector3::zeros()
    }
}

/// Scalar second derivative of the energy along the normal direction.
///
/// `-2d/eps` while penetrating, zero otherwise; non-negative whenever
/// active because `d < 0`.
#[must_use]
pub fn curvature(x: &Vector3<f64>, y: &Vector3<f64>, normal: &Vector3<f64>, eps: f64) -> f64 {
    let d = (x - y).dot(normal);
    if d < 0.0 {
        -2.0 * d / eps
    } else {
        0.0
    }
}

/// Rank-one Hessian `curvature · n·nᵀ` of the barrier at `x`.
///
/// Positive-semidefinite whenever the barrier is active, zero otherwise,
/// which keeps the assembled block-diagonal contribution well-behaved as
/// contacts switch on and off between solves.
#[must_use]
pub fn hessian(
    x: &Vector3<f64>,
    y: &Vector3<f64>,
    normal: &Vector3<f64>,
    eps: f64,
) -> Matrix3<f64> {
    curvature(x, y, normal, eps) * normal * normal.transpose()
}

/// An oriented contact plane, for callers that keep the geometry around
/// between frames.
///
/// `normal` must be unit length and point out of the surface, into the
/// admissible region.
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use sim_barrier::HalfSpace;
///
/// let floor = HalfSpace::new(Vector3::zeros(), Vector3::z());
/// let x = Vector3::new(0.2, 0.1, -0.02);
/// assert!(floor.energy(&x, 0.05) > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HalfSpace {
    /// A reference point on the contact surface.
    pub origin: Vector3<f64>,
    /// Unit outward normal at the surface.
    pub normal: Vector3<f64>,
}

impl HalfSpace {
    /// Create a half-space from a surface point and unit outward normal.
    #[must_use]
    pub fn new(origin: Vector3<f64>, normal: Vector3<f64>) -> Self {
        Self { origin, normal }
    }

    /// Barrier energy of `x` against this plane. See [`energy`].
    #[must_use]
    pub fn energy(&self, x: &Vector3<f64>, eps: f64) -> f64 {
        energy(x, &self.origin, &self.normal, eps)
    }

    /// Barrier gradient at `x`. See [`gradient`].
    #[must_use]
    pub fn gradient(&self, x: &Vector3<f64>, eps: f64) -> Vector3<f64> {
        gradient(x, &self.origin, &self.normal, eps)
    }

    /// Barrier curvature at `x`. See [`curvature`].
    #[must_use]
    pub fn curvature(&self, x: &Vector3<f64>, eps: f64) -> f64 {
        curvature(x, &self.origin, &self.normal, eps)
    }

    /// Barrier Hessian at `x`. See [`hessian`].
    #[must_use]
    pub fn hessian(&self, x: &Vector3<f64>, eps: f64) -> Matrix3<f64> {
        hessian(x, &self.origin, &self.normal, eps)
    }
}
