//! Scalar barrier penalties over a clearance value.
//!
//! These models apply when a constraint reduces to one signed scalar: the
//! clearance `gap` between two features, an activation width `margin`, and
//! an `offset` subtracted from the gap before evaluation (a rest length or
//! thickness). The penalty activates once the offset gap drops below
//! `margin` and is zero at or beyond it.
//!
//! Derivatives are taken with respect to `gap`. The caller turns the scalar
//! gradient and curvature into vectors and matrices by multiplying with the
//! constraint direction, exactly as with the half-space model's normal.
//!
//! Two shapes are provided:
//!
//! - [`quadratic`] — finite everywhere, constant curvature inside the
//!   margin. Cheap and robust when moderate violation is acceptable.
//! - [`logarithm`] — diverges as the gap approaches zero, so a feasible
//!   iterate can never cross to a negative gap. Use when violation must be
//!   excluded outright.

/// Quadratic one-sided penalty `(margin - g)²` inside the margin.
pub mod quadratic {
    /// Penalty energy at clearance `gap`.
    #[must_use]
    pub fn energy(gap: f64, margin: f64, offset: f64) -> f64 {
        let y = margin - (gap - offset);
        if y > 0.0 {
            y * y
        } else {
            0.0
        }
    }

    /// Derivative of [`energy`] with respect to `gap`.
    #[must_use]
    pub fn gradient(gap: f64, margin: f64, offset: f64) -> f64 {
        let y = margin - (gap - offset);
        if y > 0.0 {
            -2.0 * y
        } else {
            0.0
        }
    }

    /// Second derivative of [`energy`] with respect to `gap`.
    #[must_use]
    pub fn curvature(gap: f64, margin: f64, offset: f64) -> f64 {
        if margin - (gap - offset) > 0.0 {
            2.0
        } else {
            0.0
        }
    }
}

/// Logarithmic one-sided penalty `-(g - margin)²·ln(g/margin)`, divergent
/// at zero gap.
pub mod logarithm {
    /// Penalty energy at clearance `gap`.
    ///
    /// Infinite for a non-positive offset gap: the iterate is outside the
    /// feasible region and no finite energy applies.
    #[must_use]
    pub fn energy(gap: f64, margin: f64, offset: f64) -> f64 {
        let g = gap - offset;
        if g <= 0.0 {
            f64::INFINITY
        } else if g >= margin {
            0.0
        } else {
            -(g - margin) * (g - margin) * (g / margin).ln()
        }
    }

    /// Derivative of [`energy`] with respect to `gap`.
    #[must_use]
    pub fn gradient(gap: f64, margin: f64, offset: f64) -> f64 {
        let g = gap - offset;
        if g <= 0.0 {
            f64::NEG_INFINITY
        } else if g >= margin {
            0.0
        } else {
            (margin - g) * (2.0 * g * (g / margin).ln() + g - margin) / g
        }
    }

    /// Second derivative of [`energy`] with respect to `gap`.
    #[must_use]
    pub fn curvature(gap: f64, margin: f64, offset: f64) -> f64 {
        let g = gap - offset;
        if g <= 0.0 {
            f64::INFINITY
        } else if g >= margin {
            0.0
        } else {
            -2.0 * (g / margin).ln() + margin * (margin + 2.0 * g) / (g * g) - 3.0
        }
    }
}
