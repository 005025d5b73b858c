//! Solver configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Convergence controls for the conjugate-gradient solve.
///
/// The tolerance is absolute, on the ℓ² norm of the residual `b - A·x`.
/// Callers wanting a relative criterion scale it by `‖b‖` before the call.
/// The iteration cap doubles as the only cancellation channel: a caller
/// wanting wall-clock bounds splits the budget across repeated calls.
///
/// # Example
///
/// ```
/// use sim_implicit::SolverParams;
///
/// let params = SolverParams::default()
///     .with_tolerance(1e-8)
///     .with_max_iterations(500);
/// assert_eq!(params.max_iterations, 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverParams {
    /// Absolute residual-norm threshold for convergence.
    pub tolerance: f64,

    /// Iteration budget; the solve reports non-convergence past it.
    pub max_iterations: usize,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

impl SolverParams {
    /// Set the residual tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration budget.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let params = SolverParams::default();
        assert!(params.tolerance > 0.0);
        assert!(params.max_iterations > 0);
    }
}
