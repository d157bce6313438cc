//! Shared trait, error and statistics types for the stiff solver.

use nalgebra::DVector;
use std::fmt;
use thiserror::Error;

/// Trait implemented by the user-supplied ODE right-hand-side.
pub trait OdeSystem {
    /// Evaluate `dy = f(t, y)` into the preallocated output vector.
    fn rhs(&self, t: f64, y: &DVector<f64>, dy: &mut DVector<f64>);
}

/// Errors that may arise during integration. Whether an error is fatal is the
/// caller's decision: a failed cost evaluation is recovered with a sentinel
/// penalty, a failed plant advance aborts the run.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("stopped at t = {t}: needs more than {n_step} steps")]
    MaxNumStepReached { t: f64, n_step: u32 },
    #[error("stopped at t = {t}: step size underflow")]
    StepSizeUnderflow { t: f64 },
    #[error("stopped at t = {t}: iteration matrix is singular")]
    SingularIterationMatrix { t: f64 },
}

/// Statistics of one integration call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverStats {
    pub num_eval: u32,
    pub num_jac: u32,
    pub accepted_steps: u32,
    pub rejected_steps: u32,
}

impl SolverStats {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for SolverStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Number of function evaluations: {}", self.num_eval)?;
        writeln!(f, "Number of Jacobian evaluations: {}", self.num_jac)?;
        writeln!(f, "Number of accepted steps: {}", self.accepted_steps)?;
        write!(f, "Number of rejected steps: {}", self.rejected_steps)
    }
}
