//! # Model-Predictive Control Module
//!
//! Receding-horizon control of the Van de Vusse CSTR: at every sampling
//! instant a derivative-free optimizer searches for the control-horizon
//! vector minimizing a soft-constraint penalty cost, only the first move is
//! applied, and the simulated plant is advanced by one sampling interval
//! with the stiff solver.
//!
//! ## Workflow
//!
//! 1. [`task_parser_mpc::MpcConfig`] - configuration (defaults, JSON task
//!    files, validation)
//! 2. [`MpcTask::MpcTask`] - `new()` -> setters -> `check_task()` -> `run()`
//! 3. the accumulated [`crate::Utils::record_output::SamplingRecord`] is the
//!    sole artifact of a run
//!
//! Constraints are penalties, not bounds: input-level and move-size
//! violations increase the cost continuously ([`cost_function`]), and the
//! optimizer itself is unconstrained ([`nelder_mead`]). Optimizer
//! non-convergence within its iteration budget is not an error; the best
//! point found is applied and re-planned at the next sample.

pub mod MpcTask;
pub mod cost_function;
mod mpc_tests2;
pub mod nelder_mead;
pub mod task_parser_mpc;
