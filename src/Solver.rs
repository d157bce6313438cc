//! # Stiff ODE Solver Module
//!
//! Adaptive integration of stiff initial value problems, used both for the
//! predictive-model rollouts inside the cost function and for advancing the
//! simulated plant by one sampling interval.
//!
//! The reaction kinetics of the Van de Vusse network exhibit widely separated
//! time constants (fast thermal jacket coupling against slow residence-time
//! dynamics), so an implicit, L-stable method is required: the solver
//! implements the Rosenbrock 2(3) pair with an embedded error estimate and a
//! finite-difference Jacobian.

pub mod Rosenbrock23;
pub mod stiff_core;
