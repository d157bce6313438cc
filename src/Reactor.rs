//! # Van de Vusse CSTR Module
//!
//! This module provides the physical model of a continuous stirred-tank reactor
//! running the Van de Vusse reaction network, together with the smooth control
//! input reconstruction used to drive it.
//!
//! ## Reaction network
//!
//! ```text
//! A -> B -> C        (first order, rates r1 and r2)
//! 2A -> D            (second order, rate r3)
//! ```
//!
//! with Arrhenius rate constants `ki = ki0 * exp(-Ei/T)` (`Ei` given as
//! activation temperature E/R).
//!
//! ## Governing equations
//!
//! Mass and energy balances for the state `(Ca, Cb, T)`:
//!
//! ```text
//! dCa/dt = (q/V)*(Caf - Ca) - r1 - r3
//! dCb/dt = -(q/V)*Cb + r1 - r2
//! dT/dt  = (q/V)*(Tf - T) - (dH1*r1 + dH2*r2 + dH3*r3)/(rho*Cp)
//!          + kw*Ar/(rho*Cp*V)*(Tc(t) - T)
//! ```
//!
//! `Tc(t)` is the jacket temperature reconstructed from the discrete control
//! horizon by [`control_signal::ControlSignal`].
//!
//! ## Nomenclature
//!
//! | Symbol | Description | Units |
//! |--------|-------------|-------|
//! | `Caf` | Feed concentration of A | mol/l |
//! | `q_v` | Dilution rate q/V (inverse residence time) | 1/s |
//! | `Tf` | Feed temperature | K |
//! | `kw_Ar` | Heat-transfer coefficient times jacket area | kJ/(s*K) |
//! | `V` | Reactor volume | l |
//! | `rho` | Density | kg/l |
//! | `Cp` | Heat capacity | kJ/(kg*K) |
//! | `dHi` | Reaction enthalpies | kJ/mol |
//!
//! The same right-hand-side serves as the "real" plant and as the predictive
//! model of the controller (perfect-model assumption), so a later deliberate
//! model/plant mismatch only needs a second parameter set.

pub mod VanDeVusse;
pub mod control_signal;
mod reactor_tests;
