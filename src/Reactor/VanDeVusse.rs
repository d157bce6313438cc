use crate::MpcControl::MpcTask::MpcError;
use crate::Reactor::control_signal::ControlSignal;
use crate::Solver::stiff_core::OdeSystem;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Physical and chemical parameters of the Van de Vusse CSTR.
///
/// All values are configuration data; the defaults reproduce the classic
/// Van de Vusse benchmark (cyclopentenol synthesis) converted to per-second
/// units. The feed temperature `Tf` is the only parameter with a mutation
/// method: it is the hook for the one-time unmodeled disturbance injected by
/// the control loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorParameters {
    /// Feed concentration of A (mol/l)
    pub Caf: f64,
    /// Dilution rate q/V, the inverse residence time (1/s)
    pub q_v: f64,
    /// Feed temperature (K)
    pub Tf: f64,
    /// Heat-transfer coefficient times jacket area kw*Ar (kJ/(s*K))
    pub kw_Ar: f64,
    /// Reactor volume (l)
    pub V: f64,
    /// Density (kg/l)
    pub rho: f64,
    /// Heat capacity (kJ/(kg*K))
    pub Cp: f64,
    /// Reaction enthalpies (kJ/mol)
    pub dH1: f64,
    pub dH2: f64,
    pub dH3: f64,
    /// Pre-exponential factors; k10, k20 in 1/s, k30 in l/(mol*s)
    pub k10: f64,
    pub k20: f64,
    pub k30: f64,
    /// Activation temperatures E/R (K)
    pub E1: f64,
    pub E2: f64,
    pub E3: f64,
}

impl Default for ReactorParameters {
    fn default() -> Self {
        Self {
            Caf: 5.1,
            q_v: 14.19 / 3600.0,
            Tf: 403.15,
            kw_Ar: 4032.0 / 3600.0,
            V: 10.0,
            rho: 0.9342,
            Cp: 3.01,
            dH1: 4.2,
            dH2: -11.0,
            dH3: -41.85,
            k10: 1.287e12 / 3600.0,
            k20: 1.287e12 / 3600.0,
            k30: 9.043e9 / 3600.0,
            E1: 9758.3,
            E2: 9758.3,
            E3: 8560.0,
        }
    }
}

impl ReactorParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutate the feed temperature. This is the single mutation point used by
    /// the control loop to inject the mid-run disturbance; every other
    /// parameter is immutable for the whole run.
    pub fn set_feed_temperature(&mut self, Tf: f64) {
        self.Tf = Tf;
    }

    /// Validate the parameter set before any simulation starts.
    pub fn check(&self) -> Result<(), MpcError> {
        if self.Caf < 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "Caf must be non-negative".to_string(),
            ));
        }
        if self.q_v <= 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "q_v must be positive".to_string(),
            ));
        }
        if self.Tf <= 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "Tf must be positive".to_string(),
            ));
        }
        if self.kw_Ar <= 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "kw_Ar must be positive".to_string(),
            ));
        }
        if self.V <= 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "V must be positive".to_string(),
            ));
        }
        if self.rho <= 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "rho must be positive".to_string(),
            ));
        }
        if self.Cp <= 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "Cp must be positive".to_string(),
            ));
        }
        for (name, k) in [("k10", self.k10), ("k20", self.k20), ("k30", self.k30)] {
            if k < 0.0 || k.is_nan() {
                return Err(MpcError::InvalidConfiguration(format!(
                    "{} must be non-negative",
                    name
                )));
            }
        }
        for (name, e) in [("E1", self.E1), ("E2", self.E2), ("E3", self.E3)] {
            if e < 0.0 || e.is_nan() {
                return Err(MpcError::InvalidConfiguration(format!(
                    "{} must be non-negative",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// ODE right-hand-side of the Van de Vusse CSTR, shared between the real
/// plant and the predictive model. A single instance binds the parameter set,
/// the control reconstruction and one fixed control-horizon vector; the
/// horizon vector is passed through unchanged for the whole integration.
pub struct VanDeVusseModel<'a> {
    pub params: &'a ReactorParameters,
    pub signal: &'a ControlSignal,
    pub horizon: &'a DVector<f64>,
}

impl<'a> VanDeVusseModel<'a> {
    pub fn new(
        params: &'a ReactorParameters,
        signal: &'a ControlSignal,
        horizon: &'a DVector<f64>,
    ) -> Self {
        Self {
            params,
            signal,
            horizon,
        }
    }
}

impl OdeSystem for VanDeVusseModel<'_> {
    fn rhs(&self, t: f64, y: &DVector<f64>, dy: &mut DVector<f64>) {
        let p = self.params;
        let (Ca, Cb, T) = (y[0], y[1], y[2]);
        let Tc = self.signal.value(t, self.horizon);

        let k1 = p.k10 * (-p.E1 / T).exp();
        let k2 = p.k20 * (-p.E2 / T).exp();
        let k3 = p.k30 * (-p.E3 / T).exp();
        let r1 = k1 * Ca;
        let r2 = k2 * Cb;
        let r3 = k3 * Ca * Ca;

        let rho_cp = p.rho * p.Cp;
        dy[0] = p.q_v * (p.Caf - Ca) - r1 - r3;
        dy[1] = -p.q_v * Cb + r1 - r2;
        dy[2] = p.q_v * (p.Tf - T) - (p.dH1 * r1 + p.dH2 * r2 + p.dH3 * r3) / rho_cp
            + p.kw_Ar / (rho_cp * p.V) * (Tc - T);
    }
}
