//! Configuration of one closed-loop run, with JSON task-file support.

use crate::MpcControl::MpcTask::MpcError;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every configuration input of a closed-loop run. Immutable once the run
/// starts; `validate()` rejects inconsistent tasks before any simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpcConfig {
    /// Prediction horizon length (s)
    pub Hp: f64,
    /// Number of prediction sampling points on [0, Hp]
    pub nt: usize,
    /// Penalty weights: setpoint tracking, input-bound violation, move-size
    /// violation
    pub P_sp: f64,
    pub P_u: f64,
    pub P_du: f64,
    /// Bounds on the cumulative control levels (K)
    pub lb: f64,
    pub ub: f64,
    /// Maximum admissible move magnitude (K)
    pub du_max: f64,
    /// Control-signal regularization sharpness p (1/s)
    pub p_sharp: f64,
    /// Anchor-time offsets td, strictly increasing with td[0] = 0 (s)
    pub td: Vec<f64>,
    /// Sampling interval Ta (s)
    pub Ta: f64,
    /// Total simulated span (s)
    pub t_total: f64,
    /// Initial plant state (Ca, Cb, T)
    pub y0: Vec<f64>,
    /// Initial control-horizon warm start, same length as td
    pub u0: Vec<f64>,
    /// Setpoint trajectory as ordered (time, target) pairs
    pub setpoint: Vec<(f64, f64)>,
    /// Disturbance trigger as a fraction of the total sample count
    pub disturbance_fraction: f64,
    /// Feed temperature after the disturbance (K)
    pub Tf_disturbed: f64,
    /// Stiff-integrator tolerances
    pub rtol: f64,
    pub atol: f64,
    /// Stiff-integrator step budget per integration call
    pub max_steps: u32,
    /// Optimizer convergence controls
    pub opt_f_tol: f64,
    pub opt_x_tol: f64,
    pub opt_max_iter: usize,
}

impl Default for MpcConfig {
    /// Reference temperature-tracking scenario: flat 380 K setpoint from a
    /// cold start at 300 K, jacket bounded to [273.15, 373.15] K, moves
    /// limited to 10 K, mid-run feed-temperature disturbance.
    fn default() -> Self {
        Self {
            Hp: 300.0,
            nt: 21,
            P_sp: 1.0,
            P_u: 1.0e6,
            P_du: 1.0e6,
            lb: 273.15,
            ub: 373.15,
            du_max: 10.0,
            p_sharp: 50.0,
            td: vec![0.0, 100.0, 200.0],
            Ta: 100.0,
            t_total: 3000.0,
            y0: vec![0.0, 0.0, 300.0],
            u0: vec![300.0, 0.0, 0.0],
            setpoint: vec![(0.0, 380.0)],
            disturbance_fraction: 0.5,
            Tf_disturbed: 433.15,
            rtol: 1e-3,
            atol: 1e-4,
            max_steps: 100_000,
            opt_f_tol: 1e-8,
            opt_x_tol: 1e-8,
            opt_max_iter: 100,
        }
    }
}

impl MpcConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of sampling instants of the run.
    pub fn n_samples(&self) -> usize {
        (self.t_total / self.Ta).floor() as usize
    }

    /// Sample index at which the disturbance fires, rounded from the
    /// configured fraction and clamped into the run.
    pub fn disturbance_sample(&self) -> usize {
        let n = self.n_samples();
        if n == 0 {
            return 0;
        }
        let idx = (self.disturbance_fraction * n as f64).round() as usize;
        idx.min(n - 1)
    }

    /// Reject inconsistent configurations before any simulation begins.
    pub fn validate(&self) -> Result<(), MpcError> {
        if self.td.is_empty() {
            return Err(MpcError::InvalidConfiguration(
                "anchor-time vector td must not be empty".to_string(),
            ));
        }
        if self.td[0] != 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "td[0] must be 0 (the first anchor is always \"now\")".to_string(),
            ));
        }
        if self.td.windows(2).any(|w| w[1] <= w[0]) {
            return Err(MpcError::InvalidConfiguration(
                "anchor times td must be strictly increasing".to_string(),
            ));
        }
        if self.u0.len() != self.td.len() {
            return Err(MpcError::InvalidConfiguration(format!(
                "warm start length {} does not match anchor count {}",
                self.u0.len(),
                self.td.len()
            )));
        }
        if self.lb >= self.ub {
            return Err(MpcError::InvalidConfiguration(format!(
                "lb = {} must be below ub = {}",
                self.lb, self.ub
            )));
        }
        if self.Ta <= 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "sampling interval Ta must be positive".to_string(),
            ));
        }
        if self.Hp <= 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "prediction horizon Hp must be positive".to_string(),
            ));
        }
        if self.nt < 2 {
            return Err(MpcError::InvalidConfiguration(
                "nt must be at least 2 prediction points".to_string(),
            ));
        }
        if self.t_total < self.Ta {
            return Err(MpcError::InvalidConfiguration(
                "total span must cover at least one sampling interval".to_string(),
            ));
        }
        if self.y0.len() != 3 {
            return Err(MpcError::InvalidConfiguration(
                "initial state must be (Ca, Cb, T)".to_string(),
            ));
        }
        if self.setpoint.is_empty() {
            return Err(MpcError::MissingData(
                "setpoint trajectory must not be empty".to_string(),
            ));
        }
        if self.setpoint.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(MpcError::InvalidConfiguration(
                "setpoint trajectory times must be non-decreasing".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.disturbance_fraction) {
            return Err(MpcError::InvalidConfiguration(
                "disturbance fraction must lie in [0, 1]".to_string(),
            ));
        }
        if self.du_max < 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "du_max must be non-negative".to_string(),
            ));
        }
        if self.p_sharp <= 0.0 {
            return Err(MpcError::InvalidConfiguration(
                "sharpness p must be positive".to_string(),
            ));
        }
        if self.max_steps == 0 {
            return Err(MpcError::InvalidConfiguration(
                "integrator step budget max_steps must be positive".to_string(),
            ));
        }
        for (name, v) in [
            ("rtol", self.rtol),
            ("atol", self.atol),
            ("opt_f_tol", self.opt_f_tol),
            ("opt_x_tol", self.opt_x_tol),
        ] {
            if v <= 0.0 || v.is_nan() {
                return Err(MpcError::InvalidConfiguration(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
        for (name, w) in [("P_sp", self.P_sp), ("P_u", self.P_u), ("P_du", self.P_du)] {
            if w < 0.0 || w.is_nan() {
                return Err(MpcError::InvalidConfiguration(format!(
                    "penalty weight {} must be non-negative",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Parse a task from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, MpcError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MpcError::ParseError(format!("cannot read task file: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| MpcError::ParseError(format!("cannot parse task file: {}", e)))
    }

    /// Save the task to a JSON file.
    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MpcError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| MpcError::ParseError(format!("cannot serialize task: {}", e)))?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| MpcError::ParseError(format!("cannot write task file: {}", e)))
    }
}
