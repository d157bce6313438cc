use crate::Reactor::VanDeVusse::{ReactorParameters, VanDeVusseModel};
use crate::Reactor::control_signal::ControlSignal;
use crate::Solver::Rosenbrock23::Rosenbrock23;

use log::warn;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Sentinel cost substituted when the predictive integration fails. Finite,
/// so the optimizer backs away from the offending region instead of crashing
/// the whole control step, yet far above every penalty a real candidate can
/// accumulate, so a failed evaluation never outranks a feasible one.
pub const FAILED_EVAL_COST: f64 = 1.0e300;

/// Temperature setpoint over time: ordered `(time, target)` pairs with
/// clamped linear interpolation between them. A single pair is a flat
/// setpoint for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetpointTrajectory {
    pub points: Vec<(f64, f64)>,
}

impl SetpointTrajectory {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn constant(target: f64) -> Self {
        Self {
            points: vec![(0.0, target)],
        }
    }

    /// Target temperature at time `t`, clamped to the first/last pair
    /// outside the covered span.
    pub fn target_at(&self, t: f64) -> f64 {
        let pts = &self.points;
        if t <= pts[0].0 {
            return pts[0].1;
        }
        for w in pts.windows(2) {
            let ((t0, v0), (t1, v1)) = (w[0], w[1]);
            if t <= t1 {
                if t1 == t0 {
                    return v1;
                }
                return v0 + (v1 - v0) * (t - t0) / (t1 - t0);
            }
        }
        pts[pts.len() - 1].1
    }
}

/// Scalar penalty of one candidate control-horizon vector: predicted
/// tracking error plus soft input-bound and move-size penalties.
///
/// The candidate entries are additive moves; their cumulative sums are the
/// absolute jacket-temperature levels held after each anchor, which is the
/// quantity the bound penalty constrains. The move-size vector deliberately
/// mixes the delta against the previously applied value (index 0) with the
/// raw planned moves (indices 1..H-1): only the first move is ever applied,
/// the rest are re-planned at the next sample.
pub struct CostFunction<'a> {
    pub params: &'a ReactorParameters,
    pub signal: &'a ControlSignal,
    pub setpoint: &'a SetpointTrajectory,
    /// Prediction horizon length (s)
    pub Hp: f64,
    /// Number of equally spaced prediction sampling points on [0, Hp]
    pub nt: usize,
    /// Input bounds on cumulative control levels (K)
    pub lb: f64,
    pub ub: f64,
    /// Maximum admissible move magnitude (K)
    pub du_max: f64,
    /// Penalty weights: tracking, bound violation, move-size violation
    pub P_sp: f64,
    pub P_u: f64,
    pub P_du: f64,
    /// Integrator tolerances for the predictive rollout
    pub rtol: f64,
    pub atol: f64,
    /// Integrator step budget per rollout
    pub max_steps: u32,
}

impl CostFunction<'_> {
    /// Total penalty for the candidate `u` starting from the measured state
    /// `ynow`, with `u_prev` the first control value applied at the previous
    /// sample. Always finite and non-negative; an integration failure inside
    /// the rollout is recovered locally with [`FAILED_EVAL_COST`].
    pub fn evaluate(&self, u: &DVector<f64>, ynow: &DVector<f64>, u_prev: f64) -> f64 {
        debug_assert_eq!(u.len(), self.signal.horizon_len());
        let grid = prediction_grid(self.Hp, self.nt);
        let solver = Rosenbrock23::new(self.rtol, self.atol).with_step_budget(self.max_steps);
        let model = VanDeVusseModel::new(self.params, self.signal, u);
        let traj = match solver.integrate_grid(&model, 0.0, ynow, &grid) {
            Ok((traj, _stats)) => traj,
            Err(e) => {
                warn!("predictive rollout failed, substituting sentinel cost: {}", e);
                return FAILED_EVAL_COST;
            }
        };

        let f1 = self.tracking_error(&grid, &traj);
        let f2 = self.bound_penalty(u);
        let f3 = self.move_penalty(u, u_prev);
        self.P_sp * f1 + self.P_u * f2 + self.P_du * f3
    }

    /// Integrated squared temperature tracking error over the prediction
    /// horizon, by the trapezoidal rule on the sampled trajectory.
    pub fn tracking_error(&self, grid: &[f64], traj: &[DVector<f64>]) -> f64 {
        let mut f1 = 0.0;
        for k in 0..grid.len() - 1 {
            let e0 = traj[k][2] - self.setpoint.target_at(grid[k]);
            let e1 = traj[k + 1][2] - self.setpoint.target_at(grid[k + 1]);
            f1 += 0.5 * (e0 * e0 + e1 * e1) * (grid[k + 1] - grid[k]);
        }
        f1
    }

    /// Hinge penalty on the cumulative control levels: zero iff every
    /// partial sum of `u` lies within `[lb, ub]`.
    pub fn bound_penalty(&self, u: &DVector<f64>) -> f64 {
        let mut cs = 0.0;
        let mut cs_max = f64::NEG_INFINITY;
        let mut cs_min = f64::INFINITY;
        for &ui in u.iter() {
            cs += ui;
            cs_max = cs_max.max(cs);
            cs_min = cs_min.min(cs);
        }
        (cs_max - self.ub).max(0.0) + (self.lb - cs_min).max(0.0)
    }

    /// Hinge penalty on the largest move magnitude: the first move is
    /// measured against the previously applied value, the remaining entries
    /// are taken as planned.
    pub fn move_penalty(&self, u: &DVector<f64>, u_prev: f64) -> f64 {
        let mut du_abs_max = (u_prev - u[0]).abs();
        for &ui in u.iter().skip(1) {
            du_abs_max = du_abs_max.max(ui.abs());
        }
        (du_abs_max - self.du_max).max(0.0)
    }
}

/// `nt` equally spaced points on `[0, Hp]`.
pub fn prediction_grid(Hp: f64, nt: usize) -> Vec<f64> {
    let step = Hp / (nt - 1) as f64;
    (0..nt).map(|k| k as f64 * step).collect()
}
