//! Receding-horizon control task: the driver tying optimizer, cost function
//! and plant integration together over simulated time.

use crate::MpcControl::cost_function::{CostFunction, SetpointTrajectory};
use crate::MpcControl::nelder_mead::NelderMead;
use crate::MpcControl::task_parser_mpc::MpcConfig;
use crate::Reactor::VanDeVusse::{ReactorParameters, VanDeVusseModel};
use crate::Reactor::control_signal::ControlSignal;
use crate::Solver::Rosenbrock23::Rosenbrock23;
use crate::Solver::stiff_core::IntegrationError;
use crate::Utils::record_output::SamplingRecord;

use log::info;
use nalgebra::DVector;
use thiserror::Error;

/// Errors of the control system. Solver failures inside cost evaluations
/// never surface here (they are recovered with a sentinel penalty); only the
/// plant-advance integration is fatal, because after it the true state is
/// unknown.
#[derive(Debug, Error)]
pub enum MpcError {
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("plant integration failed at sample {sample}: {source}")]
    IntegrationFailure {
        sample: usize,
        #[source]
        source: IntegrationError,
    },
}

/// Closed-loop MPC simulation of the Van de Vusse CSTR.
///
/// Workflow: `new()` (or `from_config`) -> setters -> `check_task()` ->
/// `run()`; afterwards [`MpcTask::record`] holds the full sampled history.
///
/// Per sampling instant the task:
/// 1. minimizes the penalty cost over the control horizon, warm started from
///    the previous solution;
/// 2. applies only the first move and truncates the warm start (every entry
///    after index 0 reset to zero - future moves are re-planned every step);
/// 3. advances the plant by one sampling interval with the stiff solver;
/// 4. appends `(t, state, applied)` to the record;
/// 5. fires the one-time feed-temperature disturbance when the configured
///    sample index is reached.
#[derive(Debug, Clone)]
pub struct MpcTask {
    /// Optional problem identifier
    pub problem_name: Option<String>,
    /// Optional problem description
    pub problem_description: Option<String>,
    /// Run configuration, immutable during `run()`
    pub config: MpcConfig,
    /// Reactor parameter state, shared by plant and predictive model; the
    /// feed temperature is mutated exactly once by the disturbance
    pub params: ReactorParameters,
    /// Current measured plant state (Ca, Cb, T)
    pub state: DVector<f64>,
    /// Warm-start control-horizon vector for the next optimization
    pub horizon: DVector<f64>,
    /// First control value applied at the previous sample
    pub u_prev: f64,
    /// Accumulated run history, the sole artifact of a run
    pub record: SamplingRecord,
    /// Sample index at which the disturbance actually fired
    pub disturbance_applied_at: Option<usize>,
}

impl Default for MpcTask {
    fn default() -> Self {
        Self::new()
    }
}

impl MpcTask {
    /// Create a task with the default reference scenario and benchmark
    /// reactor parameters.
    pub fn new() -> Self {
        Self::from_config(MpcConfig::default(), ReactorParameters::default())
    }

    pub fn from_config(config: MpcConfig, params: ReactorParameters) -> Self {
        let state = DVector::from_vec(config.y0.clone());
        let horizon = DVector::from_vec(config.u0.clone());
        let u_prev = config.u0.first().copied().unwrap_or(0.0);
        Self {
            problem_name: None,
            problem_description: None,
            config,
            params,
            state,
            horizon,
            u_prev,
            record: SamplingRecord::new(),
            disturbance_applied_at: None,
        }
    }

    pub fn set_problem_name(&mut self, name: &str) {
        self.problem_name = Some(name.to_string());
    }

    pub fn set_problem_description(&mut self, description: &str) {
        self.problem_description = Some(description.to_string());
    }

    /// Validate configuration and reactor parameters; called by `run()`
    /// before any simulation starts.
    pub fn check_task(&self) -> Result<(), MpcError> {
        self.config.validate()?;
        self.params.check()?;
        Ok(())
    }

    /// Execute the closed loop over the configured span. On success the
    /// record holds one entry per sampling instant; on a fatal plant-advance
    /// failure the record retains every fully completed iteration.
    pub fn run(&mut self) -> Result<(), MpcError> {
        self.check_task()?;
        info!("task checked!");

        // fresh loop state; the parameter set is deliberately not reset, it
        // belongs to the task lifecycle
        self.state = DVector::from_vec(self.config.y0.clone());
        self.horizon = DVector::from_vec(self.config.u0.clone());
        self.u_prev = self.config.u0[0];
        self.record = SamplingRecord::new();
        self.disturbance_applied_at = None;

        let n_samples = self.config.n_samples();
        let disturbance_sample = self.config.disturbance_sample();
        let signal = ControlSignal::new(self.config.td.clone(), self.config.p_sharp);
        let setpoint = SetpointTrajectory::new(self.config.setpoint.clone());
        let optimizer = NelderMead::new(
            self.config.opt_f_tol,
            self.config.opt_x_tol,
            self.config.opt_max_iter,
        );
        let plant_solver = Rosenbrock23::new(self.config.rtol, self.config.atol)
            .with_step_budget(self.config.max_steps);
        info!(
            "starting closed loop ({} samples, disturbance at sample {})",
            n_samples, disturbance_sample
        );

        for i in 0..n_samples {
            let t_i = i as f64 * self.config.Ta;

            // 1. re-plan the control horizon from the warm start
            let cost = CostFunction {
                params: &self.params,
                signal: &signal,
                setpoint: &setpoint,
                Hp: self.config.Hp,
                nt: self.config.nt,
                lb: self.config.lb,
                ub: self.config.ub,
                du_max: self.config.du_max,
                P_sp: self.config.P_sp,
                P_u: self.config.P_u,
                P_du: self.config.P_du,
                rtol: self.config.rtol,
                atol: self.config.atol,
                max_steps: self.config.max_steps,
            };
            let (u_opt, f_best) =
                optimizer.minimize(|u| cost.evaluate(u, &self.state, self.u_prev), &self.horizon);

            // 2. only the first move is trusted
            let applied = u_opt[0];

            // 3. advance the real plant by one sampling interval in local
            //    time, driven by the full optimized horizon
            let model = VanDeVusseModel::new(&self.params, &signal, &u_opt);
            let (y_new, _stats) = plant_solver
                .integrate(&model, 0.0, &self.state, self.config.Ta)
                .map_err(|source| MpcError::IntegrationFailure { sample: i, source })?;
            self.state = y_new;

            // 4. record the completed iteration
            self.record
                .push(t_i + self.config.Ta, &self.state, applied);

            // truncate the warm start for the next sample
            let mut warm = DVector::zeros(self.horizon.len());
            warm[0] = applied;
            self.horizon = warm;
            self.u_prev = applied;

            info!(
                "sample {}: t = {:.1} s, applied Tc = {:.2} K, T = {:.2} K, cost = {:.4e}",
                i,
                t_i + self.config.Ta,
                applied,
                self.state[2],
                f_best
            );

            // 5. one-time unmodeled process shift
            if i == disturbance_sample && self.disturbance_applied_at.is_none() {
                self.params
                    .set_feed_temperature(self.config.Tf_disturbed);
                self.disturbance_applied_at = Some(i);
                info!(
                    "disturbance at sample {}: feed temperature set to {:.2} K",
                    i, self.config.Tf_disturbed
                );
            }
        }
        info!("closed loop finished ({} samples recorded)", self.record.len());
        Ok(())
    }

    /// Tabular summary of the task configuration.
    pub fn pretty_print_task(&self) {
        use prettytable::{Table, row};

        println!("\n=== MPC TASK SUMMARY ===");
        println!("Problem Name: {:?}", self.problem_name);
        println!("Problem Description: {:?}", self.problem_description);

        let cfg = &self.config;
        let mut table = Table::new();
        table.add_row(row!["Parameter", "Value", "Units"]);
        table.add_row(row!["Prediction horizon (Hp)", format!("{:.1}", cfg.Hp), "s"]);
        table.add_row(row!["Prediction points (nt)", cfg.nt, "-"]);
        table.add_row(row!["Sampling interval (Ta)", format!("{:.1}", cfg.Ta), "s"]);
        table.add_row(row!["Total span", format!("{:.1}", cfg.t_total), "s"]);
        table.add_row(row!["Control anchors (td)", format!("{:?}", cfg.td), "s"]);
        table.add_row(row![
            "Input bounds [lb, ub]",
            format!("[{:.2}, {:.2}]", cfg.lb, cfg.ub),
            "K"
        ]);
        table.add_row(row!["Max move (du_max)", format!("{:.1}", cfg.du_max), "K"]);
        table.add_row(row![
            "Weights (P_sp, P_u, P_du)",
            format!("{:.1e}, {:.1e}, {:.1e}", cfg.P_sp, cfg.P_u, cfg.P_du),
            "-"
        ]);
        table.add_row(row![
            "Disturbance",
            format!(
                "sample {} -> Tf = {:.2}",
                cfg.disturbance_sample(),
                cfg.Tf_disturbed
            ),
            "K"
        ]);
        table.add_row(row![
            "Feed temperature (Tf)",
            format!("{:.2}", self.params.Tf),
            "K"
        ]);
        table.printstd();
    }
}
