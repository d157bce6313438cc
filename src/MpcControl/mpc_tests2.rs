/// Closed-loop tests: these run the whole receding-horizon simulation and
/// are therefore slower than the unit tests in `mpc_tests`.
#[cfg(test)]
mod tests {
    use crate::MpcControl::MpcTask::{MpcError, MpcTask};
    use crate::MpcControl::task_parser_mpc::MpcConfig;
    use crate::Reactor::VanDeVusse::ReactorParameters;

    /// Shortened scenario: 3 sampling intervals, 2 control anchors, a
    /// trimmed optimizer budget. Keeps the closed-loop tests fast while
    /// exercising every stage of the loop.
    fn short_config() -> MpcConfig {
        let mut cfg = MpcConfig::default();
        cfg.t_total = 300.0;
        cfg.Hp = 200.0;
        cfg.nt = 11;
        cfg.td = vec![0.0, 100.0];
        cfg.u0 = vec![300.0, 0.0];
        cfg.opt_max_iter = 60;
        cfg
    }

    #[test]
    fn test_first_sample_acts_on_the_plant() {
        let mut task = MpcTask::from_config(short_config(), ReactorParameters::default());
        task.run().unwrap();

        assert_eq!(task.record.len(), 3);
        // the hot feed and the applied jacket level must have moved the
        // temperature away from its initial value within one interval
        assert!((task.record.states[0][2] - 300.0).abs() > 1e-3);
        // the applied first move stays within the soft input bounds
        let cfg = short_config();
        assert!(task.record.controls[0] >= cfg.lb - 1e-6);
        assert!(task.record.controls[0] <= cfg.ub + 1e-6);
    }

    #[test]
    fn test_reference_scenario_end_to_end() {
        let mut task = MpcTask::new();
        task.run().unwrap();

        let cfg = &task.config;
        assert_eq!(task.record.len(), 30);
        for (i, &t) in task.record.times.iter().enumerate() {
            assert!((t - (i + 1) as f64 * cfg.Ta).abs() < 1e-9);
        }
        // the controller drives the reactor toward the (unreachable)
        // 380 K setpoint: the jacket saturates near its upper bound and
        // the final temperature sits well above the 300 K start
        let last = task.record.len() - 1;
        assert!(task.record.states[last][2] > 330.0);
        // applied moves are limited, so no recorded level can escape the
        // bounds by more than the per-sample move allowance
        for &tc in &task.record.controls {
            assert!(tc >= cfg.lb - cfg.du_max && tc <= cfg.ub + cfg.du_max);
        }
        // concentrations stay physical up to integration tolerance
        for y in &task.record.states {
            assert!(y[0] >= -1e-3 && y[0] <= task.params.Caf + 1e-3);
            assert!(y[1] >= -1e-3);
        }
        assert_eq!(task.disturbance_applied_at, Some(cfg.disturbance_sample()));
    }

    #[test]
    fn test_run_is_deterministic() {
        let mut a = MpcTask::from_config(short_config(), ReactorParameters::default());
        let mut b = MpcTask::from_config(short_config(), ReactorParameters::default());
        a.run().unwrap();
        b.run().unwrap();
        assert_eq!(a.record, b.record);
    }

    #[test]
    fn test_warm_start_truncation() {
        let mut cfg = short_config();
        cfg.t_total = 100.0; // a single sampling interval
        let mut task = MpcTask::from_config(cfg, ReactorParameters::default());
        task.run().unwrap();

        assert_eq!(task.record.len(), 1);
        // after the loop the warm start holds the applied move at index 0
        // and zeros everywhere else
        assert_eq!(task.horizon[0], task.record.controls[0]);
        for k in 1..task.horizon.len() {
            assert_eq!(task.horizon[k], 0.0);
        }
        assert_eq!(task.u_prev, task.record.controls[0]);
    }

    #[test]
    fn test_disturbance_fires_once_at_expected_sample() {
        let mut cfg = short_config();
        cfg.t_total = 500.0; // 5 samples, fraction 0.5 -> sample 3
        let mut task = MpcTask::from_config(cfg, ReactorParameters::default());
        assert_eq!(task.config.disturbance_sample(), 3);

        task.run().unwrap();
        assert_eq!(task.disturbance_applied_at, Some(3));
        assert_eq!(task.params.Tf, task.config.Tf_disturbed);
        // the configuration itself is never mutated
        assert_eq!(task.config.Tf_disturbed, MpcConfig::default().Tf_disturbed);
    }

    #[test]
    fn test_disturbance_shifts_the_trajectory() {
        let mut cfg = short_config();
        cfg.t_total = 500.0;
        let mut disturbed = MpcTask::from_config(cfg.clone(), ReactorParameters::default());

        // baseline: the "disturbance" steps the feed to its nominal value,
        // numerically a no-op
        let mut baseline_cfg = cfg;
        baseline_cfg.Tf_disturbed = ReactorParameters::default().Tf;
        let mut baseline = MpcTask::from_config(baseline_cfg, ReactorParameters::default());

        disturbed.run().unwrap();
        baseline.run().unwrap();

        // the disturbance fires after sample 3 is recorded, so histories
        // agree exactly through that sample and diverge at the next one
        for i in 0..=3 {
            assert_eq!(disturbed.record.states[i], baseline.record.states[i]);
            assert_eq!(disturbed.record.controls[i], baseline.record.controls[i]);
        }
        let dt = (disturbed.record.states[4][2] - baseline.record.states[4][2]).abs();
        assert!(dt > 1e-6, "hotter feed must shift the temperature, dT = {}", dt);
    }

    #[test]
    fn test_exhausted_plant_integration_is_fatal() {
        let mut cfg = short_config();
        // two steps cannot cover a 100 s sampling interval: every cost
        // rollout is recovered with the sentinel, but the plant advance at
        // the very first sample must abort the run
        cfg.max_steps = 2;
        let mut task = MpcTask::from_config(cfg, ReactorParameters::default());
        match task.run() {
            Err(MpcError::IntegrationFailure { sample, .. }) => assert_eq!(sample, 0),
            other => panic!("expected IntegrationFailure, got {:?}", other),
        }
        // only fully completed iterations are retained
        assert!(task.record.is_empty());
    }

    #[test]
    fn test_invalid_configuration_aborts_before_running() {
        let mut cfg = short_config();
        cfg.nt = 1;
        let mut task = MpcTask::from_config(cfg, ReactorParameters::default());
        assert!(task.run().is_err());
        assert!(task.record.is_empty());
    }
}
