#[cfg(test)]
mod tests {
    use crate::Reactor::VanDeVusse::{ReactorParameters, VanDeVusseModel};
    use crate::Reactor::control_signal::ControlSignal;
    use crate::Solver::stiff_core::OdeSystem;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    #[test]
    fn test_signal_weight_is_half_at_anchor() {
        let signal = ControlSignal::new(vec![10.0], 2.0);
        let u = DVector::from_vec(vec![2.0]);
        assert_relative_eq!(signal.value(10.0, &u), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_signal_sums_all_moves_far_past_last_anchor() {
        let signal = ControlSignal::new(vec![0.0, 50.0, 100.0], 1.0);
        let u = DVector::from_vec(vec![300.0, 10.0, -5.0]);
        assert_relative_eq!(signal.value(1.0e3, &u), 305.0, epsilon = 1e-9);
        assert_relative_eq!(signal.value(-1.0e3, &u), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_signal_converges_monotonically_to_zero_order_hold() {
        let signal_td = vec![0.0, 50.0, 100.0];
        let u = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        // query times away from the anchors
        for &t in &[-10.0, 10.0, 25.0, 75.0, 99.0, 101.0, 140.0] {
            let zoh = ControlSignal::new(signal_td.clone(), 1.0).zero_order_hold(t, &u);
            let mut prev_gap = f64::INFINITY;
            for &p in &[0.05, 0.2, 1.0, 5.0, 25.0] {
                let signal = ControlSignal::new(signal_td.clone(), p);
                let gap = (signal.value(t, &u) - zoh).abs();
                assert!(
                    gap <= prev_gap + 1e-12,
                    "gap grew from {} to {} at t = {}, p = {}",
                    prev_gap,
                    gap,
                    t,
                    p
                );
                prev_gap = gap;
            }
            assert!(prev_gap < 1e-3, "no convergence at t = {}", t);
        }
    }

    #[test]
    fn test_zero_order_hold_includes_moves_at_their_anchors() {
        let signal = ControlSignal::new(vec![0.0, 50.0, 100.0], 1.0);
        assert_eq!(signal.horizon_len(), 3);

        let u = DVector::from_vec(vec![300.0, 10.0, -5.0]);
        // a move contributes fully from its anchor time on
        assert_eq!(signal.zero_order_hold(-1.0, &u), 0.0);
        assert_eq!(signal.zero_order_hold(0.0, &u), 300.0);
        assert_eq!(signal.zero_order_hold(50.0, &u), 310.0);
        assert_eq!(signal.zero_order_hold(99.0, &u), 310.0);
        assert_eq!(signal.zero_order_hold(100.0, &u), 305.0);
    }

    #[test]
    fn test_rhs_with_empty_reactor_is_pure_feed() {
        let params = ReactorParameters::default();
        let signal = ControlSignal::new(vec![0.0], 50.0);
        let u = DVector::from_vec(vec![params.Tf]);
        let model = VanDeVusseModel::new(&params, &signal, &u);

        let y = DVector::from_vec(vec![0.0, 0.0, params.Tf]);
        let mut dy = DVector::zeros(3);
        model.rhs(10.0, &y, &mut dy);

        // no A or B present, so no reactions: A is fed in, B untouched
        assert_relative_eq!(dy[0], params.q_v * params.Caf, epsilon = 1e-12);
        assert_relative_eq!(dy[1], 0.0, epsilon = 1e-12);
        // feed, jacket and reactor all at Tf: thermal equilibrium
        assert_relative_eq!(dy[2], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rhs_jacket_cooling_sign() {
        let mut params = ReactorParameters::default();
        // feed at reactor temperature so the jacket term dominates
        params.Tf = 350.0;
        let signal = ControlSignal::new(vec![0.0], 50.0);
        // jacket far below reactor temperature
        let u = DVector::from_vec(vec![280.0]);
        let model = VanDeVusseModel::new(&params, &signal, &u);

        let y = DVector::from_vec(vec![0.0, 0.0, 350.0]);
        let mut dy = DVector::zeros(3);
        model.rhs(10.0, &y, &mut dy);
        assert!(dy[2] < 0.0, "cold jacket must cool the reactor: {}", dy[2]);
    }

    #[test]
    fn test_set_feed_temperature_changes_only_tf() {
        let mut params = ReactorParameters::default();
        let before = params.clone();
        params.set_feed_temperature(433.15);
        assert_eq!(params.Tf, 433.15);

        let mut restored = params.clone();
        restored.Tf = before.Tf;
        assert_eq!(restored, before);
    }

    #[test]
    fn test_parameter_validation() {
        let params = ReactorParameters::default();
        assert!(params.check().is_ok());

        let mut bad = ReactorParameters::default();
        bad.V = 0.0;
        assert!(bad.check().is_err());

        let mut bad = ReactorParameters::default();
        bad.E2 = f64::NAN;
        assert!(bad.check().is_err());
    }
}
