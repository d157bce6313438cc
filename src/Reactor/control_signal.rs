use nalgebra::DVector;

/// Piecewise-smooth reconstruction of the discrete control horizon into a
/// continuous jacket-temperature input.
///
/// The horizon vector stores additive control moves anchored at the offsets
/// `td` (seconds from the current sampling instant, `td[0] = 0`). The
/// reconstructed input is a smooth surrogate for the zero-order-hold sum of
/// step functions:
///
/// ```text
/// Tc(t) = sum_i u[i] * (0.5 + 0.5*tanh(p*(t - td[i])))
/// ```
///
/// Larger sharpness `p` drives the switching weights toward exact unit steps;
/// the smooth form keeps the right-hand-side differentiable so the stiff
/// integrator can take large steps across the switching instants. At
/// `t = td[i]` the i-th weight is exactly 0.5 (transition midpoint).
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSignal {
    /// Anchor times, non-negative and strictly increasing, td[0] = 0 (s)
    pub td: Vec<f64>,
    /// Regularization sharpness p > 0 (1/s)
    pub p: f64,
}

impl ControlSignal {
    pub fn new(td: Vec<f64>, p: f64) -> Self {
        Self { td, p }
    }

    /// Number of control anchor times H.
    pub fn horizon_len(&self) -> usize {
        self.td.len()
    }

    /// Evaluate the reconstructed input at time `t` for the horizon vector
    /// `u`. Pure function of its inputs; `u` must have the same length as the
    /// anchor-time vector.
    pub fn value(&self, t: f64, u: &DVector<f64>) -> f64 {
        debug_assert_eq!(u.len(), self.td.len());
        self.td
            .iter()
            .zip(u.iter())
            .map(|(&tdi, &ui)| ui * (0.5 + 0.5 * (self.p * (t - tdi)).tanh()))
            .sum()
    }

    /// Exact zero-order-hold counterpart of [`value`](Self::value): each move
    /// contributes fully once `t` passes its anchor. Used as the sharp
    /// reference the smooth reconstruction converges to.
    pub fn zero_order_hold(&self, t: f64, u: &DVector<f64>) -> f64 {
        debug_assert_eq!(u.len(), self.td.len());
        self.td
            .iter()
            .zip(u.iter())
            .filter(|&(&tdi, _)| t >= tdi)
            .map(|(_, &ui)| ui)
            .sum()
    }
}
