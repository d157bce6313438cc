//! Rosenbrock 2(3) stiff stepper with embedded error estimate.
//!
//! Implements the L-stable two-stage Rosenbrock pair of Shampine and Reiche
//! (the `ode23s` scheme): one LU factorization of the iteration matrix
//! `W = I - h*d*J` per step, three linear solves, a third-order companion
//! solution for error control. The Jacobian is approximated by forward
//! differences, which is adequate here because the right-hand-sides are
//! smooth closures over typed parameter structs.

use crate::Solver::stiff_core::{IntegrationError, OdeSystem, SolverStats};
use nalgebra::{DMatrix, DVector};

/// Square root of machine epsilon, used for finite-difference increments.
fn sqrt_eps() -> f64 {
    f64::EPSILON.sqrt()
}

/// Adaptive Rosenbrock 2(3) solver. Reusable: each `integrate*` call is an
/// independent integration with its own statistics.
#[derive(Debug, Clone)]
pub struct Rosenbrock23 {
    /// Relative tolerance used in the adaptive step-size control
    pub rtol: f64,
    /// Absolute tolerance used in the adaptive step-size control
    pub atol: f64,
    /// Internal step-count budget; exhausting it is an integration failure
    pub n_max: u32,
}

impl Rosenbrock23 {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self {
            rtol,
            atol,
            n_max: 100_000,
        }
    }

    pub fn with_step_budget(mut self, n_max: u32) -> Self {
        self.n_max = n_max;
        self
    }

    /// Integrate from `t0` to `t_end` and return only the final state.
    pub fn integrate<F: OdeSystem>(
        &self,
        f: &F,
        t0: f64,
        y0: &DVector<f64>,
        t_end: f64,
    ) -> Result<(DVector<f64>, SolverStats), IntegrationError> {
        let mut stats = SolverStats::new();
        let mut h = self.initial_step(f, t0, y0, t_end, &mut stats);
        let y = self.advance(f, t0, y0.clone(), t_end, &mut h, &mut stats)?;
        Ok((y, stats))
    }

    /// Integrate from `t0` and return the state at every requested grid
    /// point. The grid must be non-decreasing with `grid[0] >= t0`; the
    /// stepper never steps past the next grid point, so the returned states
    /// are exact solution samples, not interpolants.
    pub fn integrate_grid<F: OdeSystem>(
        &self,
        f: &F,
        t0: f64,
        y0: &DVector<f64>,
        grid: &[f64],
    ) -> Result<(Vec<DVector<f64>>, SolverStats), IntegrationError> {
        let mut stats = SolverStats::new();
        let mut out = Vec::with_capacity(grid.len());
        let t_last = match grid.last() {
            Some(&t) => t,
            None => return Ok((out, stats)),
        };

        let mut t = t0;
        let mut y = y0.clone();
        let mut h = self.initial_step(f, t0, y0, t_last.max(t0), &mut stats);
        for &tg in grid {
            debug_assert!(tg >= t, "grid must be non-decreasing and start at or after t0");
            if tg > t {
                y = self.advance(f, t, y, tg, &mut h, &mut stats)?;
                t = tg;
            }
            out.push(y.clone());
        }
        Ok((out, stats))
    }

    /// Heuristic initial step size from the scaled norms of the state and its
    /// derivative.
    fn initial_step<F: OdeSystem>(
        &self,
        f: &F,
        t0: f64,
        y0: &DVector<f64>,
        t_end: f64,
        stats: &mut SolverStats,
    ) -> f64 {
        let span = t_end - t0;
        if span <= 0.0 {
            return 0.0;
        }
        let dim = y0.len();
        let mut f0 = DVector::zeros(dim);
        f.rhs(t0, y0, &mut f0);
        stats.num_eval += 1;

        let mut d0 = 0.0;
        let mut d1 = 0.0;
        for i in 0..dim {
            let sci = self.atol + y0[i].abs() * self.rtol;
            d0 += (y0[i] / sci) * (y0[i] / sci);
            d1 += (f0[i] / sci) * (f0[i] / sci);
        }
        let h0 = if d0 < 1.0e-10 || d1 < 1.0e-10 {
            1.0e-6 * span
        } else {
            0.01 * (d0 / d1).sqrt()
        };
        h0.min(span)
    }

    /// Core accept/reject loop over one span. `h` carries the adapted step
    /// size across successive spans of a grid integration.
    fn advance<F: OdeSystem>(
        &self,
        f: &F,
        t0: f64,
        mut y: DVector<f64>,
        t_end: f64,
        h: &mut f64,
        stats: &mut SolverStats,
    ) -> Result<DVector<f64>, IntegrationError> {
        let dim = y.len();
        // Rosenbrock 2(3) coefficients
        let d = 1.0 / (2.0 + 2.0_f64.sqrt());
        let e32 = 6.0 + 2.0_f64.sqrt();

        let mut t = t0;
        let mut f0 = DVector::zeros(dim);
        let mut f1 = DVector::zeros(dim);
        let mut f2 = DVector::zeros(dim);
        let mut ft = DVector::zeros(dim);
        f.rhs(t, &y, &mut f0);
        stats.num_eval += 1;

        if *h <= 0.0 {
            *h = 1.0e-6 * (t_end - t0).max(f64::EPSILON);
        }

        while t < t_end {
            if stats.accepted_steps + stats.rejected_steps >= self.n_max {
                return Err(IntegrationError::MaxNumStepReached {
                    t,
                    n_step: self.n_max,
                });
            }
            let h_floor = 16.0 * f64::EPSILON * t.abs().max(1.0);
            if t_end - t <= h_floor {
                // the remaining span is below resolution
                break;
            }
            if *h < h_floor {
                return Err(IntegrationError::StepSizeUnderflow { t });
            }
            let clamped = *h > t_end - t;
            let hs = if clamped { t_end - t } else { *h };

            let jac = self.fd_jacobian(f, t, &y, &f0, stats);
            let tdel = sqrt_eps() * (t.abs() + hs);
            f.rhs(t + tdel, &y, &mut ft);
            stats.num_eval += 1;
            let fdt = (&ft - &f0) / tdel;

            let w = DMatrix::identity(dim, dim) - &jac * (hs * d);
            let lu = w.lu();

            let k1 = match lu.solve(&(&f0 + &fdt * (hs * d))) {
                Some(k) => k,
                None => {
                    stats.rejected_steps += 1;
                    *h = hs * 0.5;
                    if *h < h_floor {
                        return Err(IntegrationError::SingularIterationMatrix { t });
                    }
                    continue;
                }
            };
            f.rhs(t + 0.5 * hs, &(&y + &k1 * (0.5 * hs)), &mut f1);
            stats.num_eval += 1;
            let k2 = match lu.solve(&(&f1 - &k1)) {
                Some(k) => k + &k1,
                None => {
                    stats.rejected_steps += 1;
                    *h = hs * 0.5;
                    continue;
                }
            };
            let y_new = &y + &k2 * hs;
            f.rhs(t + hs, &y_new, &mut f2);
            stats.num_eval += 1;
            let rhs3 = &f2 - (&k2 - &f1) * e32 - (&k1 - &f0) * 2.0 + &fdt * (hs * d);
            let k3 = match lu.solve(&rhs3) {
                Some(k) => k,
                None => {
                    stats.rejected_steps += 1;
                    *h = hs * 0.5;
                    continue;
                }
            };

            // embedded third-order error estimate
            let e = (&k1 - &k2 * 2.0 + &k3) * (hs / 6.0);
            let mut err = 0.0;
            for i in 0..dim {
                let sci = self.atol + self.rtol * y[i].abs().max(y_new[i].abs());
                err += (e[i] / sci) * (e[i] / sci);
            }
            err = (err / dim as f64).sqrt();

            if !err.is_finite() {
                stats.rejected_steps += 1;
                *h = hs * 0.1;
                continue;
            }

            if err <= 1.0 {
                t += hs;
                y = y_new;
                std::mem::swap(&mut f0, &mut f2);
                stats.accepted_steps += 1;
                let fac = (0.9 * err.max(1.0e-10).powf(-1.0 / 3.0)).clamp(0.2, 5.0);
                let h_next = hs * fac;
                // a step clamped to the span end must not shrink the carried step
                *h = if clamped { h_next.max(*h) } else { h_next };
            } else {
                stats.rejected_steps += 1;
                let fac = (0.9 * err.powf(-1.0 / 3.0)).clamp(0.1, 0.9);
                *h = hs * fac;
            }
        }
        Ok(y)
    }

    /// Forward-difference Jacobian of `f` at `(t, y)`, reusing the already
    /// computed `f0 = f(t, y)`.
    fn fd_jacobian<F: OdeSystem>(
        &self,
        f: &F,
        t: f64,
        y: &DVector<f64>,
        f0: &DVector<f64>,
        stats: &mut SolverStats,
    ) -> DMatrix<f64> {
        let dim = y.len();
        let mut jac = DMatrix::zeros(dim, dim);
        let mut y_pert = y.clone();
        let mut f_pert = DVector::zeros(dim);
        for j in 0..dim {
            let delta = sqrt_eps() * y[j].abs().max(1.0);
            y_pert[j] = y[j] + delta;
            f.rhs(t, &y_pert, &mut f_pert);
            stats.num_eval += 1;
            for i in 0..dim {
                jac[(i, j)] = (f_pert[i] - f0[i]) / delta;
            }
            y_pert[j] = y[j];
        }
        stats.num_jac += 1;
        jac
    }
}
