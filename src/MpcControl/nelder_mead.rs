//! Derivative-free simplex minimization (Nelder-Mead).
//!
//! All constraint handling of the controller lives in the cost penalties, so
//! the optimizer itself is a plain unconstrained local search. It is warm
//! started from the previous sample's solution, which makes the default
//! 100-iteration budget sufficient for reconvergence; exhausting the budget
//! is a silent early stop that returns the best point found so far.

use nalgebra::DVector;

/// Standard Nelder-Mead coefficients: reflection, expansion, contraction,
/// shrink.
const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Relative perturbation building the initial simplex around the warm start.
const SIMPLEX_SCALE: f64 = 0.05;
/// Absolute perturbation for coordinates that start at zero.
const SIMPLEX_ZERO_STEP: f64 = 0.00025;

#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Function-value convergence tolerance
    pub f_tol: f64,
    /// Parameter convergence tolerance
    pub x_tol: f64,
    /// Iteration budget; on exhaustion the best point so far is returned
    pub max_iter: usize,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            f_tol: 1e-8,
            x_tol: 1e-8,
            max_iter: 100,
        }
    }
}

impl NelderMead {
    pub fn new(f_tol: f64, x_tol: f64, max_iter: usize) -> Self {
        Self {
            f_tol,
            x_tol,
            max_iter,
        }
    }

    /// Minimize `f` starting from `x0`. Returns the best vertex and its
    /// value; the returned vector always has the length of `x0`.
    pub fn minimize<F>(&self, f: F, x0: &DVector<f64>) -> (DVector<f64>, f64)
    where
        F: Fn(&DVector<f64>) -> f64,
    {
        let n = x0.len();
        let mut simplex: Vec<DVector<f64>> = Vec::with_capacity(n + 1);
        simplex.push(x0.clone());
        for j in 0..n {
            let mut xj = x0.clone();
            if xj[j] != 0.0 {
                xj[j] *= 1.0 + SIMPLEX_SCALE;
            } else {
                xj[j] = SIMPLEX_ZERO_STEP;
            }
            simplex.push(xj);
        }
        let mut fvals: Vec<f64> = simplex.iter().map(|x| f(x)).collect();

        for _iter in 0..self.max_iter {
            // order the vertices best to worst
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| fvals[a].total_cmp(&fvals[b]));
            let simplex_sorted: Vec<DVector<f64>> =
                order.iter().map(|&i| simplex[i].clone()).collect();
            let fvals_sorted: Vec<f64> = order.iter().map(|&i| fvals[i]).collect();
            simplex = simplex_sorted;
            fvals = fvals_sorted;

            if self.converged(&simplex, &fvals) {
                break;
            }

            // centroid of all vertices but the worst
            let mut centroid = DVector::zeros(n);
            for x in simplex.iter().take(n) {
                centroid += x;
            }
            centroid /= n as f64;

            let reflected = &centroid + (&centroid - &simplex[n]) * ALPHA;
            let f_reflected = f(&reflected);

            if f_reflected < fvals[0] {
                let expanded = &centroid + (&reflected - &centroid) * GAMMA;
                let f_expanded = f(&expanded);
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    fvals[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    fvals[n] = f_reflected;
                }
            } else if f_reflected < fvals[n - 1] {
                simplex[n] = reflected;
                fvals[n] = f_reflected;
            } else {
                // contraction toward the better of worst/reflected
                let contracted = if f_reflected < fvals[n] {
                    &centroid + (&reflected - &centroid) * RHO
                } else {
                    &centroid + (&simplex[n] - &centroid) * RHO
                };
                let f_contracted = f(&contracted);
                if f_contracted < fvals[n].min(f_reflected) {
                    simplex[n] = contracted;
                    fvals[n] = f_contracted;
                } else {
                    // shrink everything toward the best vertex
                    for i in 1..=n {
                        simplex[i] = &simplex[0] + (&simplex[i] - &simplex[0]) * SIGMA;
                        fvals[i] = f(&simplex[i]);
                    }
                }
            }
        }

        let mut best = 0;
        for i in 1..=n {
            if fvals[i] < fvals[best] {
                best = i;
            }
        }
        (simplex[best].clone(), fvals[best])
    }

    /// fminsearch-style stopping rule: the simplex is converged when both
    /// the value spread and the coordinate spread against the best vertex
    /// are within tolerance.
    fn converged(&self, simplex: &[DVector<f64>], fvals: &[f64]) -> bool {
        let f_spread = fvals
            .iter()
            .skip(1)
            .map(|fv| (fv - fvals[0]).abs())
            .fold(0.0, f64::max);
        let x_spread = simplex
            .iter()
            .skip(1)
            .map(|x| (x - &simplex[0]).amax())
            .fold(0.0, f64::max);
        f_spread <= self.f_tol && x_spread <= self.x_tol
    }
}
