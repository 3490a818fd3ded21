//! Damped least-squares (Levenberg-Marquardt) minimizer.
//!
//! Steps are taken in the form `dx = -Jᵀ (J Jᵀ + λI)⁻¹ r`, so every update
//! lies in the row space of the Jacobian. Started from zero on an affine
//! problem this converges to the minimum-norm solution, and a parameter whose
//! Jacobian column is zero is never moved.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// A residual function over a parameter vector.
pub trait LeastSquaresProblem {
    fn parameters(&self) -> usize;

    fn residuals(&self, x: &DVector<f64>) -> DVector<f64>;

    /// Jacobian of `residuals` at `x` (rows = residuals, cols = parameters).
    /// Defaults to central differences.
    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64> {
        numerical_jacobian(self, x)
    }
}

pub fn numerical_jacobian<P: LeastSquaresProblem + ?Sized>(problem: &P, x: &DVector<f64>) -> DMatrix<f64> {
    let n = problem.parameters();
    let m = problem.residuals(x).len();
    let mut jacobian = DMatrix::zeros(m, n);
    let mut probe = x.clone();
    for i in 0..n {
        let h = 1e-6 * (1.0 + x[i].abs());
        probe[i] = x[i] + h;
        let plus = problem.residuals(&probe);
        probe[i] = x[i] - h;
        let minus = problem.residuals(&probe);
        probe[i] = x[i];
        jacobian.set_column(i, &((plus - minus) / (2.0 * h)));
    }
    jacobian
}

/// Configuration for the minimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// Maximum iterations; the last accepted iterate is returned when hit.
    pub max_iterations: u32,
    /// Stop once the residual norm falls below this.
    pub residual_tolerance: f64,
    /// Stop once ‖Jᵀr‖ ≤ tol·‖J‖·‖r‖, i.e. the residual is orthogonal to
    /// every direction the parameters can move it (stationary point).
    pub gradient_tolerance: f64,
    /// Stop once a step is smaller than this relative to ‖x‖.
    pub step_tolerance: f64,
    /// Initial damping as a fraction of the largest diagonal of J Jᵀ.
    pub initial_damping: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            residual_tolerance: 1e-10,
            gradient_tolerance: 1e-10,
            step_tolerance: 1e-14,
            initial_damping: 1e-3,
        }
    }
}

/// Outcome of a minimization. Always carries a usable iterate.
#[derive(Debug, Clone, PartialEq)]
pub struct LmReport {
    pub x: DVector<f64>,
    pub iterations: u32,
    pub residual_norm: f64,
    pub converged: bool,
}

const MIN_DAMPING: f64 = 1e-30;

#[derive(Debug, Clone)]
pub struct LevenbergMarquardt {
    config: LmConfig,
}

impl LevenbergMarquardt {
    pub const fn new(config: LmConfig) -> Self { Self { config } }

    pub fn minimize<P: LeastSquaresProblem + ?Sized>(&self, problem: &P, x0: DVector<f64>) -> LmReport {
        debug_assert_eq!(x0.len(), problem.parameters());
        let cfg = &self.config;

        let mut x = x0;
        let mut r = problem.residuals(&x);
        let mut cost = r.norm_squared();
        let mut damping: Option<f64> = None;

        let report = |x: DVector<f64>, r: &DVector<f64>, iterations: u32, converged: bool| LmReport {
            x,
            iterations,
            residual_norm: r.norm(),
            converged,
        };

        for iteration in 0..cfg.max_iterations {
            if r.norm() <= cfg.residual_tolerance {
                return report(x, &r, iteration, true);
            }

            let j = problem.jacobian(&x);
            let jt = j.transpose();
            if (&jt * &r).norm() <= cfg.gradient_tolerance * j.norm() * r.norm() {
                return report(x, &r, iteration, true);
            }

            let jjt = &j * &jt;
            let lambda = *damping.get_or_insert_with(|| {
                let scale = jjt.diagonal().max();
                (cfg.initial_damping * scale).max(MIN_DAMPING)
            });
            let m = jjt.nrows();
            let damped = jjt + DMatrix::identity(m, m) * lambda;
            let Some(chol) = damped.cholesky() else {
                // Not positive definite even with damping; keep what we have.
                return report(x, &r, iteration, false);
            };
            let dx = -(&jt * chol.solve(&r));

            if dx.norm() <= cfg.step_tolerance * (x.norm() + cfg.step_tolerance) {
                return report(x, &r, iteration + 1, false);
            }

            let candidate = &x + &dx;
            let r_new = problem.residuals(&candidate);
            let cost_new = r_new.norm_squared();
            if cost_new < cost {
                x = candidate;
                r = r_new;
                cost = cost_new;
                damping = Some((lambda * 0.5).max(MIN_DAMPING));
            } else {
                damping = Some(lambda * 4.0);
            }
        }

        let converged = r.norm() <= cfg.residual_tolerance;
        report(x, &r, cfg.max_iterations, converged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// r(x) = A x - b
    struct Affine {
        a: DMatrix<f64>,
        b: DVector<f64>,
    }

    impl LeastSquaresProblem for Affine {
        fn parameters(&self) -> usize { self.a.ncols() }
        fn residuals(&self, x: &DVector<f64>) -> DVector<f64> { &self.a * x - &self.b }
        fn jacobian(&self, _x: &DVector<f64>) -> DMatrix<f64> { self.a.clone() }
    }

    /// Rosenbrock as residuals: (1 - x, 10 (y - x²)).
    struct Rosenbrock;

    impl LeastSquaresProblem for Rosenbrock {
        fn parameters(&self) -> usize { 2 }
        fn residuals(&self, x: &DVector<f64>) -> DVector<f64> {
            DVector::from_vec(vec![1.0 - x[0], 10.0 * (x[1] - x[0] * x[0])])
        }
    }

    #[test]
    fn underdetermined_affine_problem_gives_minimum_norm() {
        let problem = Affine {
            a: DMatrix::from_row_slice(2, 4, &[1.0, 1.0, 0.0, 0.0, 0.0, 1.0, -1.0, 0.0]),
            b: DVector::from_vec(vec![2.0, 1.0]),
        };
        let solver = LevenbergMarquardt::new(LmConfig::default());
        let out = solver.minimize(&problem, DVector::zeros(4));
        assert!(out.converged);
        let pinv = problem.a.clone().pseudo_inverse(1e-12).expect("pinv");
        assert_relative_eq!(out.x, pinv * &problem.b, epsilon = 1e-8);
        // untouched column stays exactly zero
        assert_eq!(out.x[3], 0.0);
    }

    #[test]
    fn nonlinear_problem_converges_with_numerical_jacobian() {
        let solver = LevenbergMarquardt::new(LmConfig { max_iterations: 200, ..LmConfig::default() });
        let out = solver.minimize(&Rosenbrock, DVector::from_vec(vec![-1.2, 1.0]));
        assert!(out.converged, "{out:?}");
        assert_relative_eq!(out.x, DVector::from_vec(vec![1.0, 1.0]), epsilon = 1e-6);
    }

    #[test]
    fn iteration_cap_returns_last_iterate() {
        let solver = LevenbergMarquardt::new(LmConfig { max_iterations: 1, ..LmConfig::default() });
        let x0 = DVector::from_vec(vec![-1.2, 1.0]);
        let initial = Rosenbrock.residuals(&x0).norm();
        let out = solver.minimize(&Rosenbrock, x0);
        assert!(!out.converged);
        assert_eq!(out.iterations, 1);
        assert!(out.residual_norm <= initial);
        assert!(out.x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn inconsistent_problem_stops_at_least_squares_optimum() {
        // x = 1 and x = 3 cannot both hold; optimum is x = 2.
        let problem = Affine {
            a: DMatrix::from_row_slice(2, 1, &[1.0, 1.0]),
            b: DVector::from_vec(vec![1.0, 3.0]),
        };
        let out = LevenbergMarquardt::new(LmConfig::default()).minimize(&problem, DVector::zeros(1));
        assert_relative_eq!(out.x[0], 2.0, epsilon = 1e-8);
        assert_relative_eq!(out.residual_norm, 2.0_f64.sqrt(), epsilon = 1e-8);
    }

    #[test]
    fn numerical_jacobian_matches_analytic_for_affine() {
        let problem = Affine {
            a: DMatrix::from_row_slice(2, 3, &[1.0, -2.0, 0.5, 0.0, 3.0, 4.0]),
            b: DVector::from_vec(vec![0.1, 0.2]),
        };
        let x = DVector::from_vec(vec![0.3, -0.7, 2.0]);
        assert_relative_eq!(numerical_jacobian(&problem, &x), problem.a, epsilon = 1e-8);
    }
}
