//! Levenberg-Marquardt solver for the three-parameter sine model.
//!
//! Each iteration solves the damped normal equations
//!
//! ```text
//! (JᵀJ + λ diag(JᵀJ)) δ = Jᵀr
//! ```
//!
//! for the weighted residuals `r = w (y − f)`. Accepted steps shrink `λ`,
//! rejected steps grow it.

use std::time::Instant;

use faer::{Mat, linalg::solvers::Solve};

use super::{FitConfig, FitError, SineFitter, WeightedSamples};
use crate::model::FitParameters;

const N_PARAMS: usize = 3;
const DAMPING_FLOOR: f64 = 1e-12;
const MIN_DAMPING: f64 = 1e-15;
const MAX_DAMPING: f64 = 1e16;

/// Damped Gauss-Newton fit of `A sin(φ + C) + D`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LevenbergMarquardt {
    pub config: FitConfig,
}

impl LevenbergMarquardt {
    /// Create a solver with the given settings.
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }
}

/// `JᵀJ` and `Jᵀr` at `params`.
fn normal_equations(samples: &WeightedSamples, params: &FitParameters) -> (Mat<f64>, Mat<f64>) {
    let mut jtj = Mat::<f64>::zeros(N_PARAMS, N_PARAMS);
    let mut jtr = Mat::<f64>::zeros(N_PARAMS, 1);
    let deg = 1f64.to_radians();

    for ((&phi, &y), &w) in samples.phi.iter().zip(&samples.values).zip(&samples.weights) {
        let theta = (phi + params.phase).to_radians();
        let (sin, cos) = theta.sin_cos();
        let r = w * (y - (params.amplitude * sin + params.offset));
        // d/dA, d/dC (per degree), d/dD
        let row = [w * sin, w * params.amplitude * cos * deg, w];

        for i in 0..N_PARAMS {
            jtr[(i, 0)] += row[i] * r;
            for j in 0..N_PARAMS {
                jtj[(i, j)] += row[i] * row[j];
            }
        }
    }

    (jtj, jtr)
}

impl SineFitter for LevenbergMarquardt {
    fn name(&self) -> &'static str {
        "levenberg-marquardt"
    }

    fn solve(&self, samples: &WeightedSamples) -> Result<(FitParameters, usize), FitError> {
        let config = &self.config;
        let deadline = config.timeout().map(|t| Instant::now() + t);

        let mut params = samples.initial_guess();
        let mut chi2 = samples.chi_squared(&params);
        if !chi2.is_finite() {
            return Err(FitError::FitConvergence(
                "non-finite chi-squared at initial guess".to_string(),
            ));
        }

        // Exact-fit threshold relative to the data scale
        let scale: f64 = samples
            .values
            .iter()
            .zip(&samples.weights)
            .map(|(&y, &w)| (w * y).powi(2))
            .sum();
        let chi2_floor = scale * 1e-24;
        if chi2 <= chi2_floor {
            return Ok((params, 0));
        }

        let mut lambda = config.initial_damping;

        for iteration in 1..=config.max_iterations {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(FitError::FitConvergence(format!(
                    "timed out after {} iterations",
                    iteration - 1
                )));
            }

            let (jtj, jtr) = normal_equations(samples, &params);

            loop {
                let mut damped = jtj.clone();
                for i in 0..N_PARAMS {
                    damped[(i, i)] += lambda * jtj[(i, i)].max(DAMPING_FLOOR);
                }

                let lu = damped.as_ref().full_piv_lu();
                let delta = lu.solve(&jtr);
                let step = [delta[(0, 0)], delta[(1, 0)], delta[(2, 0)]];

                let trial = FitParameters::new(
                    params.amplitude + step[0],
                    params.phase + step[1],
                    params.offset + step[2],
                );
                let trial_chi2 = if trial.is_finite() {
                    samples.chi_squared(&trial)
                } else {
                    f64::INFINITY
                };

                if trial_chi2.is_finite() && trial_chi2 <= chi2 {
                    let reduction = chi2 - trial_chi2;
                    let step_norm = step.iter().map(|s| s * s).sum::<f64>().sqrt();
                    let param_norm = (params.amplitude.powi(2)
                        + params.phase.powi(2)
                        + params.offset.powi(2))
                    .sqrt();

                    let previous = chi2;
                    params = trial;
                    chi2 = trial_chi2;
                    lambda = (lambda / 10.0).max(MIN_DAMPING);

                    if chi2 <= chi2_floor
                        || reduction <= config.tolerance * previous
                        || step_norm <= config.tolerance * (param_norm + config.tolerance)
                    {
                        return Ok((params, iteration));
                    }
                    break;
                }

                lambda *= 10.0;
                if lambda > MAX_DAMPING {
                    // No descent direction left: already at the minimum
                    return Ok((params, iteration));
                }
            }
        }

        Err(FitError::FitConvergence(format!(
            "no convergence within {} iterations (chi2 = {:.3e})",
            config.max_iterations, chi2
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SineModel;
    use std::time::Duration;

    fn grid(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * 360.0 / n as f64).collect()
    }

    #[test]
    fn test_recovers_exact_sinusoid() {
        let phi = grid(36);
        let values = SineModel::evaluate_many(&phi, 2.0, 75.0, 0.5);
        let counts: Vec<u32> = (0..36).map(|i| 10 + i as u32 * 3).collect();

        let params = LevenbergMarquardt::default()
            .fit(&phi, &values, &counts)
            .unwrap()
            .normalized();

        assert!((params.amplitude - 2.0).abs() < 1e-6);
        assert!((params.phase - 75.0).abs() < 1e-4);
        assert!((params.offset - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_recovers_opposite_phase() {
        // Starting guess C₀ = 0 is a half turn away from the truth
        let phi = grid(24);
        let values = SineModel::evaluate_many(&phi, 0.3, 180.0, -0.1);
        let counts = vec![50; 24];

        let params = LevenbergMarquardt::default()
            .fit(&phi, &values, &counts)
            .unwrap()
            .normalized();

        assert!((params.amplitude - 0.3).abs() < 1e-6);
        assert!((params.phase - 180.0).abs() < 1e-3);
        assert!((params.offset + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_constant_profile() {
        let phi = grid(12);
        let values = vec![4.2; 12];
        let counts = vec![5; 12];

        let summary = LevenbergMarquardt::default()
            .fit_detailed(&phi, &values, &counts)
            .unwrap();

        assert!(summary.params.amplitude.abs() < 1e-9);
        assert!((summary.params.offset - 4.2).abs() < 1e-12);
        assert_eq!(summary.iterations, 0);
    }

    #[test]
    fn test_noisy_profile_converges() {
        let phi = grid(36);
        // Deterministic pseudo-noise
        let values: Vec<f64> = phi
            .iter()
            .enumerate()
            .map(|(i, &p)| SineModel::evaluate(p, 1.0, 300.0, 0.0) + 0.05 * ((i * 7 % 11) as f64 - 5.0) / 5.0)
            .collect();
        let counts = vec![100; 36];

        let summary = LevenbergMarquardt::default()
            .fit_detailed(&phi, &values, &counts)
            .unwrap();
        let params = summary.params.normalized();

        assert!((params.amplitude - 1.0).abs() < 0.05);
        assert!((params.phase - 300.0).abs() < 5.0);
        assert!(summary.r_squared > 0.95);
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        let phi = grid(36);
        let values = SineModel::evaluate_many(&phi, 2.0, 120.0, 0.0);
        let counts = vec![1; 36];

        let solver = LevenbergMarquardt::new(FitConfig::default().with_max_iterations(1));
        let result = solver.fit(&phi, &values, &counts);
        assert!(matches!(result, Err(FitError::FitConvergence(_))));
    }

    #[test]
    fn test_zero_timeout_fails() {
        let phi = grid(36);
        let values = SineModel::evaluate_many(&phi, 2.0, 120.0, 0.0);
        let counts = vec![1; 36];

        let solver = LevenbergMarquardt::new(FitConfig::default().with_timeout(Duration::ZERO));
        let result = solver.fit(&phi, &values, &counts);
        assert!(matches!(result, Err(FitError::FitConvergence(_))));
    }

    #[test]
    fn test_validation_runs_first() {
        let result = LevenbergMarquardt::default().fit(&[0.0, 90.0], &[1.0, 2.0], &[1, 1]);
        assert!(matches!(result, Err(FitError::InsufficientData { .. })));
    }
}
