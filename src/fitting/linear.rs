//! Closed-form weighted fit for the fixed-period sine model.
//!
//! With the period fixed at 360°, the model is linear in
//! `a = A cos C`, `b = A sin C` and `D`:
//!
//! ```text
//! A sin(φ + C) + D = a sin φ + b cos φ + D
//! ```
//!
//! so the weighted problem `y = X β` with rows `w [sin φ, cos φ, 1]` is solved
//! through the normal equations. Amplitude and phase are then recovered:
//!
//! ```text
//! A = √(a² + b²)
//! C = atan2(b, a)
//! ```

use faer::{Mat, linalg::solvers::Solve};

use super::{FitError, SineFitter, WeightedSamples};
use crate::model::FitParameters;

const N_UNKNOWNS: usize = 3;

/// Weighted linear least-squares sine fit.
///
/// Needs no starting guess or iterations; the result is the global χ²
/// minimum whenever the angles are not all equal modulo 180°.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinearLeastSquares;

impl SineFitter for LinearLeastSquares {
    fn name(&self) -> &'static str {
        "linear-least-squares"
    }

    fn solve(&self, samples: &WeightedSamples) -> Result<(FitParameters, usize), FitError> {
        let n_data = samples.len();

        // Weighted design matrix X = w [sin φ, cos φ, 1]
        let mut x = Mat::<f64>::zeros(n_data, N_UNKNOWNS);
        let mut y = Mat::<f64>::zeros(n_data, 1);
        for (k, ((&phi, &value), &w)) in samples
            .phi
            .iter()
            .zip(&samples.values)
            .zip(&samples.weights)
            .enumerate()
        {
            let (sin, cos) = phi.to_radians().sin_cos();
            x[(k, 0)] = w * sin;
            x[(k, 1)] = w * cos;
            x[(k, 2)] = w;
            y[(k, 0)] = w * value;
        }

        // X'X (symmetric, 3 × 3)
        let mut xtx = Mat::<f64>::zeros(N_UNKNOWNS, N_UNKNOWNS);
        for i in 0..N_UNKNOWNS {
            for j in 0..N_UNKNOWNS {
                let mut sum = 0.0;
                for k in 0..n_data {
                    sum += x[(k, i)] * x[(k, j)];
                }
                xtx[(i, j)] = sum;
            }
        }

        // X'y
        let mut xty = Mat::<f64>::zeros(N_UNKNOWNS, 1);
        for i in 0..N_UNKNOWNS {
            let mut sum = 0.0;
            for k in 0..n_data {
                sum += x[(k, i)] * y[(k, 0)];
            }
            xty[(i, 0)] = sum;
        }

        let lu = xtx.as_ref().full_piv_lu();
        let beta = lu.solve(&xty);

        let a = beta[(0, 0)];
        let b = beta[(1, 0)];
        let offset = beta[(2, 0)];

        let params = FitParameters::new(a.hypot(b), b.atan2(a).to_degrees(), offset);
        if !params.is_finite() {
            return Err(FitError::FitConvergence(
                "singular design matrix (angles do not span the circle)".to_string(),
            ));
        }

        Ok((params, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitting::LevenbergMarquardt;
    use crate::model::SineModel;

    fn grid(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * 360.0 / n as f64).collect()
    }

    #[test]
    fn test_recovers_exact_sinusoid() {
        let phi = grid(36);
        let values = SineModel::evaluate_many(&phi, 0.8, 250.0, -0.2);
        let counts = vec![30; 36];

        let params = LinearLeastSquares
            .fit(&phi, &values, &counts)
            .unwrap()
            .normalized();

        assert!((params.amplitude - 0.8).abs() < 1e-10);
        assert!((params.phase - 250.0).abs() < 1e-8);
        assert!((params.offset + 0.2).abs() < 1e-10);
    }

    #[test]
    fn test_amplitude_non_negative() {
        let phi = grid(12);
        let values = SineModel::evaluate_many(&phi, -1.0, 10.0, 0.0);
        let params = LinearLeastSquares.fit(&phi, &values, &[7; 12]).unwrap();

        assert!(params.amplitude >= 0.0);
        assert!((params.amplitude - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_agrees_with_levenberg_marquardt() {
        let phi = grid(36);
        let values: Vec<f64> = phi
            .iter()
            .enumerate()
            .map(|(i, &p)| SineModel::evaluate(p, 46.0, 135.0, 2.0) + ((i * 5 % 7) as f64 - 3.0))
            .collect();
        let counts: Vec<u32> = (0..36).map(|i| 20 + (i * 13 % 17) as u32).collect();

        let linear = LinearLeastSquares
            .fit_detailed(&phi, &values, &counts)
            .unwrap();
        let lm = LevenbergMarquardt::default()
            .fit_detailed(&phi, &values, &counts)
            .unwrap();

        let a = linear.params.normalized();
        let b = lm.params.normalized();
        assert!((a.amplitude - b.amplitude).abs() < 1e-4);
        assert!((a.phase - b.phase).abs() < 1e-4);
        assert!((a.offset - b.offset).abs() < 1e-4);
        assert!((linear.chi_squared - lm.chi_squared).abs() < 1e-6 * linear.chi_squared.max(1.0));
    }
}
