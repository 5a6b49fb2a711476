//! Weighted least-squares fitting of the sine model to angular profiles.
//!
//! # Objective
//!
//! Each sample carries a particle count `N`; its uncertainty is
//! `σ = 1/√N` and the fit minimises
//!
//! ```text
//! χ² = Σᵢ ((yᵢ − A sin(φᵢ + C) − D) / σᵢ)²
//! ```
//!
//! Samples with `N = 0` carry no weight and are removed before fitting.
//!
//! # Solvers
//!
//! - [`LevenbergMarquardt`]: damped Gauss-Newton directly on `(A, C, D)`,
//!   started from `A₀ = (max − min)/2`, `C₀ = 0`, `D₀ = mean`.
//! - [`LinearLeastSquares`]: closed-form solve in `(A cos C, A sin C, D)`,
//!   which is exact for a fixed period.
//!
//! Both return raw parameters; normalise them with
//! [`FitParameters::normalized`](crate::model::FitParameters::normalized).
//!
//! # Example
//!
//! ```
//! use warp_rs::fitting::{LevenbergMarquardt, SineFitter};
//! use warp_rs::model::SineModel;
//!
//! let phi: Vec<f64> = (0..36).map(|i| i as f64 * 10.0).collect();
//! let values = SineModel::evaluate_many(&phi, 1.5, 40.0, 0.2);
//! let counts = vec![100; phi.len()];
//!
//! let params = LevenbergMarquardt::default()
//!     .fit(&phi, &values, &counts)
//!     .unwrap()
//!     .normalized();
//! assert!((params.amplitude - 1.5).abs() < 1e-6);
//! assert!((params.phase - 40.0).abs() < 1e-4);
//! ```

mod batch;
mod levenberg;
mod linear;

#[cfg(feature = "parallel")]
pub use batch::fit_profiles_parallel;
pub use batch::{BatchFitReport, SliceFailure, fit_profiles};
pub use levenberg::LevenbergMarquardt;
pub use linear::LinearLeastSquares;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{FitParameters, SineModel};
use crate::types::AngularProfile;

/// Number of free parameters of the sine model.
pub const MIN_SAMPLES: usize = 3;

/// Error type for curve fitting.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum FitError {
    /// Input arrays differ in length
    #[error("Length mismatch: {phi} angles, {values} values, {counts} counts")]
    LengthMismatch {
        phi: usize,
        values: usize,
        counts: usize,
    },

    /// Too few usable samples for three free parameters
    #[error("Insufficient data: need at least {required} samples, found {found}")]
    InsufficientData { required: usize, found: usize },

    /// Every sample has a zero count, so no sample carries weight
    #[error("All samples have zero count; weights 1/sqrt(N) undefined")]
    DegenerateWeight,

    /// A weighted sample has a non-finite angle or value
    #[error("Sample {index} has a non-finite angle or value")]
    NonFiniteSample { index: usize },

    /// The solver did not reach a finite minimum
    #[error("Fit did not converge: {0}")]
    FitConvergence(String),
}

/// Solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Maximum number of accepted iterations
    pub max_iterations: usize,
    /// Relative χ² reduction (and step size) below which the fit has converged
    pub tolerance: f64,
    /// Starting Levenberg-Marquardt damping factor
    pub initial_damping: f64,
    /// Wall-clock limit per fit, in milliseconds
    pub timeout_ms: Option<u64>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-10,
            initial_damping: 1e-3,
            timeout_ms: None,
        }
    }
}

impl FitConfig {
    /// Tight convergence for reference fits.
    ///
    /// - max_iterations: 1000
    /// - tolerance: 1e-14
    pub fn strict() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-14,
            ..Self::default()
        }
    }

    /// Loose convergence with a deadline, for interactive use.
    ///
    /// - max_iterations: 50
    /// - tolerance: 1e-6
    /// - timeout: 100 ms
    pub fn quick() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-6,
            initial_damping: 1e-2,
            timeout_ms: Some(100),
        }
    }

    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the per-fit deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    /// The per-fit deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Samples that passed validation, with weights `w = √N = 1/σ`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSamples {
    pub phi: Vec<f64>,
    pub values: Vec<f64>,
    pub weights: Vec<f64>,
}

impl WeightedSamples {
    /// Number of weighted samples.
    pub fn len(&self) -> usize {
        self.phi.len()
    }

    /// Check if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.phi.is_empty()
    }

    /// Weighted χ² of `params` against the samples.
    pub fn chi_squared(&self, params: &FitParameters) -> f64 {
        self.phi
            .iter()
            .zip(&self.values)
            .zip(&self.weights)
            .map(|((&phi, &y), &w)| {
                let r = w * (y - params.evaluate(phi));
                r * r
            })
            .sum()
    }

    /// Initial guess `A₀ = (max − min)/2`, `C₀ = 0`, `D₀ = mean`.
    pub fn initial_guess(&self) -> FitParameters {
        let (min, max) = self
            .values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let mean = self.values.iter().sum::<f64>() / self.values.len().max(1) as f64;
        FitParameters::new((max - min) / 2.0, 0.0, mean)
    }
}

/// Validate raw fit inputs and drop zero-count samples.
///
/// Checks, in order: equal lengths, at least three samples, at least one
/// non-zero count, at least three non-zero counts, finite weighted samples.
///
/// # Errors
/// `LengthMismatch`, `InsufficientData`, `DegenerateWeight` or
/// `NonFiniteSample` as listed above.
pub fn prepare_samples(
    phi: &[f64],
    observed: &[f64],
    counts: &[u32],
) -> Result<WeightedSamples, FitError> {
    if phi.len() != observed.len() || observed.len() != counts.len() {
        return Err(FitError::LengthMismatch {
            phi: phi.len(),
            values: observed.len(),
            counts: counts.len(),
        });
    }
    if phi.len() < MIN_SAMPLES {
        return Err(FitError::InsufficientData {
            required: MIN_SAMPLES,
            found: phi.len(),
        });
    }
    if counts.iter().all(|&n| n == 0) {
        return Err(FitError::DegenerateWeight);
    }

    let weighted = counts.iter().filter(|&&n| n > 0).count();
    if weighted < MIN_SAMPLES {
        return Err(FitError::InsufficientData {
            required: MIN_SAMPLES,
            found: weighted,
        });
    }

    let mut samples = WeightedSamples {
        phi: Vec::with_capacity(weighted),
        values: Vec::with_capacity(weighted),
        weights: Vec::with_capacity(weighted),
    };
    for (index, ((&p, &y), &n)) in phi.iter().zip(observed).zip(counts).enumerate() {
        if n == 0 {
            continue;
        }
        if !(p.is_finite() && y.is_finite()) {
            return Err(FitError::NonFiniteSample { index });
        }
        samples.phi.push(p);
        samples.values.push(y);
        samples.weights.push((n as f64).sqrt());
    }

    Ok(samples)
}

/// Fit result with goodness-of-fit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    /// Raw fitted parameters
    pub params: FitParameters,
    /// Weighted χ² at the solution
    pub chi_squared: f64,
    /// Weighted coefficient of determination
    pub r_squared: f64,
    /// Solver iterations used (1 for the closed-form solver)
    pub iterations: usize,
    /// Number of weighted samples used
    pub n_samples: usize,
}

impl FitSummary {
    fn compute(samples: &WeightedSamples, params: FitParameters, iterations: usize) -> Self {
        let chi_squared = samples.chi_squared(&params);

        let w2_sum: f64 = samples.weights.iter().map(|w| w * w).sum();
        let weighted_mean = samples
            .values
            .iter()
            .zip(&samples.weights)
            .map(|(&y, &w)| w * w * y)
            .sum::<f64>()
            / w2_sum;
        let ss_tot: f64 = samples
            .values
            .iter()
            .zip(&samples.weights)
            .map(|(&y, &w)| w * w * (y - weighted_mean).powi(2))
            .sum();

        let r_squared = if ss_tot > 0.0 {
            1.0 - chi_squared / ss_tot
        } else {
            1.0
        };

        Self {
            params,
            chi_squared,
            r_squared,
            iterations,
            n_samples: samples.len(),
        }
    }

    /// Residuals `y − f(φ)` of the fit at the given samples.
    pub fn residuals(&self, phi: &[f64], observed: &[f64]) -> Vec<f64> {
        let fitted = SineModel::evaluate_many(
            phi,
            self.params.amplitude,
            self.params.phase,
            self.params.offset,
        );
        observed.iter().zip(fitted).map(|(y, f)| y - f).collect()
    }
}

/// A solver for the weighted sine fit.
///
/// Implementors only provide [`solve`](SineFitter::solve); validation and
/// diagnostics are shared.
pub trait SineFitter: Sync {
    /// Short solver name for logs.
    fn name(&self) -> &'static str;

    /// Fit validated samples, returning raw parameters and iterations used.
    fn solve(&self, samples: &WeightedSamples) -> Result<(FitParameters, usize), FitError>;

    /// Fit raw `(φ, value, N)` arrays; result is not normalised.
    fn fit(&self, phi: &[f64], observed: &[f64], counts: &[u32]) -> Result<FitParameters, FitError> {
        let samples = prepare_samples(phi, observed, counts)?;
        self.solve(&samples).map(|(params, _)| params)
    }

    /// Fit and report goodness-of-fit.
    fn fit_detailed(
        &self,
        phi: &[f64],
        observed: &[f64],
        counts: &[u32],
    ) -> Result<FitSummary, FitError> {
        let samples = prepare_samples(phi, observed, counts)?;
        let (params, iterations) = self.solve(&samples)?;
        Ok(FitSummary::compute(&samples, params, iterations))
    }

    /// Fit an [`AngularProfile`].
    fn fit_profile(&self, profile: &AngularProfile) -> Result<FitParameters, FitError> {
        self.fit(&profile.phis(), &profile.values(), &profile.counts())
    }
}
