//! Fixed-period sine model and its parameters.

use serde::{Deserialize, Serialize};

use crate::phase::normalize_amplitude_phase;

/// The constrained 3-parameter sinusoid `A sin(radians(φ + C)) + D`.
///
/// No frequency parameter is exposed: a different period would not line up
/// with the 360° extent of every slice.
#[derive(Clone, Copy, Debug, Default)]
pub struct SineModel;

impl SineModel {
    /// Evaluate the model at `phi` degrees.
    #[inline]
    pub fn evaluate(phi: f64, amplitude: f64, phase: f64, offset: f64) -> f64 {
        amplitude * (phi + phase).to_radians().sin() + offset
    }

    /// Evaluate the model at every angle in `phis`.
    pub fn evaluate_many(phis: &[f64], amplitude: f64, phase: f64, offset: f64) -> Vec<f64> {
        phis.iter()
            .map(|&phi| Self::evaluate(phi, amplitude, phase, offset))
            .collect()
    }

    /// `n` evenly spaced angles covering `[0, 360]` inclusive.
    ///
    /// Returns `[0.0]` for `n == 1` and an empty vector for `n == 0`.
    pub fn angle_grid(n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![0.0],
            _ => {
                let step = 360.0 / (n - 1) as f64;
                (0..n).map(|i| i as f64 * step).collect()
            }
        }
    }
}

/// Fitted parameters of one angular profile.
///
/// Raw solver output may carry a negative amplitude and any phase; call
/// [`FitParameters::normalized`] to obtain the canonical form
/// (`amplitude >= 0`, `phase` in `[0, 360)`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitParameters {
    /// Amplitude A
    pub amplitude: f64,
    /// Phase shift C (degrees)
    pub phase: f64,
    /// Vertical offset D
    pub offset: f64,
}

impl FitParameters {
    /// Create a parameter set.
    pub fn new(amplitude: f64, phase: f64, offset: f64) -> Self {
        Self {
            amplitude,
            phase,
            offset,
        }
    }

    /// Evaluate the fitted curve at `phi` degrees.
    #[inline]
    pub fn evaluate(&self, phi: f64) -> f64 {
        SineModel::evaluate(phi, self.amplitude, self.phase, self.offset)
    }

    /// Evaluate the fitted curve at every angle in `phis`.
    pub fn evaluate_many(&self, phis: &[f64]) -> Vec<f64> {
        SineModel::evaluate_many(phis, self.amplitude, self.phase, self.offset)
    }

    /// Sample the curve on `n` evenly spaced angles in `[0, 360]`.
    ///
    /// Returns `(phi, value)` pairs for overlaying the fit on raw bins.
    pub fn sample_curve(&self, n: usize) -> Vec<(f64, f64)> {
        SineModel::angle_grid(n)
            .into_iter()
            .map(|phi| (phi, self.evaluate(phi)))
            .collect()
    }

    /// Canonical form: non-negative amplitude, phase in `[0, 360)`.
    ///
    /// The offset is left unchanged.
    pub fn normalized(&self) -> Self {
        let (amplitude, phase) = normalize_amplitude_phase(self.amplitude, self.phase);
        Self {
            amplitude,
            phase,
            offset: self.offset,
        }
    }

    /// Check if the parameters are already in canonical form.
    pub fn is_normalized(&self) -> bool {
        self.amplitude >= 0.0 && (0.0..360.0).contains(&self.phase)
    }

    /// Check that all three parameters are finite.
    pub fn is_finite(&self) -> bool {
        self.amplitude.is_finite() && self.phase.is_finite() && self.offset.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_evaluate_quarter_turn() {
        let value = SineModel::evaluate(90.0, 2.0, 0.0, 1.0);
        assert!((value - 3.0).abs() < TOL);
    }

    #[test]
    fn test_evaluate_phase_shift() {
        // sin(0 + 90°) = 1
        assert!((SineModel::evaluate(0.0, 1.0, 90.0, 0.0) - 1.0).abs() < TOL);
        // sin(270°) = -1
        assert!((SineModel::evaluate(180.0, 1.0, 90.0, 0.5) - (-0.5)).abs() < TOL);
    }

    #[test]
    fn test_evaluate_many_same_length() {
        let phis = [0.0, 45.0, 90.0, 300.0];
        let values = SineModel::evaluate_many(&phis, 1.5, 20.0, -0.3);

        assert_eq!(values.len(), phis.len());
        for (&phi, &v) in phis.iter().zip(values.iter()) {
            assert!((v - SineModel::evaluate(phi, 1.5, 20.0, -0.3)).abs() < TOL);
        }
    }

    #[test]
    fn test_angle_grid() {
        let grid = SineModel::angle_grid(100);
        assert_eq!(grid.len(), 100);
        assert_eq!(grid[0], 0.0);
        assert!((grid[99] - 360.0).abs() < 1e-9);

        assert!(SineModel::angle_grid(0).is_empty());
        assert_eq!(SineModel::angle_grid(1), vec![0.0]);
    }

    #[test]
    fn test_sample_curve_is_periodic() {
        let params = FitParameters::new(0.4, 35.0, 0.1);
        let curve = params.sample_curve(13);

        let (first_phi, first) = curve[0];
        let (last_phi, last) = curve[12];
        assert_eq!(first_phi, 0.0);
        assert!((last_phi - 360.0).abs() < 1e-9);
        assert!((first - last).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_negative_amplitude() {
        let params = FitParameters::new(-3.0, 10.0, 0.7).normalized();

        assert!((params.amplitude - 3.0).abs() < TOL);
        assert!((params.phase - 190.0).abs() < TOL);
        assert!((params.offset - 0.7).abs() < TOL);
        assert!(params.is_normalized());
    }

    #[test]
    fn test_normalized_curve_unchanged() {
        // Normalisation must not change the curve itself
        let raw = FitParameters::new(-1.2, -400.0, 0.3);
        let canonical = raw.normalized();

        for phi in [0.0, 33.0, 127.0, 359.0] {
            assert!((raw.evaluate(phi) - canonical.evaluate(phi)).abs() < 1e-9);
        }
    }
}
