//! Warp precession rate from height and velocity amplitudes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::ParameterTimeSeries;
use crate::types::Quantity;

/// Circular rotation speed of the disc (km/s).
pub const V_PHI: f64 = 230.0;

/// Error type for precession estimates.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum PrecessionError {
    /// Height amplitude is zero, so the amplitude ratio is undefined
    #[error("Height amplitude is zero at R = {radius}; amplitude ratio undefined")]
    DivisionByZero { radius: f64 },

    /// Radius is not a positive finite number
    #[error("Invalid radius: {0} (must be positive and finite)")]
    InvalidRadius(f64),

    /// Height and velocity series belong to different radii
    #[error("Radius mismatch: height at {height}, velocity at {velocity}")]
    RadiusMismatch { height: f64, velocity: f64 },

    /// A series holds the wrong quantity
    #[error("Expected a {expected} series, got {found}")]
    WrongQuantity { expected: Quantity, found: Quantity },
}

/// Precession rate at one time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrecessionPoint {
    /// Time in Gyr
    pub time: f64,
    /// Ω_warp in km/s/kpc
    pub omega: f64,
}

/// A time at which no rate could be computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkippedPoint {
    pub time: f64,
    pub reason: PrecessionError,
}

/// Precession rates of one radius, ascending in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrecessionSeries {
    /// Radius in kpc
    pub radius: f64,
    /// Computed rates
    pub points: Vec<PrecessionPoint>,
    /// Times left out of `points`, with the reason
    pub skipped: Vec<SkippedPoint>,
}

impl PrecessionSeries {
    /// Number of computed rates.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if no rate was computed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get times as a vector.
    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.time).collect()
    }

    /// Get rates as a vector.
    pub fn omegas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.omega).collect()
    }
}

/// Estimates `Ω_warp = v_φ / R − |A_v| / |A_h|` point by point.
///
/// Each `(R, t)` is computed independently; nothing is smoothed or
/// interpolated across time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrecessionRateEstimator {
    /// Disc rotation speed v_φ (km/s)
    pub rotation_speed: f64,
}

impl Default for PrecessionRateEstimator {
    fn default() -> Self {
        Self::new(V_PHI)
    }
}

impl PrecessionRateEstimator {
    /// Create an estimator with a custom rotation speed.
    pub fn new(rotation_speed: f64) -> Self {
        Self { rotation_speed }
    }

    /// Precession rate for one radius and pair of amplitudes.
    ///
    /// Amplitudes are taken by magnitude, so raw fit output gives the same
    /// result as normalised parameters.
    ///
    /// # Errors
    /// - `InvalidRadius` if `radius <= 0` or not finite
    /// - `DivisionByZero` if `height_amplitude == 0`
    pub fn estimate(
        &self,
        radius: f64,
        height_amplitude: f64,
        velocity_amplitude: f64,
    ) -> Result<f64, PrecessionError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PrecessionError::InvalidRadius(radius));
        }
        if height_amplitude == 0.0 {
            return Err(PrecessionError::DivisionByZero { radius });
        }

        Ok(self.rotation_speed / radius - velocity_amplitude.abs() / height_amplitude.abs())
    }

    /// Precession rate at every time shared by a height and a velocity series.
    ///
    /// Points with a zero height amplitude are recorded in
    /// [`PrecessionSeries::skipped`] and the series continues.
    ///
    /// # Errors
    /// - `WrongQuantity` if the arguments are not height then velocity
    /// - `RadiusMismatch` if the series belong to different radii
    /// - `InvalidRadius` if the shared radius is not positive
    pub fn estimate_series(
        &self,
        height: &ParameterTimeSeries,
        velocity: &ParameterTimeSeries,
    ) -> Result<PrecessionSeries, PrecessionError> {
        if height.quantity != Quantity::Height {
            return Err(PrecessionError::WrongQuantity {
                expected: Quantity::Height,
                found: height.quantity,
            });
        }
        if velocity.quantity != Quantity::Velocity {
            return Err(PrecessionError::WrongQuantity {
                expected: Quantity::Velocity,
                found: velocity.quantity,
            });
        }
        if height.radius != velocity.radius {
            return Err(PrecessionError::RadiusMismatch {
                height: height.radius,
                velocity: velocity.radius,
            });
        }

        let radius = height.radius;
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PrecessionError::InvalidRadius(radius));
        }

        let mut points = Vec::new();
        let mut skipped = Vec::new();

        for (time, h, v) in height.inner_join(velocity) {
            match self.estimate(radius, h.amplitude, v.amplitude) {
                Ok(omega) => points.push(PrecessionPoint { time, omega }),
                Err(reason) => {
                    debug!(radius, time, %reason, "skipping precession point");
                    skipped.push(SkippedPoint { time, reason });
                }
            }
        }

        Ok(PrecessionSeries {
            radius,
            points,
            skipped,
        })
    }
}
