//! Time-series views of fitted parameters and derived warp diagnostics.
//!
//! This module provides tools for:
//! - Following the fitted `(A, C, D)` of one radius and quantity over time
//! - Joining two such series on shared sample times
//! - Estimating the warp precession rate from amplitude ratios
//!
//! # Mathematical Background
//!
//! For a warp of height amplitude `A_h` and vertical-velocity amplitude `A_v`
//! at radius `R`, the pattern speed relative to the disc rotation is
//! estimated as:
//!
//! ```text
//! Ω_warp = v_φ / R − |A_v| / |A_h|
//! ```
//!
//! # Example
//!
//! ```
//! use warp_rs::analysis::{ParameterPoint, ParameterTimeSeries, PrecessionRateEstimator};
//! use warp_rs::model::FitParameters;
//! use warp_rs::types::Quantity;
//!
//! let height = ParameterTimeSeries::new(
//!     8.5,
//!     Quantity::Height,
//!     vec![ParameterPoint::new(0.0, FitParameters::new(0.2, 30.0, 0.0))],
//! );
//! let velocity = ParameterTimeSeries::new(
//!     8.5,
//!     Quantity::Velocity,
//!     vec![ParameterPoint::new(0.0, FitParameters::new(46.0, 120.0, 0.0))],
//! );
//!
//! let series = PrecessionRateEstimator::default()
//!     .estimate_series(&height, &velocity)
//!     .unwrap();
//! assert!((series.points[0].omega - (-202.94)).abs() < 0.01);
//! ```

mod precession;

pub use precession::{
    PrecessionError, PrecessionPoint, PrecessionRateEstimator, PrecessionSeries, SkippedPoint,
    V_PHI,
};

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::FitParameters;
use crate::phase::wrap_to_start;
use crate::types::Quantity;

/// Fitted parameters at one sample time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterPoint {
    /// Time in Gyr
    pub time: f64,
    /// Fitted sinusoid parameters
    pub params: FitParameters,
}

impl ParameterPoint {
    /// Create a point.
    pub fn new(time: f64, params: FitParameters) -> Self {
        Self {
            time: time + 0.0,
            params,
        }
    }
}

/// Fitted parameters of one quantity at one radius, ordered by time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterTimeSeries {
    /// Radius in kpc
    pub radius: f64,
    /// Which profile the parameters were fitted to
    pub quantity: Quantity,
    /// The data points, ascending in time
    pub data: Vec<ParameterPoint>,
}

impl ParameterTimeSeries {
    /// Create a series, sorting the points by time.
    pub fn new(radius: f64, quantity: Quantity, mut data: Vec<ParameterPoint>) -> Self {
        data.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            radius,
            quantity,
            data,
        }
    }

    /// Create a series from parallel arrays of times and parameters.
    ///
    /// # Panics
    ///
    /// Panics if `times` and `params` have different lengths.
    pub fn from_arrays(
        radius: f64,
        quantity: Quantity,
        times: &[f64],
        params: &[FitParameters],
    ) -> Self {
        assert_eq!(
            times.len(),
            params.len(),
            "times and params must have same length"
        );

        let data = times
            .iter()
            .zip(params.iter())
            .map(|(&time, &params)| ParameterPoint { time, params })
            .collect();

        Self::new(radius, quantity, data)
    }

    /// Number of data points.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Duration of the series (last time - first time).
    pub fn duration(&self) -> f64 {
        match (self.data.first(), self.data.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Parameters at exactly `time`, if sampled.
    pub fn get(&self, time: f64) -> Option<&FitParameters> {
        self.data
            .binary_search_by(|p| p.time.total_cmp(&time))
            .ok()
            .map(|i| &self.data[i].params)
    }

    /// Get times as a vector.
    pub fn times(&self) -> Vec<f64> {
        self.data.iter().map(|p| p.time).collect()
    }

    /// Get amplitudes as a vector.
    pub fn amplitudes(&self) -> Vec<f64> {
        self.data.iter().map(|p| p.params.amplitude).collect()
    }

    /// Get phases (degrees) as a vector.
    pub fn phases(&self) -> Vec<f64> {
        self.data.iter().map(|p| p.params.phase).collect()
    }

    /// Get offsets as a vector.
    pub fn offsets(&self) -> Vec<f64> {
        self.data.iter().map(|p| p.params.offset).collect()
    }

    /// Mean amplitude over the series.
    pub fn mean_amplitude(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|p| p.params.amplitude).sum::<f64>() / self.data.len() as f64
    }

    /// Copy with every point normalised (`A >= 0`, `C` in `[0, 360)`).
    pub fn normalized(&self) -> Self {
        self.map_params(|p| p.normalized())
    }

    /// Copy with every phase wrapped into `[start, start + 360)`.
    pub fn rewrapped(&self, start: f64) -> Self {
        self.map_params(|p| FitParameters {
            phase: wrap_to_start(p.phase, start),
            ..*p
        })
    }

    fn map_params(&self, f: impl Fn(&FitParameters) -> FitParameters) -> Self {
        Self {
            radius: self.radius,
            quantity: self.quantity,
            data: self
                .data
                .iter()
                .map(|p| ParameterPoint::new(p.time, f(&p.params)))
                .collect(),
        }
    }

    /// Pair up points sampled at exactly the same time in both series.
    ///
    /// Times present in only one series are dropped. Output is ascending in
    /// time. Both series are already sorted, so this is a single merge pass.
    pub fn inner_join<'a>(
        &'a self,
        other: &'a Self,
    ) -> Vec<(f64, &'a FitParameters, &'a FitParameters)> {
        let mut joined = Vec::with_capacity(self.len().min(other.len()));
        let (mut i, mut j) = (0, 0);

        while i < self.data.len() && j < other.data.len() {
            let (a, b) = (&self.data[i], &other.data[j]);
            // `==` so that -0.0 and 0.0 pair up
            if a.time == b.time {
                joined.push((a.time, &a.params, &b.params));
                i += 1;
                j += 1;
            } else if a.time.total_cmp(&b.time) == Ordering::Less {
                i += 1;
            } else {
                j += 1;
            }
        }

        joined
    }
}
