//! Fitted parameters keyed by `(R, t)`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::{
    ParameterPoint, ParameterTimeSeries, PrecessionError, PrecessionRateEstimator,
    PrecessionSeries,
};
use crate::model::FitParameters;
use crate::phase::{
    PhaseDifferenceSeries, PhaseError, cross_quantity, cross_radius, wrap_to_start,
};
use crate::types::{Quantity, SliceKey};

/// Radius spacing assumed when a table has fewer than two radii (kpc).
pub const DEFAULT_RADIUS_SPACING: f64 = 1.0;

/// Height and velocity fits of one `(R, t)` slice.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub radius: f64,
    pub time: f64,
    pub height: FitParameters,
    pub velocity: FitParameters,
}

impl ParameterRecord {
    /// Create a record.
    pub fn new(key: SliceKey, height: FitParameters, velocity: FitParameters) -> Self {
        Self {
            radius: key.radius,
            time: key.time,
            height,
            velocity,
        }
    }

    /// The slice this record belongs to.
    pub fn key(&self) -> SliceKey {
        SliceKey::new(self.radius, self.time)
    }

    /// Parameters fitted to `quantity`.
    pub fn params(&self, quantity: Quantity) -> &FitParameters {
        match quantity {
            Quantity::Height => &self.height,
            Quantity::Velocity => &self.velocity,
        }
    }

    fn map(&self, f: impl Fn(&FitParameters) -> FitParameters) -> Self {
        Self {
            height: f(&self.height),
            velocity: f(&self.velocity),
            ..*self
        }
    }
}

/// Fitted parameter table with one record per `(R, t)`, sorted by key.
///
/// Derived views ([`normalized`](Self::normalized),
/// [`rewrap_phases`](Self::rewrap_phases)) return new tables.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterTable {
    records: Vec<ParameterRecord>,
    radius_spacing: Option<f64>,
}

impl ParameterTable {
    /// Create a table, sorting by `(R, t)`.
    ///
    /// When a key appears more than once (tables repeated per `phi`), the
    /// first record in input order is kept.
    pub fn new(mut records: Vec<ParameterRecord>) -> Self {
        let before = records.len();
        records.sort_by(|a, b| a.key().cmp(&b.key()));
        records.dedup_by(|later, earlier| later.key() == earlier.key());

        let duplicates = before - records.len();
        if duplicates > 0 {
            debug!(duplicates, "collapsed repeated (R, t) rows");
        }

        Self {
            records,
            radius_spacing: None,
        }
    }

    /// Use a fixed radius spacing for selection checks.
    pub fn with_radius_spacing(mut self, spacing: f64) -> Self {
        self.radius_spacing = Some(spacing);
        self
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in `(R, t)` order.
    pub fn records(&self) -> &[ParameterRecord] {
        &self.records
    }

    /// Record for one slice.
    pub fn get(&self, key: SliceKey) -> Option<&ParameterRecord> {
        self.records
            .binary_search_by(|r| r.key().cmp(&key))
            .ok()
            .map(|i| &self.records[i])
    }

    /// Distinct radii, ascending.
    pub fn radii(&self) -> Vec<f64> {
        let mut radii: Vec<f64> = self.records.iter().map(|r| r.radius).collect();
        radii.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
        radii
    }

    /// Distinct times, ascending.
    pub fn times(&self) -> Vec<f64> {
        let mut times: Vec<f64> = self.records.iter().map(|r| r.time).collect();
        times.sort_by(f64::total_cmp);
        times.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
        times
    }

    /// Spacing between adjacent radii.
    ///
    /// The configured spacing if set, otherwise the smallest gap between
    /// distinct radii, otherwise [`DEFAULT_RADIUS_SPACING`].
    pub fn radius_spacing(&self) -> f64 {
        if let Some(spacing) = self.radius_spacing {
            return spacing;
        }
        self.radii()
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .filter(|gap| *gap > 0.0)
            .min_by(f64::total_cmp)
            .unwrap_or(DEFAULT_RADIUS_SPACING)
    }

    /// Time series of `quantity` at one radius (empty if the radius is absent).
    pub fn series(&self, radius: f64, quantity: Quantity) -> ParameterTimeSeries {
        let points = self
            .records
            .iter()
            .filter(|r| r.radius == radius)
            .map(|r| ParameterPoint::new(r.time, *r.params(quantity)))
            .collect();
        ParameterTimeSeries::new(radius, quantity, points)
    }

    /// One time series of `quantity` per radius, ascending in radius.
    pub fn all_series(&self, quantity: Quantity) -> Vec<ParameterTimeSeries> {
        self.radii()
            .into_iter()
            .map(|radius| self.series(radius, quantity))
            .collect()
    }

    /// Table with both fits of every record normalised.
    pub fn normalized(&self) -> Self {
        self.map_records(|p| p.normalized())
    }

    /// Table with both phase columns wrapped into `[start, start + 360)`.
    pub fn rewrap_phases(&self, start: f64) -> Self {
        self.map_records(|p| FitParameters {
            phase: wrap_to_start(p.phase, start),
            ..*p
        })
    }

    fn map_records(&self, f: impl Fn(&FitParameters) -> FitParameters) -> Self {
        Self {
            records: self.records.iter().map(|r| r.map(&f)).collect(),
            radius_spacing: self.radius_spacing,
        }
    }

    /// Height minus velocity phase over time at one radius.
    pub fn phase_difference(&self, radius: f64) -> Result<PhaseDifferenceSeries, PhaseError> {
        cross_quantity(
            &self.series(radius, Quantity::Height),
            &self.series(radius, Quantity::Velocity),
        )
    }

    /// Phase differences of `quantity` between adjacent selected radii.
    ///
    /// # Errors
    /// - `NonConsecutiveSelection` if the sorted selection is not spaced at
    ///   [`radius_spacing`](Self::radius_spacing)
    pub fn radial_phase_differences(
        &self,
        selection: &[f64],
        quantity: Quantity,
    ) -> Result<Vec<PhaseDifferenceSeries>, PhaseError> {
        cross_radius(
            &self.all_series(quantity),
            selection,
            quantity,
            self.radius_spacing(),
        )
    }

    /// Precession rate over time at one radius.
    pub fn precession(
        &self,
        radius: f64,
        estimator: &PrecessionRateEstimator,
    ) -> Result<PrecessionSeries, PrecessionError> {
        estimator.estimate_series(
            &self.series(radius, Quantity::Height),
            &self.series(radius, Quantity::Velocity),
        )
    }
}
