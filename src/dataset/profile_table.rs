//! Raw binned profiles keyed by `(R, t, phi)`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::heatmap::{HeatMap, PolarPoint};
use crate::types::{AngularProfile, AngularSample, Quantity, SliceKey};

/// One `(R, t, phi)` bin of the simulation output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Radial bin centre (kpc)
    pub radius: f64,
    /// Simulation time (Gyr)
    pub time: f64,
    /// Angular bin position (degrees)
    pub phi: f64,
    /// Particles in the bin
    pub count: u32,
    /// Mean height `Zmean` (kpc)
    pub height: f64,
    /// Mean vertical velocity `vZ_mean` (km/s)
    pub velocity: f64,
}

impl ProfileRecord {
    /// The binned value of `quantity`.
    pub fn value(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Height => self.height,
            Quantity::Velocity => self.velocity,
        }
    }

    /// The slice this bin belongs to.
    pub fn key(&self) -> SliceKey {
        SliceKey::new(self.radius, self.time)
    }
}

fn record_order(a: &ProfileRecord, b: &ProfileRecord) -> Ordering {
    a.radius
        .total_cmp(&b.radius)
        .then(a.time.total_cmp(&b.time))
        .then(a.phi.total_cmp(&b.phi))
}

/// Sorted distinct values of one column.
fn distinct(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
    values
}

/// Binned profile table, sorted by `(R, t, phi)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileTable {
    records: Vec<ProfileRecord>,
}

impl ProfileTable {
    /// Create a table, sorting the records by `(R, t, phi)`.
    pub fn new(mut records: Vec<ProfileRecord>) -> Self {
        records.sort_by(record_order);
        Self { records }
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no bins.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All bins in `(R, t, phi)` order.
    pub fn records(&self) -> &[ProfileRecord] {
        &self.records
    }

    /// Distinct radii, ascending.
    pub fn radii(&self) -> Vec<f64> {
        distinct(self.records.iter().map(|r| r.radius).collect())
    }

    /// Distinct times, ascending.
    pub fn times(&self) -> Vec<f64> {
        distinct(self.records.iter().map(|r| r.time).collect())
    }

    /// Distinct angular positions, ascending.
    pub fn phis(&self) -> Vec<f64> {
        distinct(self.records.iter().map(|r| r.phi).collect())
    }

    /// Distinct `(R, t)` slices, ascending.
    pub fn slice_keys(&self) -> Vec<SliceKey> {
        let mut keys: Vec<SliceKey> = self.records.iter().map(ProfileRecord::key).collect();
        keys.dedup();
        keys
    }

    /// Bins of one slice in `phi` order (empty if absent).
    pub fn slice(&self, key: SliceKey) -> &[ProfileRecord] {
        let slice_order = |r: &ProfileRecord| {
            r.radius
                .total_cmp(&key.radius)
                .then(r.time.total_cmp(&key.time))
        };
        let start = self
            .records
            .partition_point(|r| slice_order(r) == Ordering::Less);
        let end = self
            .records
            .partition_point(|r| slice_order(r) != Ordering::Greater);
        &self.records[start..end]
    }

    /// Angular profile of `quantity` for one slice.
    ///
    /// Bins with a non-finite angle or value are left out. Returns `None`
    /// when the slice has no usable bins.
    pub fn profile(&self, key: SliceKey, quantity: Quantity) -> Option<AngularProfile> {
        let bins = self.slice(key);
        let mut profile = AngularProfile::new(key, quantity);

        for record in bins {
            let value = record.value(quantity);
            if record.phi.is_finite() && value.is_finite() {
                profile.push(AngularSample::new(record.phi, value, record.count));
            }
        }

        let dropped = bins.len() - profile.len();
        if dropped > 0 {
            debug!(%key, %quantity, dropped, "dropped non-finite bins from profile");
        }

        if profile.is_empty() { None } else { Some(profile) }
    }

    /// `(t, value)` evolution of one angular bin at one radius.
    pub fn phi_series(&self, phi: f64, radius: f64, quantity: Quantity) -> Vec<(f64, f64)> {
        self.records
            .iter()
            .filter(|r| {
                r.radius.total_cmp(&radius) == Ordering::Equal
                    && r.phi.total_cmp(&phi) == Ordering::Equal
            })
            .map(|r| (r.time, r.value(quantity)))
            .collect()
    }

    /// Bins at one time, in `(R, phi)` order.
    fn at_time(&self, time: f64) -> impl Iterator<Item = &ProfileRecord> {
        self.records
            .iter()
            .filter(move |r| r.time.total_cmp(&time) == Ordering::Equal)
    }

    /// Pivot one time slice to an `R × phi` grid.
    ///
    /// Returns `None` if no bin has this time.
    pub fn heat_map(&self, time: f64, quantity: Quantity) -> Option<HeatMap> {
        let records: Vec<&ProfileRecord> = self.at_time(time).collect();
        if records.is_empty() {
            return None;
        }

        let radii = distinct(records.iter().map(|r| r.radius).collect());
        let phis = distinct(records.iter().map(|r| r.phi).collect());
        let mut values = vec![vec![None; phis.len()]; radii.len()];

        for record in records {
            let row = radii.binary_search_by(|r| r.total_cmp(&record.radius));
            let col = phis.binary_search_by(|p| p.total_cmp(&record.phi));
            if let (Ok(i), Ok(j)) = (row, col) {
                // Duplicate bins keep the first value
                if values[i][j].is_none() {
                    values[i][j] = Some(record.value(quantity));
                }
            }
        }

        Some(HeatMap {
            time,
            quantity,
            radii,
            phis,
            values,
        })
    }

    /// Cartesian projection `x = R cos φ`, `y = R sin φ` of one time slice.
    pub fn polar_points(&self, time: f64, quantity: Quantity) -> Vec<PolarPoint> {
        self.at_time(time)
            .map(|r| PolarPoint::new(r.radius, r.phi, r.value(quantity)))
            .collect()
    }
}
