//! Angular profile containers.

use serde::{Deserialize, Serialize};

use super::{Quantity, SliceKey};

/// One angular bin of a profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngularSample {
    /// Angular position (degrees)
    pub phi: f64,
    /// Binned mean value (height or velocity)
    pub value: f64,
    /// Number of particles in the bin
    pub count: u32,
}

impl AngularSample {
    /// Create a new sample.
    pub fn new(phi: f64, value: f64, count: u32) -> Self {
        Self { phi, value, count }
    }

    /// Fit uncertainty `1 / sqrt(N)`, or `None` for empty bins.
    pub fn sigma(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(1.0 / (self.count as f64).sqrt())
        }
    }
}

/// All angular bins of one quantity at one `(R, t)` slice.
///
/// Samples keep insertion order; they need not be sorted by `phi`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngularProfile {
    /// Slice this profile was taken from
    pub key: SliceKey,
    /// Which quantity the values hold
    pub quantity: Quantity,
    /// The samples
    pub samples: Vec<AngularSample>,
}

impl AngularProfile {
    /// Create an empty profile.
    pub fn new(key: SliceKey, quantity: Quantity) -> Self {
        Self {
            key,
            quantity,
            samples: Vec::new(),
        }
    }

    /// Create a profile from parallel arrays.
    ///
    /// # Panics
    ///
    /// Panics if the arrays have different lengths.
    pub fn from_arrays(
        key: SliceKey,
        quantity: Quantity,
        phi: &[f64],
        values: &[f64],
        counts: &[u32],
    ) -> Self {
        assert!(
            phi.len() == values.len() && values.len() == counts.len(),
            "phi, values and counts must have same length"
        );

        let samples = phi
            .iter()
            .zip(values)
            .zip(counts)
            .map(|((&phi, &value), &count)| AngularSample::new(phi, value, count))
            .collect();

        Self {
            key,
            quantity,
            samples,
        }
    }

    /// Append a sample.
    pub fn push(&mut self, sample: AngularSample) {
        self.samples.push(sample);
    }

    /// Number of samples (including empty bins).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the profile has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Angular positions.
    pub fn phis(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.phi).collect()
    }

    /// Binned values.
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Particle counts.
    pub fn counts(&self) -> Vec<u32> {
        self.samples.iter().map(|s| s.count).collect()
    }

    /// Number of samples usable for weighting (`N > 0`).
    pub fn n_weighted(&self) -> usize {
        self.samples.iter().filter(|s| s.count > 0).count()
    }
}
