//! Quantity selector and slice keys.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The binned quantity an angular profile or fit refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    /// Mean vertical height of the bin (kpc).
    Height,
    /// Mean vertical velocity of the bin (km/s).
    Velocity,
}

impl Quantity {
    /// Both quantities, height first.
    pub const ALL: [Quantity; 2] = [Quantity::Height, Quantity::Velocity];

    /// Column name of the raw binned value in the profile table.
    pub fn column(self) -> &'static str {
        match self {
            Quantity::Height => "Zmean",
            Quantity::Velocity => "vZ_mean",
        }
    }

    /// Suffix used for the fitted parameter columns (`A_height`, `C_velocity`, ...).
    pub fn suffix(self) -> &'static str {
        match self {
            Quantity::Height => "height",
            Quantity::Velocity => "velocity",
        }
    }

    /// Physical unit of the quantity.
    pub fn unit(self) -> &'static str {
        match self {
            Quantity::Height => "kpc",
            Quantity::Velocity => "km/s",
        }
    }

    /// The other quantity.
    pub fn other(self) -> Self {
        match self {
            Quantity::Height => Quantity::Velocity,
            Quantity::Velocity => Quantity::Height,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Identifies one `(R, t)` slice of the dataset.
///
/// Ordering is by radius, then time, using IEEE total ordering so keys can be
/// sorted and used in ordered maps.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SliceKey {
    /// Radial bin centre (kpc)
    pub radius: f64,
    /// Simulation time (Gyr)
    pub time: f64,
}

impl SliceKey {
    /// Create a new slice key. `-0.0` is stored as `0.0`.
    pub fn new(radius: f64, time: f64) -> Self {
        Self {
            radius: radius + 0.0,
            time: time + 0.0,
        }
    }
}

impl PartialEq for SliceKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SliceKey {}

impl PartialOrd for SliceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SliceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.radius
            .total_cmp(&other.radius)
            .then_with(|| self.time.total_cmp(&other.time))
    }
}

impl fmt::Display for SliceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R={} t={}", self.radius, self.time)
    }
}
