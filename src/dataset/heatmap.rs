//! Gridded and projected views of one time slice.

use serde::{Deserialize, Serialize};

use crate::types::Quantity;

/// One time slice pivoted to an `R × phi` grid.
///
/// `values[i][j]` holds the bin at `radii[i]`, `phis[j]`, or `None` if the
/// table has no such bin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatMap {
    pub time: f64,
    pub quantity: Quantity,
    /// Row coordinates, ascending
    pub radii: Vec<f64>,
    /// Column coordinates, ascending
    pub phis: Vec<f64>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl HeatMap {
    /// Grid shape `(n_radii, n_phis)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.radii.len(), self.phis.len())
    }

    /// Value at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied().flatten()
    }

    /// Symmetric colour limit `max |value|` over finite cells.
    ///
    /// A diverging colour scale spans `[-limit, limit]`. Zero for an empty grid.
    pub fn color_limit(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .flatten()
            .filter(|v| v.is_finite())
            .fold(0.0, |acc: f64, v| acc.max(v.abs()))
    }

    /// Number of filled cells.
    pub fn n_filled(&self) -> usize {
        self.values.iter().flatten().filter(|v| v.is_some()).count()
    }
}

/// A bin projected onto the disc plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    /// `R cos φ` (kpc)
    pub x: f64,
    /// `R sin φ` (kpc)
    pub y: f64,
    pub radius: f64,
    pub phi: f64,
    pub value: f64,
}

impl PolarPoint {
    /// Project `(R, phi)` with `phi` in degrees.
    pub fn new(radius: f64, phi: f64, value: f64) -> Self {
        let (sin, cos) = phi.to_radians().sin_cos();
        Self {
            x: radius * cos,
            y: radius * sin,
            radius,
            phi,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_limit_uses_magnitude() {
        let map = HeatMap {
            time: 0.2,
            quantity: Quantity::Velocity,
            radii: vec![5.5, 6.5],
            phis: vec![0.0, 10.0],
            values: vec![vec![Some(3.0), None], vec![Some(-7.5), Some(f64::NAN)]],
        };

        assert_eq!(map.shape(), (2, 2));
        assert_eq!(map.color_limit(), 7.5);
        assert_eq!(map.n_filled(), 3);
        assert_eq!(map.get(1, 0), Some(-7.5));
        assert_eq!(map.get(0, 1), None);
        assert_eq!(map.get(5, 5), None);
    }

    #[test]
    fn test_polar_projection() {
        let p = PolarPoint::new(2.0, 180.0, 1.0);
        assert!((p.x + 2.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
    }
}
