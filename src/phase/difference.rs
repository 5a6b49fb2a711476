//! Phase differences between fitted series.
//!
//! Two modes:
//! - **cross-quantity**: height phase minus velocity phase at one radius,
//! - **cross-radius**: phase of one quantity at `R1` minus the phase at the
//!   next selected radius `R2`, for every adjacent pair of a selection.
//!
//! Both join their inputs on exact time equality (inner join) and report
//! differences in `(-180, 180]`. A [`PhaseWindow`] can then re-wrap the
//! values, dropping points that cannot be represented in it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::wrap::{PhaseWindow, canonical_difference};
use super::PhaseError;
use crate::analysis::ParameterTimeSeries;
use crate::types::Quantity;

/// Relative tolerance used when checking radius steps against the spacing.
pub const DEFAULT_SPACING_TOLERANCE: f64 = 1e-9;

/// What a phase difference series was derived from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DifferenceKind {
    /// `C(minuend) - C(other quantity)` at one radius
    CrossQuantity { radius: f64, minuend: Quantity },
    /// `C(inner) - C(outer)` for one quantity at two adjacent radii
    CrossRadius {
        quantity: Quantity,
        inner: f64,
        outer: f64,
    },
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifferenceKind::CrossQuantity { radius, minuend } => {
                write!(f, "{}-{} R={}", minuend, minuend.other(), radius)
            }
            DifferenceKind::CrossRadius {
                quantity,
                inner,
                outer,
            } => write!(f, "{} diff {}-{}", quantity, inner, outer),
        }
    }
}

/// One phase difference sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseDifferencePoint {
    /// Simulation time (Gyr)
    pub time: f64,
    /// Phase difference (degrees)
    pub difference: f64,
}

/// Phase differences ordered by ascending time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseDifferenceSeries {
    /// Source of the differences
    pub kind: DifferenceKind,
    /// Window the values were wrapped into, `None` for the canonical `(-180, 180]`
    pub window: Option<PhaseWindow>,
    /// The samples
    pub points: Vec<PhaseDifferencePoint>,
}

impl PhaseDifferenceSeries {
    /// Create a canonical series, sorting points by time.
    pub fn new(kind: DifferenceKind, mut points: Vec<PhaseDifferencePoint>) -> Self {
        points.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            kind,
            window: None,
            points,
        }
    }

    /// Re-wrap every value into `window`, dropping unrepresentable points.
    ///
    /// The output may be shorter than the input; it never holds placeholders.
    pub fn within_window(&self, window: &PhaseWindow) -> Self {
        let points: Vec<PhaseDifferencePoint> = self
            .points
            .iter()
            .filter_map(|p| {
                window.wrap(p.difference).map(|difference| PhaseDifferencePoint {
                    time: p.time,
                    difference,
                })
            })
            .collect();

        let dropped = self.points.len() - points.len();
        if dropped > 0 {
            debug!(
                series = %self.kind,
                dropped,
                start = window.start,
                end = window.end,
                "dropped phase differences outside window"
            );
        }

        Self {
            kind: self.kind,
            window: Some(*window),
            points,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Times as a vector.
    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.time).collect()
    }

    /// Differences as a vector.
    pub fn differences(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.difference).collect()
    }

    /// Human-readable label, e.g. `height diff 5.5-6.5`.
    pub fn label(&self) -> String {
        self.kind.to_string()
    }
}

/// Phase difference between two quantities at the same radius.
///
/// Computes `C_first(t) - C_second(t)` for every time present in both
/// series, mapped to `(-180, 180]`. Pass height first for the conventional
/// height-minus-velocity difference; swapping the arguments negates every
/// value except a boundary value of `180`, which stays `180`.
///
/// # Errors
/// - `QuantityMismatch` if both series hold the same quantity
/// - `RadiusMismatch` if the series belong to different radii
pub fn cross_quantity(
    first: &ParameterTimeSeries,
    second: &ParameterTimeSeries,
) -> Result<PhaseDifferenceSeries, PhaseError> {
    if first.quantity == second.quantity {
        return Err(PhaseError::QuantityMismatch(first.quantity));
    }
    if first.radius != second.radius {
        return Err(PhaseError::RadiusMismatch {
            first: first.radius,
            second: second.radius,
        });
    }

    let points = first
        .inner_join(second)
        .into_iter()
        .map(|(time, a, b)| PhaseDifferencePoint {
            time,
            difference: canonical_difference(a.phase - b.phase),
        })
        .collect();

    Ok(PhaseDifferenceSeries::new(
        DifferenceKind::CrossQuantity {
            radius: first.radius,
            minuend: first.quantity,
        },
        points,
    ))
}

/// Sort a radius selection and check it is evenly spaced at `spacing`.
///
/// Returns the sorted selection. Selections with fewer than two radii are
/// trivially consecutive.
///
/// # Errors
/// - `InvalidSpacing` if `spacing` is not positive and finite
/// - `NonConsecutiveSelection` if any adjacent step differs from `spacing`
///   (duplicates included)
pub fn consecutive_selection(
    selection: &[f64],
    spacing: f64,
    tolerance: f64,
) -> Result<Vec<f64>, PhaseError> {
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(PhaseError::InvalidSpacing(spacing));
    }

    let mut radii = selection.to_vec();
    radii.sort_by(f64::total_cmp);

    let limit = tolerance * spacing.max(1.0);
    let consecutive = radii
        .windows(2)
        .all(|pair| ((pair[1] - pair[0]) - spacing).abs() <= limit);

    if consecutive {
        Ok(radii)
    } else {
        Err(PhaseError::NonConsecutiveSelection {
            selection: radii,
            spacing,
        })
    }
}

/// Phase differences of one quantity between adjacent selected radii.
///
/// The selection is sorted and validated with [`consecutive_selection`]; for
/// each adjacent pair `(R1, R2)` the series `C(R1, t) - C(R2, t)` is built
/// from the times both radii share. Results follow the sorted selection
/// order. Pairs where either radius has no series for `quantity` are
/// skipped.
///
/// # Errors
/// - `InvalidSpacing` / `NonConsecutiveSelection` from the selection check
pub fn cross_radius(
    series: &[ParameterTimeSeries],
    selection: &[f64],
    quantity: Quantity,
    spacing: f64,
) -> Result<Vec<PhaseDifferenceSeries>, PhaseError> {
    let radii = consecutive_selection(selection, spacing, DEFAULT_SPACING_TOLERANCE)?;

    let find = |radius: f64| {
        series
            .iter()
            .find(|s| s.quantity == quantity && s.radius == radius)
    };

    let mut result = Vec::with_capacity(radii.len().saturating_sub(1));
    for pair in radii.windows(2) {
        let (inner, outer) = (pair[0], pair[1]);
        let (Some(inner_series), Some(outer_series)) = (find(inner), find(outer)) else {
            debug!(inner, outer, %quantity, "skipping radius pair without data");
            continue;
        };

        let points = inner_series
            .inner_join(outer_series)
            .into_iter()
            .map(|(time, a, b)| PhaseDifferencePoint {
                time,
                difference: canonical_difference(a.phase - b.phase),
            })
            .collect();

        result.push(PhaseDifferenceSeries::new(
            DifferenceKind::CrossRadius {
                quantity,
                inner,
                outer,
            },
            points,
        ));
    }

    Ok(result)
}
