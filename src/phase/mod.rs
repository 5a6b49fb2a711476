//! Phase normalisation, interval wrapping, and phase differences.
//!
//! All angles are in degrees. Every branch-cut decision in the crate goes
//! through the helpers in this module:
//!
//! | Operation | Result range |
//! |---|---|
//! | [`wrap_degrees`] | `[0, 360)` |
//! | [`wrap_to_start`] | `[start, start + 360)` |
//! | [`canonical_difference`] | `(-180, 180]` |
//! | [`wrap_to_window`] | `[start, end]` or unrepresentable |
//!
//! # Example
//!
//! ```
//! use warp_rs::phase::{canonical_difference, normalize_amplitude_phase, wrap_to_window};
//!
//! assert_eq!(normalize_amplitude_phase(-3.0, 10.0), (3.0, 190.0));
//! assert_eq!(canonical_difference(200.0), -160.0);
//! assert_eq!(wrap_to_window(300.0, -50.0, 50.0).unwrap(), None);
//! assert_eq!(wrap_to_window(330.0, -50.0, 50.0).unwrap(), Some(-30.0));
//! ```

mod difference;
mod normalize;
mod wrap;

pub use difference::{
    DEFAULT_SPACING_TOLERANCE, DifferenceKind, PhaseDifferencePoint, PhaseDifferenceSeries,
    consecutive_selection, cross_quantity, cross_radius,
};
pub use normalize::normalize_amplitude_phase;
pub use wrap::{
    FULL_TURN, HALF_TURN, PhaseWindow, canonical_difference, wrap_degrees, wrap_to_start,
    wrap_to_window,
};

use thiserror::Error;

use crate::types::Quantity;

/// Error type for phase window and phase difference operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhaseError {
    /// Window bounds are not finite or `end <= start`
    #[error("Invalid phase window [{start}, {end}]: end must be greater than start")]
    InvalidWindow { start: f64, end: f64 },

    /// Selected radii are not evenly spaced at the data's radius spacing
    #[error("Radii {selection:?} are not consecutive at spacing {spacing}")]
    NonConsecutiveSelection { selection: Vec<f64>, spacing: f64 },

    /// Radius spacing is not a positive finite number
    #[error("Invalid radius spacing: {0}")]
    InvalidSpacing(f64),

    /// Two series that must share a radius do not
    #[error("Radius mismatch: {first} vs {second}")]
    RadiusMismatch { first: f64, second: f64 },

    /// Both series of a cross-quantity difference hold the same quantity
    #[error("Both series hold {0}; a cross-quantity difference needs height and velocity")]
    QuantityMismatch(Quantity),
}
