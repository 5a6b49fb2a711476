//! In-memory tables of the binned simulation output and of fitted parameters.
//!
//! Two tables feed the analysis:
//!
//! - [`ProfileTable`]: raw `(R, t, phi)` bins with particle count, mean height
//!   and mean vertical velocity. Source of angular profiles, per-bin time
//!   series, heat maps and polar projections.
//! - [`ParameterTable`]: one height fit and one velocity fit per `(R, t)`.
//!   Source of parameter time series, phase differences and precession rates.
//!
//! Both are immutable once built and sorted by key, so every view they hand
//! out is ascending in radius and time.

mod heatmap;
mod parameter_table;
mod profile_table;

pub use heatmap::{HeatMap, PolarPoint};
pub use parameter_table::{DEFAULT_RADIUS_SPACING, ParameterRecord, ParameterTable};
pub use profile_table::{ProfileRecord, ProfileTable};
