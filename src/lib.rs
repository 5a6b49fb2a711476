//! # warp-rs
//!
//! Angular curve fitting and phase analysis for simulated galactic disc warps.
//!
//! The simulation output bins particle height (`Zmean`) and vertical velocity
//! (`vZ_mean`) by radius `R`, angle `phi` and time `t`. This crate provides:
//! - A fixed-period sine model `A sin(phi + C) + D` and weighted fitters
//! - Amplitude/phase normalisation and phase interval wrapping
//! - Phase differences between quantities and between adjacent radii
//! - Warp precession rates from amplitude ratios
//! - Profile and parameter tables with heat-map and polar views
//! - CSV table I/O, JSON export and TOML configuration
//!
//! # Example
//!
//! ```
//! use warp_rs::{FitParameters, PhaseWindow, canonical_difference, normalize_amplitude_phase};
//!
//! let params = FitParameters::new(-3.0, 10.0, 0.0).normalized();
//! assert_eq!((params.amplitude, params.phase), normalize_amplitude_phase(-3.0, 10.0));
//!
//! let window = PhaseWindow::new(-50.0, 50.0).unwrap();
//! assert_eq!(window.wrap(canonical_difference(330.0)), Some(-30.0));
//! ```

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod fitting;
pub mod io;
pub mod model;
pub mod phase;
pub mod types;

// Re-export main types for convenience
pub use analysis::{
    ParameterPoint, ParameterTimeSeries, PrecessionError, PrecessionRateEstimator,
    PrecessionSeries, V_PHI,
};
pub use config::{AnalysisConfig, ConfigError};
pub use dataset::{HeatMap, ParameterRecord, ParameterTable, PolarPoint, ProfileRecord, ProfileTable};
#[cfg(feature = "parallel")]
pub use fitting::fit_profiles_parallel;
pub use fitting::{
    BatchFitReport, FitConfig, FitError, FitSummary, LevenbergMarquardt, LinearLeastSquares,
    SineFitter, SliceFailure, fit_profiles,
};
pub use io::{ExportError, ProfileReadOptions, TableFileError};
pub use model::{FitParameters, SineModel};
pub use phase::{
    DifferenceKind, PhaseDifferencePoint, PhaseDifferenceSeries, PhaseError, PhaseWindow,
    canonical_difference, cross_quantity, cross_radius, normalize_amplitude_phase, wrap_to_start,
    wrap_to_window,
};
pub use types::{AngularProfile, AngularSample, Quantity, SliceKey};
