//! Sinusoidal model of an angular profile.
//!
//! Each `(R, t)` slice spans exactly one revolution in `phi`, so the model has
//! a fixed 360° period and three free parameters:
//!
//! ```text
//! f(φ) = A sin(φ + C) + D
//! ```
//!
//! with `φ` and `C` in degrees.

mod sine;

pub use sine::{FitParameters, SineModel};
