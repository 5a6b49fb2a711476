//! Strongly-typed domain types for the warp analysis.
//!
//! This module provides the keys and sample containers shared by the
//! fitting, phase and dataset modules.
//!
//! # Design Philosophy
//!
//! - **Named quantities**: `Quantity::Height` vs `Quantity::Velocity` instead of
//!   column-name strings
//! - **Named fields over positional**: `SliceKey { radius, time }`
//! - **Plain values**: everything here is `Clone` and `serde`-serialisable
//!
//! # Example
//!
//! ```
//! use warp_rs::types::{AngularProfile, AngularSample, Quantity, SliceKey};
//!
//! let key = SliceKey::new(8.5, 0.3);
//! let mut profile = AngularProfile::new(key, Quantity::Height);
//! profile.push(AngularSample::new(0.0, 0.12, 40));
//! profile.push(AngularSample::new(10.0, 0.15, 38));
//!
//! assert_eq!(profile.len(), 2);
//! assert_eq!(Quantity::Height.column(), "Zmean");
//! ```

mod profile;
mod quantity;

pub use profile::{AngularProfile, AngularSample};
pub use quantity::{Quantity, SliceKey};
