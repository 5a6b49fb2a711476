//! Analysis settings loaded from TOML.
//!
//! ```toml
//! rotation_speed = 230.0
//! radius_spacing = 1.0
//! phi_scale = 10.0
//!
//! [fit]
//! max_iterations = 200
//! tolerance = 1e-10
//! timeout_ms = 500
//!
//! [phase_window]
//! start = -50.0
//! end = 50.0
//! ```
//!
//! Every key is optional; missing keys take their [`Default`] value.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{PrecessionRateEstimator, V_PHI};
use crate::fitting::{FitConfig, LevenbergMarquardt};
use crate::io::ProfileReadOptions;
use crate::phase::PhaseWindow;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed TOML or a key of the wrong type
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A setting is outside its valid range
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Settings for one analysis session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Disc rotation speed v_φ for precession rates (km/s)
    pub rotation_speed: f64,
    /// Radius spacing for cross-radius selections; `None` infers it from the data
    pub radius_spacing: Option<f64>,
    /// Scale applied to the stored `phi` column
    pub phi_scale: f64,
    /// Curve fit settings
    pub fit: FitConfig,
    /// Window applied to phase differences; `None` keeps `(-180, 180]`
    pub phase_window: Option<PhaseWindow>,
    /// Start of the 360° interval parameter phases are shown in
    pub phase_start: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rotation_speed: V_PHI,
            radius_spacing: None,
            phi_scale: 10.0,
            fit: FitConfig::default(),
            phase_window: None,
            phase_start: 0.0,
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Check every setting is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{name} must be positive and finite, got {value}"
                )))
            }
        };

        positive("rotation_speed", self.rotation_speed)?;
        positive("phi_scale", self.phi_scale)?;
        if let Some(spacing) = self.radius_spacing {
            positive("radius_spacing", spacing)?;
        }
        positive("fit.tolerance", self.fit.tolerance)?;
        positive("fit.initial_damping", self.fit.initial_damping)?;
        if self.fit.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "fit.max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.phase_start.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "phase_start must be finite, got {}",
                self.phase_start
            )));
        }
        if let Some(window) = &self.phase_window {
            window
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        Ok(())
    }

    /// Precession estimator using the configured rotation speed.
    pub fn estimator(&self) -> PrecessionRateEstimator {
        PrecessionRateEstimator::new(self.rotation_speed)
    }

    /// Levenberg-Marquardt solver using the configured fit settings.
    pub fn fitter(&self) -> LevenbergMarquardt {
        LevenbergMarquardt::new(self.fit)
    }

    /// Profile table read options using the configured `phi` scale.
    pub fn profile_options(&self) -> ProfileReadOptions {
        ProfileReadOptions::default().with_phi_scale(self.phi_scale)
    }
}
