//! Fitting every slice of a profile table.
//!
//! Slices are independent: a failed fit is recorded and the batch moves on.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{FitError, SineFitter};
use crate::dataset::{ParameterRecord, ParameterTable, ProfileTable};
use crate::model::FitParameters;
use crate::types::{Quantity, SliceKey};

/// A slice and quantity that could not be fitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliceFailure {
    pub key: SliceKey,
    pub quantity: Quantity,
    pub error: FitError,
}

/// Outcome of a batch fit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchFitReport {
    /// Normalised fits of every slice where both quantities succeeded
    pub table: ParameterTable,
    /// Every failed `(slice, quantity)` fit, in slice order
    pub failures: Vec<SliceFailure>,
}

impl BatchFitReport {
    /// Number of slices with both fits.
    pub fn n_fitted(&self) -> usize {
        self.table.len()
    }

    /// Check if every fit succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

type SliceOutcome = (SliceKey, [Result<FitParameters, FitError>; 2]);

fn fit_slice<F: SineFitter + ?Sized>(
    profiles: &ProfileTable,
    fitter: &F,
    key: SliceKey,
) -> SliceOutcome {
    let fit = |quantity: Quantity| -> Result<FitParameters, FitError> {
        let profile = profiles.profile(key, quantity).ok_or(FitError::InsufficientData {
            required: super::MIN_SAMPLES,
            found: 0,
        })?;
        fitter.fit_profile(&profile).map(|p| p.normalized())
    };
    (key, Quantity::ALL.map(fit))
}

fn collect_report(outcomes: Vec<SliceOutcome>, solver: &str) -> BatchFitReport {
    let n_slices = outcomes.len();
    let mut records = Vec::with_capacity(n_slices);
    let mut failures = Vec::new();

    for (key, [height, velocity]) in outcomes {
        match (height, velocity) {
            (Ok(height), Ok(velocity)) => {
                records.push(ParameterRecord::new(key, height, velocity));
            }
            (height, velocity) => {
                for (quantity, result) in Quantity::ALL.into_iter().zip([height, velocity]) {
                    if let Err(error) = result {
                        debug!(%key, %quantity, %error, "slice fit failed");
                        failures.push(SliceFailure {
                            key,
                            quantity,
                            error,
                        });
                    }
                }
            }
        }
    }

    if !failures.is_empty() {
        warn!(
            failed = failures.len(),
            slices = n_slices,
            "some slices could not be fitted"
        );
    }
    info!(
        solver,
        fitted = records.len(),
        slices = n_slices,
        "batch fit complete"
    );

    BatchFitReport {
        table: ParameterTable::new(records),
        failures,
    }
}

/// Fit height and velocity for every `(R, t)` slice of `profiles`.
///
/// Results are normalised. A slice enters the parameter table only when both
/// of its fits succeed; every failure is listed in the report.
pub fn fit_profiles<F: SineFitter + ?Sized>(profiles: &ProfileTable, fitter: &F) -> BatchFitReport {
    let outcomes = profiles
        .slice_keys()
        .into_iter()
        .map(|key| fit_slice(profiles, fitter, key))
        .collect();
    collect_report(outcomes, fitter.name())
}

/// Parallel version of [`fit_profiles`] using Rayon.
///
/// Output is identical to the sequential version.
#[cfg(feature = "parallel")]
pub fn fit_profiles_parallel<F: SineFitter + ?Sized>(
    profiles: &ProfileTable,
    fitter: &F,
) -> BatchFitReport {
    use rayon::prelude::*;

    let outcomes = profiles
        .slice_keys()
        .into_par_iter()
        .map(|key| fit_slice(profiles, fitter, key))
        .collect();
    collect_report(outcomes, fitter.name())
}
