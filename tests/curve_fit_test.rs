//! Integration tests for the sine fitters and batch fitting.
//!
//! Tests parameter recovery on synthetic profiles, the input validation
//! contract, and per-slice failure collection.

use approx::assert_abs_diff_eq;
use warp_rs::{
    AngularProfile, FitConfig, FitError, LevenbergMarquardt, LinearLeastSquares, ProfileRecord,
    ProfileTable, Quantity, SineFitter, SineModel, SliceKey, fit_profiles,
};

/// Angular grid with 10° bins, as stored by the simulation.
fn phi_grid() -> Vec<f64> {
    (0..36).map(|i| i as f64 * 10.0).collect()
}

/// Deterministic particle counts between 20 and 120.
fn counts() -> Vec<u32> {
    (0..36).map(|i| 20 + (i * 37 % 101) as u32).collect()
}

fn fitters() -> Vec<Box<dyn SineFitter>> {
    vec![
        Box::new(LevenbergMarquardt::default()),
        Box::new(LevenbergMarquardt::new(FitConfig::strict())),
        Box::new(LinearLeastSquares),
    ]
}

#[test]
fn test_exact_recovery_all_solvers() {
    let phi = phi_grid();
    let cases = [(2.0, 0.0, 1.0), (0.15, 75.0, -0.02), (46.0, 210.0, 3.5), (1.0, 359.0, 0.0)];

    for fitter in fitters() {
        for &(a, c, d) in &cases {
            let values = SineModel::evaluate_many(&phi, a, c, d);
            let params = fitter.fit(&phi, &values, &counts()).unwrap().normalized();

            assert!(
                (params.amplitude - a).abs() < 1e-6 * a.max(1.0),
                "{}: amplitude expected {a}, got {:.8}",
                fitter.name(),
                params.amplitude
            );
            let phase_error = warp_rs::canonical_difference(params.phase - c);
            assert!(
                phase_error.abs() < 1e-4,
                "{}: phase expected {c}, got {:.6}",
                fitter.name(),
                params.phase
            );
            assert_abs_diff_eq!(params.offset, d, epsilon = 1e-6 * a.max(1.0));
        }
    }
}

#[test]
fn test_negative_amplitude_equivalent() {
    let phi = phi_grid();
    let values = SineModel::evaluate_many(&phi, -3.0, 10.0, 0.0);

    let params = LevenbergMarquardt::default()
        .fit(&phi, &values, &counts())
        .unwrap()
        .normalized();

    assert_abs_diff_eq!(params.amplitude, 3.0, epsilon = 1e-6);
    assert_abs_diff_eq!(params.phase, 190.0, epsilon = 1e-4);
}

#[test]
fn test_weights_favour_high_counts() {
    let phi = phi_grid();
    let mut values = SineModel::evaluate_many(&phi, 1.0, 0.0, 0.0);
    let mut counts = vec![1000u32; 36];
    // One badly-off bin with a single particle
    values[9] += 5.0;
    counts[9] = 1;

    let weighted = LinearLeastSquares.fit(&phi, &values, &counts).unwrap();
    let unweighted = LinearLeastSquares.fit(&phi, &values, &[1; 36]).unwrap();

    assert!((weighted.offset).abs() < (unweighted.offset).abs());
    assert_abs_diff_eq!(weighted.amplitude, 1.0, epsilon = 0.01);
}

#[test]
fn test_zero_counts_excluded() {
    let phi = phi_grid();
    let mut values = SineModel::evaluate_many(&phi, 0.5, 40.0, 0.1);
    let mut counts = counts();
    // Garbage in empty bins must not matter
    for i in (0..36).step_by(4) {
        values[i] = 1e6;
        counts[i] = 0;
    }

    let summary = LevenbergMarquardt::default()
        .fit_detailed(&phi, &values, &counts)
        .unwrap();

    assert_eq!(summary.n_samples, 27);
    assert_abs_diff_eq!(summary.params.normalized().amplitude, 0.5, epsilon = 1e-6);
    assert!(summary.r_squared > 0.999_999);
}

#[test]
fn test_validation_contract() {
    let fitter = LevenbergMarquardt::default();

    assert!(matches!(
        fitter.fit(&[0.0, 10.0], &[1.0, 2.0], &[5, 5]),
        Err(FitError::InsufficientData { required: 3, found: 2 })
    ));
    assert_eq!(
        fitter.fit(&[0.0, 10.0, 20.0, 30.0], &[1.0; 4], &[0; 4]),
        Err(FitError::DegenerateWeight)
    );
    assert_eq!(
        fitter.fit(&[0.0, 10.0, 20.0, 30.0], &[1.0; 4], &[0, 2, 0, 2]),
        Err(FitError::InsufficientData {
            required: 3,
            found: 2
        })
    );
    assert!(matches!(
        fitter.fit(&[0.0, 10.0, 20.0], &[1.0; 3], &[1; 2]),
        Err(FitError::LengthMismatch { .. })
    ));
    assert_eq!(
        fitter.fit(&[0.0, f64::NAN, 20.0, 30.0], &[1.0; 4], &[1; 4]),
        Err(FitError::NonFiniteSample { index: 1 })
    );
}

#[test]
fn test_fit_profile_matches_arrays() {
    let phi = phi_grid();
    let values = SineModel::evaluate_many(&phi, 0.3, 120.0, 0.0);
    let counts = counts();
    let profile = AngularProfile::from_arrays(
        SliceKey::new(7.5, 0.4),
        Quantity::Height,
        &phi,
        &values,
        &counts,
    );

    let fitter = LinearLeastSquares;
    assert_eq!(
        fitter.fit_profile(&profile).unwrap(),
        fitter.fit(&phi, &values, &counts).unwrap()
    );
}

#[test]
fn test_batch_fit_pipeline() {
    let mut records = Vec::new();
    for radius in [5.5, 6.5, 7.5] {
        for time in [0.0, 0.1, 0.2] {
            for (i, phi) in phi_grid().into_iter().enumerate() {
                let phase = 30.0 * radius + 200.0 * time;
                records.push(ProfileRecord {
                    radius,
                    time,
                    phi,
                    count: if radius == 7.5 && time == 0.2 { 0 } else { 50 + i as u32 },
                    height: SineModel::evaluate(phi, 0.1 * radius, phase, 0.0),
                    velocity: SineModel::evaluate(phi, 40.0, phase - 90.0, 0.0),
                });
            }
        }
    }
    let table = ProfileTable::new(records);

    let report = fit_profiles(&table, &LevenbergMarquardt::default());

    assert_eq!(report.n_fitted(), 8);
    assert_eq!(report.failures.len(), 2);
    assert!(report
        .failures
        .iter()
        .all(|f| f.key == SliceKey::new(7.5, 0.2) && f.error == FitError::DegenerateWeight));

    let params = report.table;
    for record in params.records() {
        assert!(record.height.is_normalized());
        assert!(record.velocity.is_normalized());
        assert_abs_diff_eq!(record.height.amplitude, 0.1 * record.radius, epsilon = 1e-6);
    }

    // Height leads velocity by 90° everywhere
    for radius in params.radii() {
        for d in params.phase_difference(radius).unwrap().differences() {
            assert_abs_diff_eq!(d, 90.0, epsilon = 1e-4);
        }
    }
}
