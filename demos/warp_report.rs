//! Warp Report Example
//!
//! Fits every `(R, t)` slice of a simulation profile table and reports
//! phase differences and precession rates.
//!
//! This example:
//! 1. Loads analysis settings from an optional TOML file
//! 2. Reads the binned profile table and fits height and velocity per slice
//! 3. Writes the fitted parameter table as CSV
//! 4. Derives height-velocity and cross-radius phase differences
//! 5. Estimates the precession rate at every radius and exports it as JSON
//!
//! ## Run
//!
//! ```bash
//! cargo run --release --example warp_report -- profiles.csv [config.toml] [out_dir]
//! RUST_LOG=warp_rs=debug cargo run --example warp_report -- profiles.csv
//! ```

use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;
use warp_rs::io::{read_profile_table, write_json, write_parameter_table};
use warp_rs::{AnalysisConfig, PhaseDifferenceSeries, PrecessionSeries, Quantity, fit_profiles};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(profile_path) = args.get(1).map(PathBuf::from) else {
        return Err("usage: warp_report <profiles.csv> [config.toml] [out_dir]".into());
    };
    let config = match args.get(2) {
        Some(path) => AnalysisConfig::from_toml_file(Path::new(path))?,
        None => AnalysisConfig::default(),
    };
    let out_dir = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("warp_output"));
    std::fs::create_dir_all(&out_dir)?;

    println!("=== Warp Report ===");
    println!("Profiles: {}", profile_path.display());
    println!("Rotation speed: {} km/s", config.rotation_speed);

    // ------------------------------------------------------------------
    // Fit
    // ------------------------------------------------------------------
    let profiles = read_profile_table(&profile_path, &config.profile_options())?;
    println!(
        "\nLoaded {} rows: {} radii x {} times x {} angles",
        profiles.len(),
        profiles.radii().len(),
        profiles.times().len(),
        profiles.phis().len()
    );

    let fitter = config.fitter();
    #[cfg(feature = "parallel")]
    let report = warp_rs::fit_profiles_parallel(&profiles, &fitter);
    #[cfg(not(feature = "parallel"))]
    let report = fit_profiles(&profiles, &fitter);

    println!(
        "Fitted {} slices, {} failures",
        report.n_fitted(),
        report.failures.len()
    );
    for failure in report.failures.iter().take(10) {
        println!("  {} {}: {}", failure.key, failure.quantity, failure.error);
    }

    let mut table = report.table.normalized();
    if let Some(spacing) = config.radius_spacing {
        table = table.with_radius_spacing(spacing);
    }
    write_parameter_table(&out_dir.join("fit_parameters.csv"), &table)?;

    // ------------------------------------------------------------------
    // Parameter summary
    // ------------------------------------------------------------------
    println!("\n{:>6} {:>12} {:>12} {:>12} {:>12}", "R", "<A_h>", "<A_v>", "C_h(last)", "C_v(last)");
    for series in table.rewrap_phases(config.phase_start).all_series(Quantity::Height) {
        let velocity = table.series(series.radius, Quantity::Velocity);
        let last_phase = |s: &warp_rs::ParameterTimeSeries| {
            s.phases().last().copied().unwrap_or(f64::NAN)
        };
        println!(
            "{:>6.2} {:>12.4} {:>12.4} {:>12.2} {:>12.2}",
            series.radius,
            series.mean_amplitude(),
            velocity.mean_amplitude(),
            last_phase(&series),
            last_phase(&velocity.rewrapped(config.phase_start)),
        );
    }

    // ------------------------------------------------------------------
    // Phase differences
    // ------------------------------------------------------------------
    let window_of = |series: PhaseDifferenceSeries| match &config.phase_window {
        Some(window) => series.within_window(window),
        None => series,
    };

    let mut differences = Vec::new();
    for radius in table.radii() {
        differences.push(window_of(table.phase_difference(radius)?));
    }
    let radii = table.radii();
    for quantity in Quantity::ALL {
        match table.radial_phase_differences(&radii, quantity) {
            Ok(series) => differences.extend(series.into_iter().map(window_of)),
            Err(e) => println!("Skipping cross-radius {quantity} differences: {e}"),
        }
    }

    println!("\n{:<28} {:>8} {:>12}", "Series", "Points", "Mean (deg)");
    for series in &differences {
        let values = series.differences();
        let mean = if values.is_empty() {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        };
        println!("{:<28} {:>8} {:>12.2}", series.label(), series.len(), mean);
    }
    write_json(&out_dir.join("phase_differences.json"), &differences)?;

    // ------------------------------------------------------------------
    // Precession
    // ------------------------------------------------------------------
    let estimator = config.estimator();
    let mut precession: Vec<PrecessionSeries> = Vec::new();
    println!("\n{:>6} {:>8} {:>8} {:>14}", "R", "Points", "Skipped", "<Omega> (km/s/kpc)");
    for radius in table.radii() {
        let series = table.precession(radius, &estimator)?;
        let omegas = series.omegas();
        let mean = if omegas.is_empty() {
            f64::NAN
        } else {
            omegas.iter().sum::<f64>() / omegas.len() as f64
        };
        println!(
            "{:>6.2} {:>8} {:>8} {:>14.2}",
            radius,
            series.len(),
            series.skipped.len(),
            mean
        );
        precession.push(series);
    }
    write_json(&out_dir.join("precession.json"), &precession)?;

    println!("\nResults written to {}", out_dir.display());
    Ok(())
}
