//! JSON export of analysis results.
//!
//! Every result type ([`PhaseDifferenceSeries`](crate::phase::PhaseDifferenceSeries),
//! [`PrecessionSeries`](crate::analysis::PrecessionSeries),
//! [`HeatMap`](crate::dataset::HeatMap), ...) derives `Serialize`, so one
//! generic writer covers them all.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// Error type for result export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Serialize a result to pretty-printed JSON.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write a result as pretty-printed JSON to a file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
