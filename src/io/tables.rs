//! CSV readers and writers for the profile and parameter tables.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::dataset::{ParameterRecord, ParameterTable, ProfileRecord, ProfileTable};
use crate::model::FitParameters;
use crate::types::SliceKey;

/// Error type for table file operations.
#[derive(Debug, Error)]
pub enum TableFileError {
    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed CSV or a field that does not parse as a number
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// No data rows after the header
    #[error("Table has no data rows")]
    EmptyTable,

    /// A field parsed but is outside its domain
    #[error("Row {row}: {message}")]
    InvalidValue { row: usize, message: String },
}

/// Options for reading the binned profile table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileReadOptions {
    /// Factor applied to the `phi` column (the simulation stores tens of degrees)
    pub phi_scale: f64,
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for ProfileReadOptions {
    fn default() -> Self {
        Self {
            phi_scale: 10.0,
            delimiter: b',',
        }
    }
}

impl ProfileReadOptions {
    /// Set the `phi` scale factor.
    pub fn with_phi_scale(mut self, phi_scale: f64) -> Self {
        self.phi_scale = phi_scale;
        self
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(rename = "R")]
    radius: f64,
    t: f64,
    phi: f64,
    #[serde(rename = "N")]
    count: f64,
    #[serde(rename = "Zmean", deserialize_with = "csv::invalid_option")]
    height: Option<f64>,
    #[serde(rename = "vZ_mean", deserialize_with = "csv::invalid_option")]
    velocity: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ParameterRow {
    #[serde(rename = "R")]
    radius: f64,
    t: f64,
    #[serde(rename = "A_height")]
    a_height: f64,
    #[serde(rename = "C_height")]
    c_height: f64,
    #[serde(rename = "D_height")]
    d_height: f64,
    #[serde(rename = "A_velocity")]
    a_velocity: f64,
    #[serde(rename = "C_velocity")]
    c_velocity: f64,
    #[serde(rename = "D_velocity")]
    d_velocity: f64,
}

impl ParameterRow {
    fn from_record(record: &ParameterRecord) -> Self {
        Self {
            radius: record.radius,
            t: record.time,
            a_height: record.height.amplitude,
            c_height: record.height.phase,
            d_height: record.height.offset,
            a_velocity: record.velocity.amplitude,
            c_velocity: record.velocity.phase,
            d_velocity: record.velocity.offset,
        }
    }

    fn into_record(self) -> ParameterRecord {
        ParameterRecord::new(
            SliceKey::new(self.radius, self.t),
            FitParameters::new(self.a_height, self.c_height, self.d_height),
            FitParameters::new(self.a_velocity, self.c_velocity, self.d_velocity),
        )
    }
}

fn check_count(row: usize, count: f64) -> Result<u32, TableFileError> {
    if count.is_finite() && count >= 0.0 && count.fract() == 0.0 && count <= u32::MAX as f64 {
        Ok(count as u32)
    } else {
        Err(TableFileError::InvalidValue {
            row,
            message: format!("particle count N = {count} is not a non-negative integer"),
        })
    }
}

/// Parse a profile table from CSV text with columns
/// `R, t, phi, N, Zmean, vZ_mean` (extra columns are ignored).
///
/// `phi` is multiplied by `options.phi_scale`. Empty `Zmean`/`vZ_mean`
/// fields read as NaN and are left out of profiles later.
///
/// # Errors
/// - `CsvError` for malformed rows or missing columns
/// - `InvalidValue` for a non-finite `R`, `t` or `phi`, or a bad count
/// - `EmptyTable` if there are no data rows
pub fn parse_profile_table<R: Read>(
    reader: R,
    options: &ProfileReadOptions,
) -> Result<ProfileTable, TableFileError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<ProfileRow>().enumerate() {
        let row_num = i + 1;
        let row = row?;

        let phi = row.phi * options.phi_scale;
        if !(row.radius.is_finite() && row.t.is_finite() && phi.is_finite()) {
            return Err(TableFileError::InvalidValue {
                row: row_num,
                message: format!(
                    "non-finite key (R = {}, t = {}, phi = {})",
                    row.radius, row.t, phi
                ),
            });
        }

        records.push(ProfileRecord {
            radius: row.radius + 0.0,
            time: row.t + 0.0,
            phi,
            count: check_count(row_num, row.count)?,
            height: row.height.unwrap_or(f64::NAN),
            velocity: row.velocity.unwrap_or(f64::NAN),
        });
    }

    if records.is_empty() {
        return Err(TableFileError::EmptyTable);
    }

    Ok(ProfileTable::new(records))
}

/// Read a profile table from a CSV file.
///
/// See [`parse_profile_table`] for the format.
pub fn read_profile_table(
    path: &Path,
    options: &ProfileReadOptions,
) -> Result<ProfileTable, TableFileError> {
    let table = parse_profile_table(File::open(path)?, options)?;
    info!(
        path = %path.display(),
        bins = table.len(),
        slices = table.slice_keys().len(),
        "loaded profile table"
    );
    Ok(table)
}

/// Parse a parameter table from CSV text with columns
/// `R, t, A_height, C_height, D_height, A_velocity, C_velocity, D_velocity`.
///
/// Extra columns (`phi`, `Zmean`, ...) are ignored and rows repeated per
/// `phi` collapse to the first row of each `(R, t)`. Rows with a non-finite
/// fit parameter are skipped.
///
/// # Errors
/// - `CsvError` for malformed rows or missing columns
/// - `InvalidValue` for a non-finite `R` or `t`
/// - `EmptyTable` if no usable rows remain
pub fn parse_parameter_table<R: Read>(reader: R) -> Result<ParameterTable, TableFileError> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (i, row) in rdr.deserialize::<ParameterRow>().enumerate() {
        let row: ParameterRow = row?;
        if !(row.radius.is_finite() && row.t.is_finite()) {
            return Err(TableFileError::InvalidValue {
                row: i + 1,
                message: format!("non-finite key (R = {}, t = {})", row.radius, row.t),
            });
        }

        let record = row.into_record();
        if record.height.is_finite() && record.velocity.is_finite() {
            records.push(record);
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped parameter rows with non-finite fits");
    }
    if records.is_empty() {
        return Err(TableFileError::EmptyTable);
    }

    Ok(ParameterTable::new(records))
}

/// Read a parameter table from a CSV file.
///
/// See [`parse_parameter_table`] for the format.
pub fn read_parameter_table(path: &Path) -> Result<ParameterTable, TableFileError> {
    let table = parse_parameter_table(File::open(path)?)?;
    info!(
        path = %path.display(),
        records = table.len(),
        radii = table.radii().len(),
        "loaded parameter table"
    );
    Ok(table)
}

/// Write a parameter table as CSV to any writer.
pub fn write_parameter_table_to<W: Write>(
    writer: W,
    table: &ParameterTable,
) -> Result<(), TableFileError> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    for record in table.records() {
        wtr.serialize(ParameterRow::from_record(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a parameter table to a CSV file.
///
/// The output reads back with [`read_parameter_table`].
pub fn write_parameter_table(path: &Path, table: &ParameterTable) -> Result<(), TableFileError> {
    write_parameter_table_to(File::create(path)?, table)
}
