//! I/O utilities for reading and writing data files.
//!
//! This module provides:
//! - **Profile tables**: binned `(R, t, phi)` simulation output
//! - **Parameter tables**: fitted `(A, C, D)` per `(R, t)` for height and velocity
//! - **JSON export**: any analysis result, for plotting front ends
//!
//! # File Formats
//!
//! ## Profile Table
//!
//! Comma-separated with a header row. `phi` is stored in tens of degrees
//! and scaled on read (see [`ProfileReadOptions`]).
//!
//! ```text
//! R,t,phi,N,Zmean,vZ_mean
//! 5.5,0.0,0,112,0.012,1.31
//! 5.5,0.0,1,98,0.019,2.05
//! ```
//!
//! ## Parameter Table
//!
//! ```text
//! R,t,A_height,C_height,D_height,A_velocity,C_velocity,D_velocity
//! 5.5,0.0,0.21,12.5,0.003,31.2,101.4,0.2
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use warp_rs::io::{ProfileReadOptions, read_parameter_table, read_profile_table};
//!
//! let profiles = read_profile_table(Path::new("all_data.tab"), &ProfileReadOptions::default())?;
//! let params = read_parameter_table(Path::new("total_data_df.csv"))?;
//! println!("{} bins, {} fitted slices", profiles.len(), params.len());
//! # Ok::<(), warp_rs::io::TableFileError>(())
//! ```

mod export;
mod tables;

pub use export::{ExportError, to_json_string, write_json};
pub use tables::{
    ProfileReadOptions, TableFileError, parse_parameter_table, parse_profile_table,
    read_parameter_table, read_profile_table, write_parameter_table, write_parameter_table_to,
};
