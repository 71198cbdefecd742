//! db2xlsx - SQLite databases to formatted Excel workbooks
//!
//! Each table of a source database becomes one worksheet. On the way the
//! table is lightly enriched:
//!
//! - `data_format_<N>` columns are renamed from the optional `data_format`
//!   lookup table
//! - Unix timestamp columns gain a `<name>_readable` date-time sibling
//! - a leading `Row` column numbers the rows from 1
//!
//! Worksheets get a styled, frozen header row, bordered cells and sized
//! columns. Conversion is all-or-nothing per file.
//!
//! # Example
//!
//! ```no_run
//! use db2xlsx::convert::convert_db_to_excel;
//! use db2xlsx::log::TracingLog;
//! use std::path::Path;
//!
//! let log = TracingLog::new();
//! let summary = convert_db_to_excel(
//!     Path::new("input/plant.db"),
//!     Path::new("output/plant.xlsx"),
//!     &log,
//! )?;
//!
//! println!("Sheets: {}", summary.sheets.len());
//! # Ok::<(), db2xlsx::error::ConvertError>(())
//! ```

pub mod batch;
pub mod cli;
pub mod convert;
pub mod database;
pub mod error;
pub mod excel;
pub mod log;
pub mod logging;
pub mod transform;
pub mod types;

// Re-export commonly used types
pub use convert::{convert_db_to_excel, ConversionSummary};
pub use error::{ConvertError, ConvertResult, ErrorKind};
pub use log::{ConversionLog, TracingLog};
pub use types::{CellValue, Column, Table};
