//! Column transforms applied to each table before it is written
//!
//! The pipeline order matters: renaming must see the original
//! `data_format_<N>` names, and row numbering must see the final columns.
//! None of the steps reorder or drop rows.

pub mod rename;
pub mod row_numbers;
pub mod timestamps;

pub use rename::rename_format_columns;
pub use row_numbers::{add_row_numbers, ROW_NUMBER_COLUMN};
pub use timestamps::{expand_timestamps, is_timestamp_column};

use crate::database::{FormatMapping, LookupUnavailable};
use crate::types::Table;

/// What [`apply_all`] changed, for logging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformReport {
    pub renamed: usize,
    pub expanded: Vec<String>,
}

/// Run rename → timestamp expansion → row numbering on `table`.
///
/// An unavailable mapping means no renaming; it is never an error.
pub fn apply_all(
    table: &mut Table,
    mapping: &Result<FormatMapping, LookupUnavailable>,
) -> TransformReport {
    let renamed = match mapping {
        Ok(mapping) => rename_format_columns(table, mapping),
        Err(_) => 0,
    };
    let expanded = expand_timestamps(table);
    add_row_numbers(table);
    TransformReport { renamed, expanded }
}
