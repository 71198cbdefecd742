//! Excel output for converted tables
//!
//! - [`ExcelExporter`]: one worksheet per table, saved atomically
//! - [`formatter`]: header style, borders, date-time cells, widths, frozen header

mod exporter;
pub mod formatter;

pub use exporter::{
    sheet_name_for, ExcelExporter, SheetSummary, MAX_CELL_TEXT_LENGTH, MAX_SHEET_NAME_LENGTH,
};
pub use formatter::{SheetLayout, SheetStyle};
