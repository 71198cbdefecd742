//! Workbook writer: one worksheet per table

use super::formatter::{SheetLayout, SheetStyle};
use crate::error::{ConvertError, ConvertResult};
use crate::types::{blob_text, CellValue, Table};
use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

/// Excel limit on worksheet name length
pub const MAX_SHEET_NAME_LENGTH: usize = 31;

/// Excel limit on the characters in one text cell
pub const MAX_CELL_TEXT_LENGTH: usize = 32_767;

/// Sheet name for a table: the table name cut to 31 characters.
///
/// Two tables that only differ after the 31st character map to the same
/// name; the workbook rejects the duplicate when it is saved.
pub fn sheet_name_for(table_name: &str) -> String {
    table_name.chars().take(MAX_SHEET_NAME_LENGTH).collect()
}

/// What was written for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub table: String,
    pub sheet: String,
    pub rows: usize,
    pub columns: usize,
    /// Columns with at least one text cell cut to [`MAX_CELL_TEXT_LENGTH`]
    pub truncated_columns: Vec<String>,
}

/// Builds a workbook in memory and writes it to disk in one step
pub struct ExcelExporter {
    workbook: Workbook,
    style: SheetStyle,
    sheets: Vec<SheetSummary>,
}

impl ExcelExporter {
    /// Create a new Excel exporter
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            style: SheetStyle::new(),
            sheets: Vec::new(),
        }
    }

    pub fn sheets(&self) -> &[SheetSummary] {
        &self.sheets
    }

    /// Write `table` to a new worksheet and format it
    pub fn add_table(&mut self, table: &Table) -> ConvertResult<SheetSummary> {
        table
            .validate_lengths()
            .map_err(|e| ConvertError::InvalidInput(format!("Table '{}': {}", table.name, e)))?;

        let sheet_name = sheet_name_for(&table.name);
        let layout = SheetLayout::for_table(table);

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name)?;
        let truncated_columns = write_table(worksheet, table, &self.style, &layout)?;
        layout.apply(worksheet)?;

        let summary = SheetSummary {
            table: table.name.clone(),
            sheet: sheet_name,
            rows: table.row_count(),
            columns: table.columns.len(),
            truncated_columns,
        };
        self.sheets.push(summary.clone());
        Ok(summary)
    }

    /// Serialize the workbook and move it into place at `output_path`.
    ///
    /// The bytes go to a temporary file next to the target first, so a
    /// failure never leaves a truncated workbook behind.
    pub fn save(mut self, output_path: &Path) -> ConvertResult<()> {
        let buffer = self.workbook.save_to_buffer()?;

        let dir = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let save_error = |source: std::io::Error| ConvertError::Save {
            path: output_path.to_path_buf(),
            source,
        };

        let mut staging = tempfile::NamedTempFile::new_in(dir).map_err(save_error)?;
        staging.write_all(&buffer).map_err(save_error)?;
        staging.flush().map_err(save_error)?;
        staging
            .persist(output_path)
            .map_err(|e| save_error(e.error))?;
        Ok(())
    }
}

impl Default for ExcelExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the header row and every data row, styled.
///
/// Returns the names of columns that had text cut to fit a cell.
fn write_table(
    worksheet: &mut Worksheet,
    table: &Table,
    style: &SheetStyle,
    layout: &SheetLayout,
) -> ConvertResult<Vec<String>> {
    for (col_idx, column) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, &column.name, &style.header)?;
    }

    let mut truncated = Vec::new();
    for (col_idx, column) in table.columns.iter().enumerate() {
        let mut clipped = false;
        for (row_idx, value) in column.values.iter().enumerate() {
            let format = style.data_format(layout, col_idx, value);
            // +1 for the header row
            clipped |= write_cell(worksheet, row_idx as u32 + 1, col_idx as u16, value, format)?;
        }
        if clipped {
            truncated.push(column.name.clone());
        }
    }
    Ok(truncated)
}

/// Cut `text` to [`MAX_CELL_TEXT_LENGTH`] characters
fn fit_cell_text(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_CELL_TEXT_LENGTH) {
        Some((end, _)) => Cow::Owned(text[..end].to_string()),
        None => Cow::Borrowed(text),
    }
}

fn write_text(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
    format: &Format,
) -> ConvertResult<bool> {
    let fitted = fit_cell_text(text);
    worksheet.write_string_with_format(row, col, fitted.as_ref(), format)?;
    Ok(matches!(fitted, Cow::Owned(_)))
}

/// Write a single cell value based on its type; `true` if text was cut
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    format: &Format,
) -> ConvertResult<bool> {
    match value {
        CellValue::Null => {
            worksheet.write_blank(row, col, format)?;
        }
        CellValue::Integer(i) => {
            worksheet.write_number_with_format(row, col, *i as f64, format)?;
        }
        CellValue::Real(f) => {
            worksheet.write_number_with_format(row, col, *f, format)?;
        }
        CellValue::Text(s) => return write_text(worksheet, row, col, s, format),
        CellValue::Blob(bytes) => return write_text(worksheet, row, col, &blob_text(bytes), format),
        CellValue::DateTime(dt) => {
            worksheet.write_datetime_with_format(row, col, &excel_datetime(dt)?, format)?;
        }
    }
    Ok(false)
}

fn excel_datetime(dt: &NaiveDateTime) -> ConvertResult<ExcelDateTime> {
    let seconds = dt.second() as f64 + dt.nanosecond() as f64 / 1e9;
    let value = ExcelDateTime::from_ymd(dt.year() as u16, dt.month() as u8, dt.day() as u8)?
        .and_hms(dt.hour() as u16, dt.minute() as u8, seconds)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_table(name: &str) -> Table {
        let mut table = Table::new(name);
        table.add_column(Column::new(
            "Row",
            vec![CellValue::Integer(1), CellValue::Integer(2)],
        ));
        table.add_column(Column::new(
            "label",
            vec![CellValue::Text("a".into()), CellValue::Null],
        ));
        table.add_column(Column::new(
            "at_readable",
            vec![
                CellValue::DateTime(
                    NaiveDate::from_ymd_opt(2023, 11, 14)
                        .unwrap()
                        .and_hms_opt(22, 13, 20)
                        .unwrap(),
                ),
                CellValue::Null,
            ],
        ));
        table.add_column(Column::new(
            "raw",
            vec![CellValue::Blob(b"xy".to_vec()), CellValue::Real(0.25)],
        ));
        table
    }

    #[test]
    fn test_sheet_name_truncation() {
        assert_eq!(sheet_name_for("readings"), "readings");
        let long = "a".repeat(40);
        assert_eq!(sheet_name_for(&long).len(), 31);
        let accented = "é".repeat(35);
        assert_eq!(sheet_name_for(&accented).chars().count(), 31);
    }

    #[test]
    fn test_add_table_summary() {
        let mut exporter = ExcelExporter::new();
        let summary = exporter.add_table(&sample_table("events")).unwrap();
        assert_eq!(
            summary,
            SheetSummary {
                table: "events".into(),
                sheet: "events".into(),
                rows: 2,
                columns: 4,
                truncated_columns: Vec::new(),
            }
        );
        assert_eq!(exporter.sheets().len(), 1);
    }

    #[test]
    fn test_add_table_rejects_ragged_columns() {
        let mut table = sample_table("bad");
        table.columns[1].values.pop();
        let mut exporter = ExcelExporter::new();
        assert!(exporter.add_table(&table).is_err());
    }

    #[test]
    fn test_save_writes_file() {
        let dir = TempDir::new().unwrap();
        let output_path = dir.path().join("out.xlsx");

        let mut exporter = ExcelExporter::new();
        exporter.add_table(&sample_table("one")).unwrap();
        exporter.add_table(&sample_table("two")).unwrap();
        exporter.save(&output_path).unwrap();

        assert!(output_path.exists());
        // Only the workbook is left in the directory
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_export_to_nonexistent_directory_fails() {
        let mut exporter = ExcelExporter::new();
        exporter.add_table(&sample_table("one")).unwrap();

        let output_path = Path::new("/nonexistent/dir/output.xlsx");
        let err = exporter.save(output_path).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/output.xlsx"));
    }

    #[test]
    fn test_failed_rename_names_target() {
        let dir = TempDir::new().unwrap();
        // A directory in the way makes the final rename fail
        let output_path = dir.path().join("taken.xlsx");
        std::fs::create_dir(&output_path).unwrap();

        let mut exporter = ExcelExporter::new();
        exporter.add_table(&sample_table("one")).unwrap();
        let err = exporter.save(&output_path).unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
        assert!(err.to_string().contains("taken.xlsx"));
        // The staging file is cleaned up
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_fit_cell_text() {
        assert!(matches!(fit_cell_text("short"), Cow::Borrowed("short")));

        let long = "é".repeat(MAX_CELL_TEXT_LENGTH + 10);
        let fitted = fit_cell_text(&long);
        assert_eq!(fitted.chars().count(), MAX_CELL_TEXT_LENGTH);

        let exact = "x".repeat(MAX_CELL_TEXT_LENGTH);
        assert!(matches!(fit_cell_text(&exact), Cow::Borrowed(_)));
    }

    #[test]
    fn test_long_text_and_blob_are_truncated() {
        let mut table = Table::new("notes");
        table.add_column(Column::new(
            "body",
            vec![CellValue::Text("x".repeat(40_000)), CellValue::Text("ok".into())],
        ));
        table.add_column(Column::new(
            "payload",
            vec![CellValue::Blob(vec![b'a'; 50_000]), CellValue::Null],
        ));
        table.add_column(Column::new(
            "tag",
            vec![CellValue::Text("t".into()), CellValue::Text("u".into())],
        ));

        let mut exporter = ExcelExporter::new();
        let summary = exporter.add_table(&table).unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.truncated_columns, vec!["body", "payload"]);
    }

    #[test]
    fn test_excel_datetime_keeps_fraction() {
        let dt = NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_milli_opt(6, 30, 15, 500)
            .unwrap();
        assert!(excel_datetime(&dt).is_ok());
    }
}
