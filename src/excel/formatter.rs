//! Worksheet presentation: header style, borders, widths, frozen header
//!
//! Nothing here changes a value; it only decides how values look.

use crate::error::ConvertResult;
use crate::types::{CellValue, Column, Table};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, FormatPattern, Worksheet};

pub const HEADER_BG_COLOR: u32 = 0x4472C4;
pub const HEADER_FONT_COLOR: u32 = 0xFFFFFF;
pub const BORDER_COLOR: u32 = 0xD3D3D3;
pub const HEADER_FONT_SIZE: f64 = 11.0;
pub const HEADER_ROW_HEIGHT: f64 = 20.0;
pub const COLUMN_WIDTH_PADDING: usize = 2;
pub const MAX_COLUMN_WIDTH: usize = 50;
pub const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// The three cell formats used on every sheet
#[derive(Debug, Clone)]
pub struct SheetStyle {
    pub header: Format,
    pub cell: Format,
    pub datetime: Format,
}

impl SheetStyle {
    pub fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_font_color(HEADER_FONT_COLOR)
            .set_font_size(HEADER_FONT_SIZE)
            .set_background_color(HEADER_BG_COLOR)
            .set_pattern(FormatPattern::Solid)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(BORDER_COLOR);

        let cell = Format::new()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(BORDER_COLOR);

        let datetime = cell.clone().set_num_format(DATETIME_FORMAT);

        Self {
            header,
            cell,
            datetime,
        }
    }

    /// Format for a data cell: date-time columns get the fixed display
    /// format on their non-null cells
    pub fn data_format(&self, layout: &SheetLayout, col: usize, value: &CellValue) -> &Format {
        let is_datetime = layout.datetime_columns.get(col).copied().unwrap_or(false);
        if is_datetime && !value.is_null() {
            &self.datetime
        } else {
            &self.cell
        }
    }
}

impl Default for SheetStyle {
    fn default() -> Self {
        Self::new()
    }
}

/// Worksheet-level attributes derived from a table
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub column_widths: Vec<f64>,
    pub datetime_columns: Vec<bool>,
    pub header_height: f64,
    /// Rows kept visible at the top while scrolling
    pub frozen_rows: u32,
}

impl SheetLayout {
    pub fn for_table(table: &Table) -> Self {
        Self {
            column_widths: table.columns.iter().map(column_width).collect(),
            datetime_columns: table.columns.iter().map(Column::is_datetime).collect(),
            header_height: HEADER_ROW_HEIGHT,
            frozen_rows: 1,
        }
    }

    /// Set widths, header height and the frozen pane on `worksheet`.
    ///
    /// Every call overwrites the same attributes, so applying twice is the
    /// same as applying once.
    pub fn apply(&self, worksheet: &mut Worksheet) -> ConvertResult<()> {
        for (col, width) in self.column_widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }
        worksheet.set_row_height(0, self.header_height)?;
        worksheet.set_freeze_panes(self.frozen_rows, 0)?;
        Ok(())
    }
}

/// Longest of header and stringified values, padded and capped
pub fn column_width(column: &Column) -> f64 {
    let longest = column
        .values
        .iter()
        .filter_map(CellValue::display_text)
        .map(|text| text.chars().count())
        .fold(column.name.chars().count(), usize::max);
    (longest + COLUMN_WIDTH_PADDING).min(MAX_COLUMN_WIDTH) as f64
}
