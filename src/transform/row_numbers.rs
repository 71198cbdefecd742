use crate::types::{CellValue, Column, Table};

pub const ROW_NUMBER_COLUMN: &str = "Row";

/// Prepend a `Row` column numbering the rows 1..=N in their current order
pub fn add_row_numbers(table: &mut Table) {
    let numbers = (1..=table.row_count() as i64)
        .map(CellValue::Integer)
        .collect();
    table.insert_column(0, Column::new(ROW_NUMBER_COLUMN, numbers));
}
