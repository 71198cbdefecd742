//! Rename `data_format_<N>` columns using the lookup table

use crate::database::FormatMapping;
use crate::types::Table;
use std::collections::HashMap;

/// Rename every column named `data_format_<N>` that has a label for `N`.
///
/// Returns the number of columns renamed. Columns without a label keep
/// their name.
pub fn rename_format_columns(table: &mut Table, mapping: &FormatMapping) -> usize {
    // Look up by original name so a label never gets renamed again
    let labels: HashMap<String, &str> = mapping.column_labels().collect();

    let mut renamed = 0;
    for column in table.columns.iter_mut() {
        if let Some(label) = labels.get(&column.name) {
            column.name = label.to_string();
            renamed += 1;
        }
    }
    renamed
}
