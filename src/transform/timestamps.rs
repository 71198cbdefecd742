//! Unix epoch detection and `<column>_readable` expansion

use crate::types::{CellValue, Column, Table};
use chrono::{DateTime, NaiveDateTime};

/// 2000-01-01T00:00:00Z
pub const UNIX_TIMESTAMP_MIN: i64 = 946_684_800;
/// 2100-01-01T00:00:00Z
pub const UNIX_TIMESTAMP_MAX: i64 = 4_102_444_800;

pub const TIMESTAMP_KEYWORDS: [&str; 3] = ["time", "timestamp", "date"];
/// Suffix convention for event columns such as `created_at`
pub const TIMESTAMP_SUFFIX: &str = "_at";
pub const READABLE_SUFFIX: &str = "_readable";

/// Name gate: the lowercased name contains one of [`TIMESTAMP_KEYWORDS`]
/// or ends with [`TIMESTAMP_SUFFIX`]
pub fn name_suggests_timestamp(name: &str) -> bool {
    let lower = name.to_lowercase();
    TIMESTAMP_KEYWORDS.iter().any(|kw| lower.contains(kw)) || lower.ends_with(TIMESTAMP_SUFFIX)
}

/// Value gate: at least one non-null value, and every non-null value is a
/// number inside `[UNIX_TIMESTAMP_MIN, UNIX_TIMESTAMP_MAX]`
pub fn values_look_like_epoch(values: &[CellValue]) -> bool {
    let mut seen = false;
    for value in values {
        if value.is_null() {
            continue;
        }
        match value.as_f64() {
            Some(n) if (UNIX_TIMESTAMP_MIN as f64..=UNIX_TIMESTAMP_MAX as f64).contains(&n) => {
                seen = true
            }
            _ => return false,
        }
    }
    seen
}

pub fn is_timestamp_column(column: &Column) -> bool {
    name_suggests_timestamp(&column.name) && values_look_like_epoch(&column.values)
}

/// Convert epoch seconds to a naive UTC date-time; `None` when out of range
pub fn epoch_to_datetime(value: &CellValue) -> Option<NaiveDateTime> {
    let dt = match value {
        CellValue::Integer(secs) => DateTime::from_timestamp(*secs, 0)?,
        CellValue::Real(f) if f.is_finite() => {
            let secs = f.floor();
            let nanos = ((f - secs) * 1e9).round().min(999_999_999.0) as u32;
            DateTime::from_timestamp(secs as i64, nanos)?
        }
        _ => return None,
    };
    Some(dt.naive_utc())
}

/// Add a `<name>_readable` column right after every timestamp column.
///
/// Returns the names of the source columns that were expanded.
pub fn expand_timestamps(table: &mut Table) -> Vec<String> {
    let mut insertions: Vec<(usize, Column)> = Vec::new();

    for (idx, column) in table.columns.iter().enumerate() {
        if !is_timestamp_column(column) {
            continue;
        }
        let readable = column
            .values
            .iter()
            .map(|v| epoch_to_datetime(v).map_or(CellValue::Null, CellValue::DateTime))
            .collect();
        insertions.push((
            idx + 1,
            Column::new(format!("{}{}", column.name, READABLE_SUFFIX), readable),
        ));
    }

    let expanded = insertions
        .iter()
        .map(|(pos, _)| table.columns[pos - 1].name.clone())
        .collect();

    // Rightmost first so earlier positions stay valid
    for (pos, column) in insertions.into_iter().rev() {
        table.insert_column(pos, column);
    }
    expanded
}
