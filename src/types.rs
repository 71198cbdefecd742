use chrono::NaiveDateTime;

//==============================================================================
// Cell Values
//==============================================================================

/// A single scalar read from a SQLite row or derived during conversion
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    /// Calendar date-time derived from an epoch timestamp (UTC, no offset)
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the value; `None` for anything that is not a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Text used for column width sizing, `None` for null cells
    pub fn display_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Integer(i) => Some(i.to_string()),
            // Debug keeps the trailing ".0" on whole floats ("3.0", not "3")
            CellValue::Real(f) => Some(format!("{:?}", f)),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Blob(bytes) => Some(blob_text(bytes)),
            CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// Blobs are written as lossy UTF-8 text
pub fn blob_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

//==============================================================================
// Tables
//==============================================================================

/// A named column holding one value per row
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when the column has at least one date-time value and nothing
    /// else besides nulls
    pub fn is_datetime(&self) -> bool {
        let mut seen = false;
        for value in &self.values {
            match value {
                CellValue::DateTime(_) => seen = true,
                CellValue::Null => {}
                _ => return false,
            }
        }
        seen
    }
}

/// A table read from the source database, column-oriented.
///
/// Column order is the query order and is preserved through every transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Insert a column at `index`, shifting everything after it right
    pub fn insert_column(&mut self, index: usize, column: Column) {
        self.columns.insert(index, column);
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of rows (length of first column, all should be same)
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |col| col.len())
    }

    /// Validate all columns have the same length
    pub fn validate_lengths(&self) -> Result<(), String> {
        let row_count = self.row_count();
        for column in &self.columns {
            if column.len() != row_count {
                return Err(format!(
                    "Column '{}' has {} rows, expected {} rows",
                    column.name,
                    column.len(),
                    row_count
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_display_text() {
        assert_eq!(CellValue::Null.display_text(), None);
        assert_eq!(CellValue::Integer(42).display_text().unwrap(), "42");
        assert_eq!(CellValue::Real(3.0).display_text().unwrap(), "3.0");
        assert_eq!(CellValue::Real(1.25).display_text().unwrap(), "1.25");
        assert_eq!(
            CellValue::Blob(b"abc".to_vec()).display_text().unwrap(),
            "abc"
        );

        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(
            CellValue::DateTime(dt).display_text().unwrap(),
            "2024-01-02 03:04:05"
        );
    }

    #[test]
    fn test_column_is_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let col = Column::new("a", vec![CellValue::DateTime(dt), CellValue::Null]);
        assert!(col.is_datetime());

        let all_null = Column::new("b", vec![CellValue::Null]);
        assert!(!all_null.is_datetime());

        let mixed = Column::new("c", vec![CellValue::DateTime(dt), CellValue::Integer(1)]);
        assert!(!mixed.is_datetime());
    }

    #[test]
    fn test_table_lengths() {
        let mut table = Table::new("t");
        table.add_column(Column::new("a", vec![CellValue::Integer(1)]));
        table.add_column(Column::new("b", vec![]));
        assert_eq!(table.row_count(), 1);
        assert!(table.validate_lengths().is_err());
    }

    #[test]
    fn test_insert_column_keeps_order() {
        let mut table = Table::new("t");
        table.add_column(Column::new("a", vec![]));
        table.add_column(Column::new("c", vec![]));
        table.insert_column(1, Column::new("b", vec![]));
        assert_eq!(table.column_names(), vec!["a", "b", "c"]);
    }
}
