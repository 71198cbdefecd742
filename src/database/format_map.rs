//! The optional `data_format` lookup table
//!
//! Some logger databases store generic columns (`data_format_0`,
//! `data_format_1`, ...) and describe them in a side table:
//!
//! ```sql
//! CREATE TABLE data_format (data_format_index INTEGER, comment TEXT);
//! ```
//!
//! Loading it is best-effort: every way it can be unusable is a
//! [`LookupUnavailable`] reason, never a conversion error.

use super::Database;
use crate::types::CellValue;
use rusqlite::types::ValueRef;
use std::collections::BTreeMap;
use std::fmt;

pub const FORMAT_TABLE: &str = "data_format";
pub const INDEX_COLUMN: &str = "data_format_index";
pub const LABEL_COLUMN: &str = "comment";
pub const FORMAT_COLUMN_PREFIX: &str = "data_format_";

/// Why the lookup table could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupUnavailable {
    /// No `data_format` table in the database
    MissingTable,
    /// The table exists but lacks the index or label column
    SchemaMismatch { missing: Vec<String> },
    /// Reading the table failed
    Query(String),
}

impl fmt::Display for LookupUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupUnavailable::MissingTable => write!(f, "no '{}' table", FORMAT_TABLE),
            LookupUnavailable::SchemaMismatch { missing } => write!(
                f,
                "'{}' table is missing column(s): {}",
                FORMAT_TABLE,
                missing.join(", ")
            ),
            LookupUnavailable::Query(msg) => write!(f, "failed to read '{}': {}", FORMAT_TABLE, msg),
        }
    }
}

/// Index → human label, as read from `data_format`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatMapping {
    labels: BTreeMap<i64, String>,
}

impl FormatMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: i64, label: impl Into<String>) {
        self.labels.insert(index, label.into());
    }

    pub fn label(&self, index: i64) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(column name, label)` pairs, e.g. `("data_format_0", "Pressure")`
    pub fn column_labels(&self) -> impl Iterator<Item = (String, &str)> {
        self.labels
            .iter()
            .map(|(idx, label)| (format!("{}{}", FORMAT_COLUMN_PREFIX, idx), label.as_str()))
    }

    /// Load the mapping from `db`.
    ///
    /// Rows whose index is not an integer or whose label is null are skipped.
    pub fn load(db: &Database) -> Result<Self, LookupUnavailable> {
        let exists = db
            .table_exists(FORMAT_TABLE)
            .map_err(|e| LookupUnavailable::Query(e.to_string()))?;
        if !exists {
            return Err(LookupUnavailable::MissingTable);
        }

        let columns = db
            .table_columns(FORMAT_TABLE)
            .map_err(|e| LookupUnavailable::Query(e.to_string()))?;
        let missing: Vec<String> = [INDEX_COLUMN, LABEL_COLUMN]
            .iter()
            .filter(|wanted| !columns.iter().any(|c| c.as_str() == **wanted))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LookupUnavailable::SchemaMismatch { missing });
        }

        Self::read_rows(db).map_err(|e| LookupUnavailable::Query(e.to_string()))
    }

    fn read_rows(db: &Database) -> rusqlite::Result<Self> {
        let sql = format!(
            "SELECT {}, {} FROM {}",
            INDEX_COLUMN, LABEL_COLUMN, FORMAT_TABLE
        );
        let mut stmt = db.connection().prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut mapping = Self::new();
        while let Some(row) = rows.next()? {
            let index = match row.get_ref(0)? {
                ValueRef::Integer(i) => i,
                _ => continue,
            };
            let label = match row.get_ref(1)? {
                ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                ValueRef::Integer(i) => CellValue::Integer(i).display_text().unwrap_or_default(),
                ValueRef::Real(f) => CellValue::Real(f).display_text().unwrap_or_default(),
                _ => continue,
            };
            mapping.insert(index, label);
        }
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn memory_db(sql: &str) -> Database {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        Database::from_connection(conn)
    }

    #[test]
    fn test_load_mapping() {
        let db = memory_db(
            "CREATE TABLE data_format (data_format_index INTEGER, comment TEXT);
             INSERT INTO data_format VALUES (0, 'Pressure'), (1, 'Flow');",
        );
        let mapping = FormatMapping::load(&db).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.label(0), Some("Pressure"));
        assert_eq!(mapping.label(1), Some("Flow"));
        assert_eq!(mapping.label(2), None);
    }

    #[test]
    fn test_missing_table() {
        let db = memory_db("CREATE TABLE other (a INTEGER);");
        assert_eq!(
            FormatMapping::load(&db).unwrap_err(),
            LookupUnavailable::MissingTable
        );
    }

    #[test]
    fn test_schema_mismatch() {
        let db = memory_db("CREATE TABLE data_format (idx INTEGER, comment TEXT);");
        assert_eq!(
            FormatMapping::load(&db).unwrap_err(),
            LookupUnavailable::SchemaMismatch {
                missing: vec!["data_format_index".to_string()]
            }
        );
    }

    #[test]
    fn test_skips_unusable_rows() {
        let db = memory_db(
            "CREATE TABLE data_format (data_format_index, comment);
             INSERT INTO data_format VALUES (0, NULL), ('x', 'Text index'), (3, 'Temp'), (4, 12);",
        );
        let mapping = FormatMapping::load(&db).unwrap();
        assert_eq!(mapping.label(0), None);
        assert_eq!(mapping.label(3), Some("Temp"));
        assert_eq!(mapping.label(4), Some("12"));
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_column_labels() {
        let mut mapping = FormatMapping::new();
        mapping.insert(2, "Voltage");
        let pairs: Vec<(String, &str)> = mapping.column_labels().collect();
        assert_eq!(pairs, vec![("data_format_2".to_string(), "Voltage")]);
    }
}
