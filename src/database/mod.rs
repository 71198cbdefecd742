//! Read-only access to the source SQLite database
//!
//! - [`Database::list_tables`] lists user tables (skips `sqlite_*`)
//! - [`Database::read_table`] reads a whole table, columns in query order
//! - [`format_map`] loads the optional `data_format` lookup table

pub mod format_map;

pub use format_map::{FormatMapping, LookupUnavailable};

use crate::error::{ConvertError, ConvertResult};
use crate::types::{CellValue, Column, Table};
use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

/// Tables whose name starts with this prefix are reserved by SQLite
pub const SYSTEM_TABLE_PREFIX: &str = "sqlite_";

/// An open, read-only connection to a source database.
///
/// The connection is closed when the value is dropped.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing database file read-only
    pub fn open(path: &Path) -> ConvertResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        Ok(Self { conn })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// List all user tables in schema order
    pub fn list_tables(&self) -> ConvertResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = ?1 AND name NOT LIKE ?2")?;
        let pattern = format!("{}%", SYSTEM_TABLE_PREFIX);
        let rows = stmt.query_map(params!["table", pattern], |row| row.get::<_, String>(0))?;

        let mut tables = Vec::new();
        for name in rows {
            tables.push(name?);
        }
        Ok(tables)
    }

    pub fn table_exists(&self, name: &str) -> ConvertResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2",
                params!["table", name],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Column names of `table`, in declaration order
    pub fn table_columns(&self, table: &str) -> ConvertResult<Vec<String>> {
        let name = validate_identifier(table)?;
        let sql = format!("PRAGMA table_info({})", quote_identifier(name));
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;

        let mut columns = Vec::new();
        for column in rows {
            columns.push(column?);
        }
        Ok(columns)
    }

    /// Read every row and column of `name`.
    ///
    /// The name is validated before it is interpolated into the query; an
    /// unknown table is reported as not found without running the query.
    pub fn read_table(&self, name: &str) -> ConvertResult<Table> {
        let name = validate_identifier(name)?;
        if !self.table_exists(name)? {
            return Err(ConvertError::NotFound(format!(
                "Table '{}' does not exist in database",
                name
            )));
        }

        let sql = format!("SELECT * FROM {}", quote_identifier(name));
        let mut stmt = self.conn.prepare(&sql)?;
        let column_names: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); column_names.len()];
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (idx, column) in values.iter_mut().enumerate() {
                column.push(cell_from_ref(row.get_ref(idx)?));
            }
        }

        let mut table = Table::new(name);
        for (column_name, column_values) in column_names.into_iter().zip(values) {
            table.add_column(Column::new(column_name, column_values));
        }
        Ok(table)
    }
}

fn cell_from_ref(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Real(f),
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => CellValue::Blob(bytes.to_vec()),
    }
}

/// Check that an identifier only holds word characters and whitespace
pub fn validate_identifier(identifier: &str) -> ConvertResult<&str> {
    if identifier.is_empty() {
        return Err(ConvertError::InvalidInput(
            "SQL identifier cannot be empty".to_string(),
        ));
    }

    let safe = Regex::new(r"^[\w\s]+$")
        .map_err(|e| ConvertError::InvalidInput(format!("Regex error: {}", e)))?;
    if !safe.is_match(identifier) {
        return Err(ConvertError::InvalidInput(format!(
            "Invalid SQL identifier '{}': only alphanumeric characters, underscores, and spaces are allowed",
            identifier
        )));
    }
    Ok(identifier)
}

/// Double-quote an identifier, doubling any embedded quotes
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
