//! Single-file conversion: one SQLite database → one `.xlsx` workbook
//!
//! Steps, in order:
//! 1. validate the source and output paths (no side effects yet)
//! 2. list tables; a database without tables is rejected
//! 3. create the output directory
//! 4. per table: read → rename → expand timestamps → number rows → write + format
//! 5. save the workbook once, atomically
//!
//! Any failure aborts the whole file and no workbook is written.

use crate::database::{Database, FormatMapping};
use crate::error::{validate_non_empty, ConvertError, ConvertResult};
use crate::excel::{ExcelExporter, SheetSummary, MAX_CELL_TEXT_LENGTH};
use crate::log::ConversionLog;
use crate::transform;
use std::fs;
use std::path::{Path, PathBuf};

pub const DB_FILE_EXTENSION: &str = "db";
pub const EXCEL_FILE_EXTENSION: &str = "xlsx";

/// Result of converting one database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub source: PathBuf,
    pub output: PathBuf,
    pub sheets: Vec<SheetSummary>,
}

impl ConversionSummary {
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.rows).sum()
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Check both paths before anything touches the filesystem.
///
/// Returns the trimmed paths.
fn validate_paths(
    db_path: &Path,
    output_path: &Path,
    log: &dyn ConversionLog,
) -> ConvertResult<(PathBuf, PathBuf)> {
    let db_path = PathBuf::from(validate_non_empty(&db_path.to_string_lossy(), "Database path")?);
    let output_path =
        PathBuf::from(validate_non_empty(&output_path.to_string_lossy(), "Output path")?);

    if !db_path.exists() {
        return Err(ConvertError::NotFound(format!(
            "Database file not found: {}",
            db_path.display()
        )));
    }
    if !db_path.is_file() {
        return Err(ConvertError::InvalidInput(format!(
            "Path is not a file: {}",
            db_path.display()
        )));
    }
    if !has_extension(&db_path, DB_FILE_EXTENSION) {
        log.warning(&format!(
            "File does not have .{} extension: {}",
            DB_FILE_EXTENSION,
            db_path.display()
        ));
    }
    if !has_extension(&output_path, EXCEL_FILE_EXTENSION) {
        return Err(ConvertError::InvalidInput(format!(
            "Output file must have .{} extension: {}",
            EXCEL_FILE_EXTENSION,
            output_path.display()
        )));
    }
    Ok((db_path, output_path))
}

fn create_output_dir(output_path: &Path) -> ConvertResult<()> {
    match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| ConvertError::Resource {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Convert every table of `db_path` into a worksheet of `output_path`
pub fn convert_db_to_excel(
    db_path: &Path,
    output_path: &Path,
    log: &dyn ConversionLog,
) -> ConvertResult<ConversionSummary> {
    let (db_path, output_path) = validate_paths(db_path, output_path, log)?;

    let db = Database::open(&db_path)?;
    let tables = db.list_tables()?;
    if tables.is_empty() {
        return Err(ConvertError::InvalidInput(
            "Database does not contain any tables".to_string(),
        ));
    }

    create_output_dir(&output_path)?;

    log.info(&format!("Found {} table(s) in database:", tables.len()));
    for table in &tables {
        log.info(&format!("  - {}", table));
    }

    let mapping = FormatMapping::load(&db);
    match &mapping {
        Ok(m) => log.debug(&format!("Loaded {} column label(s) from data_format", m.len())),
        Err(reason) => log.debug(&format!("Skipping column renaming: {}", reason)),
    }

    let mut exporter = ExcelExporter::new();
    for name in &tables {
        let mut table = db.read_table(name)?;
        let report = transform::apply_all(&mut table, &mapping);
        if !report.expanded.is_empty() {
            log.debug(&format!(
                "  Table '{}': readable timestamps for {}",
                name,
                report.expanded.join(", ")
            ));
        }

        let sheet = exporter.add_table(&table)?;
        for column in &sheet.truncated_columns {
            log.warning(&format!(
                "  Table '{}': values in column '{}' cut to {} characters",
                name, column, MAX_CELL_TEXT_LENGTH
            ));
        }
        log.info(&format!(
            "  Table '{}': {} rows, {} columns",
            name, sheet.rows, sheet.columns
        ));
    }

    let sheets = exporter.sheets().to_vec();
    exporter.save(&output_path)?;
    log.info(&format!("Success! Data saved to: {}", output_path.display()));

    Ok(ConversionSummary {
        source: db_path,
        output: output_path,
        sheets,
    })
}
