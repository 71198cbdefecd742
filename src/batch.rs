//! Batch driver: convert every `*.db` in a directory, one file at a time
//!
//! A failure on one file is logged and counted; the remaining files are
//! still converted.

use crate::convert::{convert_db_to_excel, ConversionSummary, DB_FILE_EXTENSION, EXCEL_FILE_EXTENSION};
use crate::error::{validate_non_empty, ConvertError, ConvertResult};
use crate::log::{error_chain, ConversionLog};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DEFAULT_INPUT_DIR: &str = "input";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Characters replaced by `_` in derived output file names
pub const INVALID_FILENAME_CHARS: [char; 7] = ['<', '>', ':', '"', '|', '?', '*'];

/// Find the `*.db` files directly inside `input_dir`, sorted by path
pub fn find_database_files(input_dir: &Path) -> ConvertResult<Vec<PathBuf>> {
    let input_dir = PathBuf::from(validate_non_empty(
        &input_dir.to_string_lossy(),
        "Input directory",
    )?);

    if !input_dir.exists() {
        return Err(ConvertError::NotFound(format!(
            "Input directory does not exist: {}",
            input_dir.display()
        )));
    }
    if !input_dir.is_dir() {
        return Err(ConvertError::InvalidInput(format!(
            "Path is not a directory: {}",
            input_dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(&input_dir)? {
        let path = entry?.path();
        let is_db = path.extension().and_then(|e| e.to_str()) == Some(DB_FILE_EXTENSION);
        if is_db && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(ConvertError::NotFound(format!(
            "No .{} files found in '{}' folder",
            DB_FILE_EXTENSION,
            input_dir.display()
        )));
    }
    Ok(files)
}

/// `<output_dir>/<stem>.xlsx`, with characters unsafe in file names replaced
pub fn output_path_for(db_path: &Path, output_dir: &Path) -> ConvertResult<PathBuf> {
    let db_path = PathBuf::from(validate_non_empty(&db_path.to_string_lossy(), "Database path")?);
    let output_dir = PathBuf::from(validate_non_empty(
        &output_dir.to_string_lossy(),
        "Output directory",
    )?);

    let stem = db_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem.is_empty() {
        return Err(ConvertError::InvalidInput(format!(
            "Could not extract filename from path: {}",
            db_path.display()
        )));
    }

    let safe_stem: String = stem
        .chars()
        .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect();
    Ok(output_dir.join(format!("{}.{}", safe_stem, EXCEL_FILE_EXTENSION)))
}

/// A file that could not be converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub source: PathBuf,
    pub message: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub trace_id: Uuid,
    pub converted: Vec<ConversionSummary>,
    pub failures: Vec<FileFailure>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    pub fn succeeded(&self) -> usize {
        self.converted.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Percentage of files converted, 0 for an empty batch
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.succeeded() as f64 / self.total() as f64 * 100.0
    }

    /// Process exit status: 0 when every file converted, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.failures.is_empty() {
            0
        } else {
            1
        }
    }
}

/// Convert every database in `input_dir` into `output_dir`.
///
/// Only discovery problems are returned as errors; per-file failures end up
/// in [`BatchReport::failures`].
pub fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    trace_id: Uuid,
    log: &dyn ConversionLog,
) -> ConvertResult<BatchReport> {
    let started = Instant::now();
    log.info("Starting batch conversion");

    let files = find_database_files(input_dir)?;
    log.info(&format!("Found {} database file(s)", files.len()));

    let mut report = BatchReport {
        trace_id,
        converted: Vec::new(),
        failures: Vec::new(),
        elapsed: Duration::ZERO,
    };

    for db_path in files {
        let file_started = Instant::now();
        let result = output_path_for(&db_path, output_dir).and_then(|output_path| {
            log.info(&format!(
                "Converting database {} -> {}",
                db_path.display(),
                output_path.display()
            ));
            convert_db_to_excel(&db_path, &output_path, log)
        });

        match result {
            Ok(summary) => {
                log.info(&format!(
                    "Successfully converted {} in {:.2} ms",
                    db_path.display(),
                    file_started.elapsed().as_secs_f64() * 1000.0
                ));
                report.converted.push(summary);
            }
            Err(e) => {
                log.exception(&format!("Converting {}", db_path.display()), &e);
                report.failures.push(FileFailure {
                    source: db_path,
                    message: error_chain(&e),
                });
            }
        }
    }

    report.elapsed = started.elapsed();
    log.info(&format!(
        "Batch conversion completed: {} file(s), {} succeeded, {} failed, {:.2} ms, success rate {:.1}%",
        report.total(),
        report.succeeded(),
        report.failed(),
        report.elapsed.as_secs_f64() * 1000.0,
        report.success_rate()
    ));
    Ok(report)
}
