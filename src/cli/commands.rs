use crate::batch::{run_batch, BatchReport, DEFAULT_INPUT_DIR};
use crate::convert::{convert_db_to_excel, ConversionSummary};
use crate::error::ConvertResult;
use crate::log::{ConversionLog, TracingLog};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Format a duration in milliseconds with two decimals
fn format_millis(elapsed: Duration) -> String {
    format!("{:.2} ms", elapsed.as_secs_f64() * 1000.0)
}

fn print_sheets(summary: &ConversionSummary) {
    for sheet in &summary.sheets {
        let renamed = if sheet.sheet != sheet.table {
            format!(" (sheet '{}')", sheet.sheet)
        } else {
            String::new()
        };
        println!(
            "      {}{}: {} rows, {} columns",
            sheet.table.bright_blue(),
            renamed,
            sheet.rows,
            sheet.columns
        );
    }
}

/// Execute the convert command
pub fn convert(input: PathBuf, output: PathBuf) -> ConvertResult<ConversionSummary> {
    println!("{}", "🗄  db2xlsx - Convert".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    let log = TracingLog::new();
    let summary = match convert_db_to_excel(&input, &output, &log) {
        Ok(summary) => summary,
        Err(e) => {
            log.exception(&format!("Converting {}", input.display()), &e);
            return Err(e);
        }
    };

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   Excel file: {}", summary.output.display());
    print_sheets(&summary);
    println!();

    Ok(summary)
}

/// Execute the batch command
pub fn batch(input_dir: PathBuf, output_dir: PathBuf) -> ConvertResult<BatchReport> {
    let trace_id = Uuid::new_v4();
    println!("{}", "🗄  db2xlsx - Batch conversion".bold().green());
    println!("   Input dir:  {}", input_dir.display());
    println!("   Output dir: {}", output_dir.display());
    println!("   Trace id:   {}\n", trace_id.to_string().dimmed());

    let log = TracingLog::with_trace_id(trace_id);
    let report = match run_batch(&input_dir, &output_dir, trace_id, &log) {
        Ok(report) => report,
        Err(e) => {
            log.exception("Finding database files", &e);
            if input_dir == PathBuf::from(DEFAULT_INPUT_DIR) {
                log.error(&format!(
                    "Make sure .db files are located in the '{}/' folder",
                    DEFAULT_INPUT_DIR
                ));
            }
            return Err(e);
        }
    };

    for summary in &report.converted {
        println!("   {} {}", "✅".green(), summary.output.display());
        print_sheets(summary);
    }
    for failure in &report.failures {
        println!(
            "   {} {}: {}",
            "❌".red(),
            failure.source.display(),
            failure.message.red()
        );
    }
    println!();

    let headline = format!(
        "{} file(s): {} converted, {} failed ({:.1}%) in {}",
        report.total(),
        report.succeeded(),
        report.failed(),
        report.success_rate(),
        format_millis(report.elapsed)
    );
    if report.failures.is_empty() {
        println!("{}", headline.bold().green());
    } else {
        println!("{}", headline.bold().yellow());
    }

    Ok(report)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
