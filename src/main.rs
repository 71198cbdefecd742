use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use db2xlsx::batch::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use db2xlsx::cli;
use db2xlsx::logging::{init_logging, DEFAULT_LOG_CONFIG};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "db2xlsx")]
#[command(about = "Convert SQLite databases into formatted Excel workbooks")]
#[command(long_about = "db2xlsx - SQLite to Excel converter

Every table of a database becomes one worksheet of a .xlsx workbook:
  - styled header row, frozen while scrolling
  - a leading 'Row' column numbering the rows
  - '<column>_readable' date-times next to Unix timestamp columns
  - data_format_N columns renamed from the 'data_format' lookup table

COMMANDS:
  batch     - Convert every input/*.db into output/<name>.xlsx (default)
  convert   - Convert a single database file

EXAMPLES:
  db2xlsx                                   # same as 'db2xlsx batch'
  db2xlsx batch --input-dir data --output-dir reports
  db2xlsx convert plant.db reports/plant.xlsx

LOGGING:
  Optional config/logging.yaml (level, format, directory); RUST_LOG overrides the level.")]
#[command(version)]
struct Cli {
    /// Logging configuration file (YAML); a plain stderr logger is used if missing
    #[arg(long, global = true, default_value = DEFAULT_LOG_CONFIG, env = "DB2XLSX_LOG_CONFIG")]
    log_config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every .db file in a directory, one workbook per file
    Batch {
        /// Directory searched for *.db files
        #[arg(short, long, default_value = DEFAULT_INPUT_DIR)]
        input_dir: PathBuf,

        /// Directory the workbooks are written to
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },

    /// Convert a single SQLite database to an Excel workbook
    Convert {
        /// Path to the SQLite database
        input: PathBuf,

        /// Output Excel file path (.xlsx)
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(&cli.log_config).with_context(|| {
        format!(
            "Failed to initialize logging from {}",
            cli.log_config.display()
        )
    })?;

    let command = cli.command.unwrap_or(Commands::Batch {
        input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
        output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
    });

    let outcome = match command {
        Commands::Batch {
            input_dir,
            output_dir,
        } => cli::batch(input_dir, output_dir).map(|report| ExitCode::from(report.exit_code())),

        Commands::Convert { input, output } => cli::convert(input, output).map(|_| ExitCode::SUCCESS),
    };

    match outcome {
        Ok(code) => Ok(code),
        Err(e) => {
            eprintln!("{} {}", "❌ Error:".bold().red(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}
