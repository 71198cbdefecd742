//! Process-wide logging setup, done once by the binary
//!
//! Reads an optional YAML file (default `config/logging.yaml`):
//!
//! ```yaml
//! level: debug        # any EnvFilter directive, default "info"
//! format: full        # plain | compact | full, default "plain"
//! directory: logs     # optional; appends to logs/db2xlsx.log instead of stderr
//! ```
//!
//! Without the file, messages go to stderr at `info` with no decoration.
//! `RUST_LOG` always wins over the configured level.

use crate::error::{ConvertError, ConvertResult};
use serde::Deserialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_CONFIG: &str = "config/logging.yaml";
pub const LOG_FILE_NAME: &str = "db2xlsx.log";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Message text only
    #[default]
    Plain,
    Compact,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Plain,
            directory: None,
        }
    }
}

impl LoggingConfig {
    pub fn from_yaml(content: &str) -> ConvertResult<Self> {
        serde_yaml::from_str(content).map_err(|e| ConvertError::Config(e.to_string()))
    }

    /// Load `path`, or `None` when the file does not exist
    pub fn load(path: &Path) -> ConvertResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map(Some)
            .map_err(|e| ConvertError::Config(format!("{}: {}", path.display(), e)))
    }

    fn writer(&self) -> ConvertResult<BoxMakeWriter> {
        match &self.directory {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|source| ConvertError::Resource {
                    path: dir.clone(),
                    source,
                })?;
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(dir.join(LOG_FILE_NAME))?;
                Ok(BoxMakeWriter::new(Mutex::new(file)))
            }
            None => Ok(BoxMakeWriter::new(std::io::stderr)),
        }
    }
}

/// Where the active logging configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingSource {
    File(PathBuf),
    Fallback,
}

/// Install the global subscriber from `config_path`, or the fallback
pub fn init_logging(config_path: &Path) -> ConvertResult<LoggingSource> {
    let (config, source) = match LoggingConfig::load(config_path)? {
        Some(config) => (config, LoggingSource::File(config_path.to_path_buf())),
        None => (LoggingConfig::default(), LoggingSource::Fallback),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(config.writer()?)
        .with_ansi(config.directory.is_none());

    let installed = match config.format {
        LogFormat::Plain => builder
            .without_time()
            .with_target(false)
            .with_level(false)
            .try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Full => builder.try_init(),
    };
    installed.map_err(|e| ConvertError::Config(e.to_string()))?;
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_yaml_full() {
        let config = LoggingConfig::from_yaml("level: debug\nformat: compact\ndirectory: logs\n").unwrap();
        assert_eq!(
            config,
            LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Compact,
                directory: Some(PathBuf::from("logs")),
            }
        );
    }

    #[test]
    fn test_from_yaml_defaults() {
        let config = LoggingConfig::from_yaml("format: full\n").unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Full);
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_from_yaml_rejects_unknown() {
        let err = LoggingConfig::from_yaml("colour: blue\n").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
        assert!(LoggingConfig::from_yaml("format: fancy\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(LoggingConfig::load(&dir.path().join("logging.yaml")).unwrap(), None);
    }

    #[test]
    fn test_load_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logging.yaml");
        std::fs::write(&path, "level: warn\n").unwrap();
        let config = LoggingConfig::load(&path).unwrap().unwrap();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn test_writer_creates_log_directory() {
        let dir = TempDir::new().unwrap();
        let config = LoggingConfig {
            directory: Some(dir.path().join("logs")),
            ..LoggingConfig::default()
        };
        assert!(config.writer().is_ok());
        assert!(dir.path().join("logs").join(LOG_FILE_NAME).exists());
    }
}
