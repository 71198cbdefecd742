use std::path::PathBuf;
use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to create output directory {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write workbook {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Excel export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`ConvertError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Resource,
    Database,
    Export,
    Io,
    Config,
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::NotFound(_) => ErrorKind::NotFound,
            ConvertError::InvalidInput(_) => ErrorKind::InvalidInput,
            ConvertError::Resource { .. } => ErrorKind::Resource,
            ConvertError::Save { .. } => ErrorKind::Io,
            ConvertError::Database(_) => ErrorKind::Database,
            ConvertError::Export(_) => ErrorKind::Export,
            ConvertError::Io(_) => ErrorKind::Io,
            ConvertError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Trim `value` and reject it when nothing is left.
///
/// `name` is used in the error message, e.g. "Database path cannot be empty".
pub fn validate_non_empty<'a>(value: &'a str, name: &str) -> ConvertResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConvertError::InvalidInput(format!("{} cannot be empty", name)));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_empty_trims() {
        assert_eq!(validate_non_empty("  input/a.db ", "Database path").unwrap(), "input/a.db");
    }

    #[test]
    fn test_validate_non_empty_rejects_whitespace() {
        let err = validate_non_empty(" \t ", "Output path").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("Output path cannot be empty"));
    }

    #[test]
    fn test_resource_error_keeps_cause() {
        use std::error::Error;

        let err = ConvertError::Resource {
            path: PathBuf::from("/root/out"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.kind(), ErrorKind::Resource);
        assert!(err.to_string().contains("/root/out"));
        assert!(err.source().is_some());
    }
}
