//! Logging capability handed to the conversion core
//!
//! The core only talks to `&dyn ConversionLog`. The process-wide subscriber is
//! set up once by the binary (see [`crate::logging`]).

use std::error::Error;
use uuid::Uuid;

/// The narrow set of log operations the converter needs
pub trait ConversionLog {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
    /// Log a failure together with the context it happened in
    fn exception(&self, context: &str, error: &dyn Error);
}

/// Forwards to `tracing`, tagging every record with the batch trace id
#[derive(Debug, Clone, Default)]
pub struct TracingLog {
    trace_id: Option<Uuid>,
}

impl TracingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_id(trace_id: Uuid) -> Self {
        Self {
            trace_id: Some(trace_id),
        }
    }

    pub fn trace_id(&self) -> Option<Uuid> {
        self.trace_id
    }
}

impl ConversionLog for TracingLog {
    fn debug(&self, message: &str) {
        match self.trace_id {
            Some(id) => tracing::debug!(trace_id = %id, "{}", message),
            None => tracing::debug!("{}", message),
        }
    }

    fn info(&self, message: &str) {
        match self.trace_id {
            Some(id) => tracing::info!(trace_id = %id, "{}", message),
            None => tracing::info!("{}", message),
        }
    }

    fn warning(&self, message: &str) {
        match self.trace_id {
            Some(id) => tracing::warn!(trace_id = %id, "{}", message),
            None => tracing::warn!("{}", message),
        }
    }

    fn error(&self, message: &str) {
        match self.trace_id {
            Some(id) => tracing::error!(trace_id = %id, "{}", message),
            None => tracing::error!("{}", message),
        }
    }

    fn exception(&self, context: &str, error: &dyn Error) {
        let chain = error_chain(error);
        match self.trace_id {
            Some(id) => tracing::error!(trace_id = %id, context, error = %chain, "{}", context),
            None => tracing::error!(context, error = %chain, "{}", context),
        }
    }
}

/// Render an error and all of its sources as "outer: inner: root"
pub fn error_chain(error: &dyn Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // thiserror messages often already embed their source
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Captures records in memory, as `(level, message)` pairs
    #[derive(Default)]
    pub struct RecordingLog {
        pub records: RefCell<Vec<(&'static str, String)>>,
    }

    impl RecordingLog {
        pub fn messages(&self, level: &str) -> Vec<String> {
            self.records
                .borrow()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    impl ConversionLog for RecordingLog {
        fn debug(&self, message: &str) {
            self.records.borrow_mut().push(("debug", message.to_string()));
        }
        fn info(&self, message: &str) {
            self.records.borrow_mut().push(("info", message.to_string()));
        }
        fn warning(&self, message: &str) {
            self.records.borrow_mut().push(("warning", message.to_string()));
        }
        fn error(&self, message: &str) {
            self.records.borrow_mut().push(("error", message.to_string()));
        }
        fn exception(&self, context: &str, error: &dyn Error) {
            self.records
                .borrow_mut()
                .push(("exception", format!("{}: {}", context, error_chain(error))));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    #[test]
    fn test_error_chain_includes_source() {
        let err = ConvertError::Resource {
            path: "out".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let chain = error_chain(&err);
        assert!(chain.contains("out"));
        assert_eq!(chain.matches("disk full").count(), 1);
    }

    #[test]
    fn test_tracing_log_trace_id() {
        let id = Uuid::new_v4();
        assert_eq!(TracingLog::with_trace_id(id).trace_id(), Some(id));
        assert_eq!(TracingLog::new().trace_id(), None);
    }
}
