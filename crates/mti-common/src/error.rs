//! Error types for the importer

use thiserror::Error;

/// Result type alias for importer operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Main error type for the importer
///
/// Variants fall into two classes. Everything except [`ImportError::Index`]
/// aborts a run; index errors are scoped to a single batch and are retried
/// by the submission workers.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ImportError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn index(msg: impl Into<String>) -> Self {
        Self::Index(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error terminates the whole run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Index(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_errors_are_recoverable() {
        assert!(!ImportError::index("503 Service Unavailable").is_fatal());
    }

    #[test]
    fn test_source_errors_are_fatal() {
        assert!(ImportError::not_found("/data/missing.txt").is_fatal());
        assert!(ImportError::storage("bucket unreachable").is_fatal());
        assert!(ImportError::config("empty delimiter").is_fatal());

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(ImportError::from(io).is_fatal());
    }

    #[test]
    fn test_display_messages() {
        let err = ImportError::not_found("File does not exist: '/tmp/x.txt'");
        assert_eq!(
            err.to_string(),
            "Source not found: File does not exist: '/tmp/x.txt'"
        );
    }
}
