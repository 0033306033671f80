//! Error types for Stockwise.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Catalog source unreadable or malformed. Fatal at startup.
    #[error("Error loading knowledge base: {0}")]
    DataLoad(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Summarization error: {0}")]
    Summarization(String),

    #[error("{0}")]
    Validation(String),

    #[error("{operation} timed out after {}s", .after.as_secs_f64())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error is the caller's fault rather than the service's.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = Error::Timeout {
            operation: "embedding",
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "embedding timed out after 1.5s");
    }

    #[test]
    fn test_validation_is_client_error() {
        assert!(Error::Validation("Query is required".into()).is_client_error());
        assert!(!Error::Embedding("model crashed".into()).is_client_error());
    }
}
