//! Error types for the daily brief generator.
//!
//! Library crates use [`DailyBriefError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all daily brief operations.
#[derive(Debug, thiserror::Error)]
pub enum DailyBriefError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during an agent fetch.
    #[error("network error: {0}")]
    Network(String),

    /// Feed extraction or field-mapping error.
    #[error("feed error: {message}")]
    Feed { message: String },

    /// The host document's sentinel markers are missing, duplicated,
    /// or out of order.
    #[error("malformed document: {message}")]
    MalformedDocument { message: String },

    /// Structural validation of a brief document failed.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DailyBriefError>;

impl DailyBriefError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a feed error from any displayable message.
    pub fn feed(msg: impl Into<String>) -> Self {
        Self::Feed {
            message: msg.into(),
        }
    }

    /// Create a malformed-document error from any displayable message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DailyBriefError::config("missing host path");
        assert_eq!(err.to_string(), "config error: missing host path");

        let err = DailyBriefError::malformed("BEGIN marker after END marker");
        assert!(err.to_string().contains("BEGIN marker after END marker"));
    }
}
