//! Store error types for typed error handling.
//!
//! Validation failures (duplicate handles, unsupported values, bad patterns)
//! are returned synchronously to the caller. File corruption is never
//! reported here: it is repaired when a handle is opened.

use std::path::PathBuf;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Store errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Another live handle already owns this path.
    #[error("file [ {} ] already connected", .path.display())]
    AlreadyConnected { path: PathBuf },

    /// Value cannot be represented in the JSON document.
    #[error("unsupported type [ {type_name} ]: {reason}")]
    UnsupportedType { type_name: String, reason: String },

    /// Key pattern is not a valid regular expression.
    #[error("invalid key pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Construction parameters rejected by validation.
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Background work requested outside a tokio runtime.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// IO error with context.
    #[error("IO error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON encode/decode error with context.
    #[error("JSON error in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a JSON error with context.
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create an already-connected error.
    pub fn already_connected(path: impl Into<PathBuf>) -> Self {
        Self::AlreadyConnected { path: path.into() }
    }

    /// Create an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for errors caused by the caller's input rather than I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::AlreadyConnected { .. }
                | Self::UnsupportedType { .. }
                | Self::InvalidPattern(_)
                | Self::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_connected_message() {
        let err = Error::already_connected("/tmp/db.json");
        assert_eq!(err.to_string(), "file [ /tmp/db.json ] already connected");
        assert!(err.is_validation());
    }

    #[test]
    fn test_io_error_is_not_validation() {
        let err = Error::io(
            "reading store",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().starts_with("IO error in reading store"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_unsupported_type_message() {
        let err = Error::unsupported_type("HashMap<(i32, i32), u8>", "key must be a string");
        assert!(err.to_string().contains("HashMap<(i32, i32), u8>"));
        assert!(err.to_string().contains("key must be a string"));
    }
}
