//! Error types for Tessera
//!
//! This module defines the common error type used throughout the client
//! library. Crate-local errors (metadata store, semantics) convert into it.

use crate::types::BackendIndex;
use thiserror::Error;

/// Common result type for Tessera operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for Tessera
#[derive(Debug, Error)]
pub enum Error {
    // Metadata errors
    #[error("metadata store error: {0}")]
    MetaStore(String),

    #[error("malformed document in {namespace}: {reason}")]
    MalformedDocument { namespace: String, reason: String },

    // Iteration errors
    #[error("iterator has no current entry")]
    NoCurrentEntry,

    // Connection errors
    #[error("backend not found: {0}")]
    BackendNotFound(BackendIndex),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed document error
    pub fn malformed(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed("s.collections", "missing field `name`");
        assert_eq!(
            err.to_string(),
            "malformed document in s.collections: missing field `name`"
        );
        assert_eq!(
            Error::BackendNotFound(BackendIndex::METADATA).to_string(),
            "backend not found: 0"
        );
    }
}
