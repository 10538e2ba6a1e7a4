//! Error types for the unreliable store.
//!
//! The store is a best-effort cache, so most faults never reach the caller:
//! anything that goes wrong while loading the backing content is recovered as
//! an empty dataset. What remains here is surfaced from mutating operations
//! when encoding or writing the new serialization fails.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Corrupt index {index} for key {key:?} (dataset has {len} entries)")]
    CorruptIndex { key: String, index: u64, len: usize },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Adapter errors
    /// Fault reported by a storage adapter. Custom `Storage` implementations
    /// should return this for failures that are not plain IO.
    #[error("Storage error: {message}")]
    Storage { message: String },
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl StoreError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        StoreError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a decode error from any displayable message.
    pub fn decode(message: impl Into<String>) -> Self {
        StoreError::Decode {
            message: message.into(),
        }
    }

    /// Create a storage adapter error.
    pub fn storage(message: impl Into<String>) -> Self {
        StoreError::Storage {
            message: message.into(),
        }
    }

    /// Whether this error describes malformed content rather than a failing
    /// adapter or medium.
    pub fn is_decode_fault(&self) -> bool {
        matches!(
            self,
            StoreError::Json { .. } | StoreError::Decode { .. } | StoreError::CorruptIndex { .. }
        )
    }
}
