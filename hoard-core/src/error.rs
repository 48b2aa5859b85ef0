//! Error types for HOARD operations

use std::time::Duration;
use thiserror::Error;

use crate::ContentHash;

/// Validation errors raised before a record is hashed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Record cannot be encoded: {reason}")]
    Unencodable { reason: String },
}

/// Codec errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Encode failed: {reason}")]
    Encode { reason: String },

    #[error("Decode failed: {reason}")]
    Decode { reason: String },
}

/// Errors reported by a storage backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend {backend} unavailable: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },

    #[error("Backend {operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Backend is closed")]
    Closed,
}

impl BackendError {
    /// Shorthand for an [`BackendError::Unavailable`] carrying any displayable cause.
    pub fn unavailable(backend: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            backend,
            reason: reason.to_string(),
        }
    }
}

/// Master error type returned by the cache service.
///
/// These are the only outcomes a caller of `store`/`retrieve` has to handle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("No entry for hash {hash}")]
    NotFound { hash: ContentHash },

    #[error("Entry {hash} is corrupt: {reason}")]
    CorruptEntry { hash: ContentHash, reason: String },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(#[from] BackendError),
}

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

// =============================================================================
// TESTS
// =============================================================================
