//! Error Types for HOARD API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//! - The mapping from cache-service failures to HTTP status codes
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hoard_core::{BackendError, CacheError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Nothing is stored under the requested hash
    EntityNotFound,

    // ========================================================================
    // Server Errors (500, 503, 504)
    // ========================================================================
    /// Stored entry exists but cannot be decoded
    CorruptEntry,

    /// Internal server error
    InternalError,

    /// Backing store is temporarily unavailable
    ServiceUnavailable,

    /// Backing store did not answer in time
    Timeout,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField => StatusCode::BAD_REQUEST,

            ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,

            ErrorCode::CorruptEntry | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::EntityNotFound => "Person not found",
            ErrorCode::CorruptEntry => "Stored entry is corrupt",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::Timeout => "Operation timed out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (offending field, hash, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create a ValidationFailed error.
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
        .with_details(serde_json::json!({ "field": field }))
    }

    /// Create an EntityNotFound error for a hash.
    pub fn not_found(hash: impl fmt::Display) -> Self {
        Self::from_code(ErrorCode::EntityNotFound)
            .with_details(serde_json::json!({ "hash": hash.to_string() }))
    }

    /// Create a CorruptEntry error.
    pub fn corrupt_entry(hash: impl fmt::Display) -> Self {
        Self::from_code(ErrorCode::CorruptEntry)
            .with_details(serde_json::json!({ "hash": hash.to_string() }))
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Create a Timeout error.
    pub fn timeout(operation: &str) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("Operation '{}' timed out", operation),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in Axum.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM CORE AND FRAMEWORK ERRORS
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(&field),
            ValidationError::InvalidValue { field, reason } => {
                ApiError::validation_failed(format!("Invalid value for {}: {}", field, reason))
                    .with_details(serde_json::json!({ "field": field }))
            }
            ValidationError::Unencodable { reason } => ApiError::validation_failed(reason),
        }
    }
}

/// Convert from CacheError to ApiError.
///
/// Server-side failures are logged here, before the details are reduced to
/// a generic message for the client.
impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Validation(e) => e.into(),
            CacheError::NotFound { hash } => ApiError::not_found(hash),
            CacheError::CorruptEntry { hash, reason } => {
                tracing::error!(%hash, %reason, "Corrupt cache entry");
                ApiError::corrupt_entry(hash)
            }
            CacheError::BackendUnavailable(BackendError::Timeout { operation, timeout }) => {
                tracing::warn!(operation, ?timeout, "Backend call timed out");
                ApiError::timeout(operation)
            }
            CacheError::BackendUnavailable(e) => {
                tracing::error!(error = %e, "Backend unavailable");
                ApiError::service_unavailable("Cache backend is unavailable")
            }
        }
    }
}

/// Convert a rejected JSON body into a validation failure.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation_failed(rejection.body_text())
    }
}

/// Convert a rejected query string into a validation failure.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation_failed(rejection.body_text())
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use hoard_core::ContentHash;
    use std::time::Duration;

    fn zero_hash() -> ContentHash {
        ContentHash::parse("0000000000000000000000000000000000000000")
            .expect("all-zero hash is well formed")
    }

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::MissingField.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::EntityNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::CorruptEntry.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::ServiceUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ErrorCode::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_cache_error_mapping() {
        let err = ApiError::from(CacheError::NotFound { hash: zero_hash() });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.details,
            Some(serde_json::json!({ "hash": "0000000000000000000000000000000000000000" }))
        );

        let err = ApiError::from(CacheError::CorruptEntry {
            hash: zero_hash(),
            reason: "EOF while parsing".to_string(),
        });
        assert_eq!(err.code, ErrorCode::CorruptEntry);
        assert!(!err.message.contains("EOF"), "decode details stay server-side");

        let err = ApiError::from(CacheError::BackendUnavailable(BackendError::Closed));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err = ApiError::from(CacheError::BackendUnavailable(BackendError::Timeout {
            operation: "get",
            timeout: Duration::from_secs(1),
        }));
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);

        let err = ApiError::from(CacheError::Validation(ValidationError::RequiredFieldMissing {
            field: "email".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("email"));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::not_found("abc");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("ENTITY_NOT_FOUND"));
        assert!(json.contains("Person not found"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::service_unavailable("Connection failed");
        let display = format!("{}", err);

        assert!(display.contains("ServiceUnavailable"));
        assert!(display.contains("Connection failed"));
    }
}
