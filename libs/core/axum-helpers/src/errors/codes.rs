//! Type-safe error codes for API responses.
//!
//! Each error code includes:
//! - String representation for client consumption (e.g., "VALIDATION_ERROR")
//! - Integer code for logging and monitoring (e.g., 1001)
//! - Default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Invalid UUID format in path or query parameter
    InvalidUuid,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Query string could not be parsed
    InvalidQuery,

    /// Requested resource was not found
    NotFound,

    /// Malformed request not covered by a more specific code
    BadRequest,

    /// Request payload is semantically incorrect
    UnprocessableEntity,

    // Server errors
    /// An unexpected internal server error occurred
    InternalError,

    /// Service (or one of its dependencies) is temporarily unavailable
    ServiceUnavailable,

    // Storage errors (2000-2999)
    /// Database connection or query error
    DatabaseError,

    // Broker errors (3000-3999)
    /// Event broker rejected or failed a publish
    BrokerError,

    // Serialization errors (5000-5999)
    /// JSON serialization/deserialization error
    SerdeJsonError,
}

impl ErrorCode {
    /// Get the string representation for client consumption.
    ///
    /// ```rust
    /// use axum_helpers::errors::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::BrokerError => "BROKER_ERROR",
            Self::SerdeJsonError => "SERDE_JSON_ERROR",
        }
    }

    /// Get the integer code for logging and monitoring.
    ///
    /// Ranges:
    /// - 1000-1999: Client and generic server errors
    /// - 2000-2999: Storage errors
    /// - 3000-3999: Broker errors
    /// - 5000-5999: Serialization errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::JsonExtraction => 1003,
            Self::InvalidQuery => 1004,
            Self::NotFound => 1005,
            Self::BadRequest => 1006,
            Self::UnprocessableEntity => 1007,
            Self::InternalError => 1008,
            Self::ServiceUnavailable => 1009,
            Self::DatabaseError => 2001,
            Self::BrokerError => 3001,
            Self::SerdeJsonError => 5001,
        }
    }

    /// Get the default human-readable message.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::JsonExtraction => "Failed to extract JSON from request body",
            Self::InvalidQuery => "Invalid query parameters",
            Self::NotFound => "Requested resource was not found",
            Self::BadRequest => "Bad request",
            Self::UnprocessableEntity => "Request payload is semantically incorrect",
            Self::InternalError => "An internal server error occurred",
            Self::ServiceUnavailable => "Service temporarily unavailable",
            Self::DatabaseError => "A database error occurred",
            Self::BrokerError => "Failed to publish event",
            Self::SerdeJsonError => "JSON serialization error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
