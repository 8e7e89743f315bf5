//! Stream error types and error categorization
//!
//! Errors are categorized to decide what the worker does with them:
//! - **Transient**: broker trouble, the worker backs off and tries again
//! - **Permanent**: the message itself is bad, it is logged and dropped

use thiserror::Error;

/// Category of error for determining worker behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Temporary failure - back off and retry the broker operation
    Transient,
    /// Unrecoverable for this message - log and move on
    Permanent,
}

impl ErrorCategory {
    /// Label used in metrics and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transient => "transient",
            ErrorCategory::Permanent => "permanent",
        }
    }

    /// Exponential backoff delay for the given attempt, capped at `max_ms`.
    ///
    /// Permanent errors are never retried and yield zero.
    pub fn backoff_delay_ms(&self, base_ms: u64, attempt: u32, max_ms: u64) -> u64 {
        if *self == ErrorCategory::Permanent {
            return 0;
        }

        base_ms.saturating_mul(2u64.saturating_pow(attempt)).min(max_ms)
    }
}

/// Stream processing errors
#[derive(Error, Debug)]
pub enum StreamError {
    /// Redis connection or command error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Broker unavailable (non-Redis backends)
    #[error("Broker error: {0}")]
    Broker(String),

    /// Message payload could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Event did not match the expected schema
    #[error("Validation error: {0}")]
    Validation(String),

    /// Handler failed while processing a message
    #[error("Processing error: {message}")]
    Processing {
        message: String,
        category: ErrorCategory,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StreamError {
    /// Create a transient processing error
    pub fn transient(message: impl Into<String>) -> Self {
        StreamError::Processing {
            message: message.into(),
            category: ErrorCategory::Transient,
        }
    }

    /// Create a permanent processing error
    pub fn permanent(message: impl Into<String>) -> Self {
        StreamError::Processing {
            message: message.into(),
            category: ErrorCategory::Permanent,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        StreamError::Validation(message.into())
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::Redis(_) => ErrorCategory::Transient,
            StreamError::Broker(_) => ErrorCategory::Transient,
            StreamError::Serialization(_) => ErrorCategory::Permanent,
            StreamError::Validation(_) => ErrorCategory::Permanent,
            StreamError::Processing { category, .. } => *category,
            StreamError::Config(_) => ErrorCategory::Permanent,
        }
    }

    /// True when the consumer group (or its stream) is missing on the broker
    pub fn is_nogroup_error(&self) -> bool {
        matches!(self, StreamError::Redis(e) if e.to_string().contains("NOGROUP"))
    }

    /// True when the error comes from the broker rather than from a message
    pub fn is_broker_error(&self) -> bool {
        matches!(self, StreamError::Redis(_) | StreamError::Broker(_))
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            StreamError::Broker("down".into()).category(),
            ErrorCategory::Transient
        );
        assert_eq!(
            StreamError::validation("missing field").category(),
            ErrorCategory::Permanent
        );
        assert_eq!(
            StreamError::Serialization("bad json".into()).category(),
            ErrorCategory::Permanent
        );
        assert_eq!(
            StreamError::transient("smtp busy").category(),
            ErrorCategory::Transient
        );
    }

    #[test]
    fn test_backoff_calculation() {
        // 100ms, 200ms, 400ms ... capped
        assert_eq!(ErrorCategory::Transient.backoff_delay_ms(100, 0, 30_000), 100);
        assert_eq!(ErrorCategory::Transient.backoff_delay_ms(100, 1, 30_000), 200);
        assert_eq!(ErrorCategory::Transient.backoff_delay_ms(100, 2, 30_000), 400);
        assert_eq!(ErrorCategory::Transient.backoff_delay_ms(100, 20, 30_000), 30_000);
        assert_eq!(ErrorCategory::Transient.backoff_delay_ms(100, 200, 30_000), 30_000);

        assert_eq!(ErrorCategory::Permanent.backoff_delay_ms(100, 3, 30_000), 0);
    }

    #[test]
    fn test_broker_errors() {
        assert!(StreamError::Broker("closed".into()).is_broker_error());
        assert!(!StreamError::validation("x").is_broker_error());
        assert!(!StreamError::Broker("NOGROUP".into()).is_nogroup_error());
    }
}
