use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use stream_worker::StreamError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email log not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Template rendering error: {0}")]
    Template(String),

    #[error("Email provider error: {0}")]
    Provider(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Event broker is not configured")]
    BrokerUnavailable,

    #[error("Event broker error: {0}")]
    Broker(String),
}

pub type EmailResult<T> = Result<T, EmailError>;

impl From<sea_orm::DbErr> for EmailError {
    fn from(err: sea_orm::DbErr) -> Self {
        EmailError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for EmailError {
    fn from(err: validator::ValidationErrors) -> Self {
        EmailError::Validation(err.to_string())
    }
}

impl From<StreamError> for EmailError {
    fn from(err: StreamError) -> Self {
        EmailError::Broker(err.to_string())
    }
}

/// Convert EmailError to AppError for standardized error responses
impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::NotFound(id) => AppError::NotFound(format!("Email log {} not found", id)),
            EmailError::Validation(msg) => AppError::BadRequest(msg),
            EmailError::Database(msg) => AppError::Database(msg),
            EmailError::BrokerUnavailable => {
                AppError::ServiceUnavailable("Event broker is not configured".to_string())
            }
            EmailError::Broker(msg) => AppError::Broker(msg),
            EmailError::Template(msg) | EmailError::Provider(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for EmailError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Invalid events are dropped; storage failures may succeed on redelivery.
impl From<EmailError> for StreamError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Validation(msg) => StreamError::validation(msg),
            EmailError::Database(msg) | EmailError::Broker(msg) => StreamError::transient(msg),
            other => StreamError::permanent(other.to_string()),
        }
    }
}
