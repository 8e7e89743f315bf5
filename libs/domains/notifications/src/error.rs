use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use stream_worker::StreamError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Event broker is not configured")]
    BrokerUnavailable,

    #[error("Event broker error: {0}")]
    Broker(String),
}

pub type NotificationResult<T> = Result<T, NotificationError>;

impl From<sea_orm::DbErr> for NotificationError {
    fn from(err: sea_orm::DbErr) -> Self {
        NotificationError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for NotificationError {
    fn from(err: validator::ValidationErrors) -> Self {
        NotificationError::Validation(err.to_string())
    }
}

impl From<StreamError> for NotificationError {
    fn from(err: StreamError) -> Self {
        NotificationError::Broker(err.to_string())
    }
}

/// Convert NotificationError to AppError for standardized error responses
impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound(id) => {
                AppError::NotFound(format!("Notification {} not found", id))
            }
            NotificationError::Validation(msg) => AppError::BadRequest(msg),
            NotificationError::Database(msg) => AppError::Database(msg),
            NotificationError::BrokerUnavailable => {
                AppError::ServiceUnavailable("Event broker is not configured".to_string())
            }
            NotificationError::Broker(msg) => AppError::Broker(msg),
        }
    }
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<NotificationError> for StreamError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Validation(msg) => StreamError::validation(msg),
            NotificationError::Database(msg) | NotificationError::Broker(msg) => {
                StreamError::transient(msg)
            }
            other => StreamError::permanent(other.to_string()),
        }
    }
}
