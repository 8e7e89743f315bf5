//! UUID path parameter extractor with automatic validation.

use crate::errors::{ErrorCode, ErrorResponse};
use axum::{
    Json,
    extract::{FromRequestParts, Path},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Extractor for a single UUID path parameter.
///
/// Rejects non-UUID segments with 400 `INVALID_UUID` instead of axum's
/// plain-text rejection.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::extractors::UuidPath;
///
/// async fn get_log(UuidPath(id): UuidPath) -> String {
///     format!("Email log: {}", id)
/// }
///
/// let app = Router::new().route("/logs/{id}", get(get_log));
/// ```
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        Uuid::parse_str(&id).map(UuidPath).map_err(|_| {
            tracing::info!(
                error_code = ErrorCode::InvalidUuid.code(),
                id = %id,
                "Invalid UUID in path"
            );
            let body = ErrorResponse::new(ErrorCode::InvalidUuid, format!("Invalid UUID: {}", id));
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        })
    }
}
