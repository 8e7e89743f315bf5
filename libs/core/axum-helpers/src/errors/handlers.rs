use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use super::{ErrorCode, ErrorResponse};

/// Fallback handler for unknown routes.
///
/// Echoes the requested path so clients can spot typos.
pub async fn not_found(uri: Uri) -> Response {
    let body = ErrorResponse::new(
        ErrorCode::NotFound,
        format!("No route for {}", uri.path()),
    )
    .with_details(serde_json::json!({ "path": uri.path() }));

    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
