use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, ServiceUnavailableResponse,
    },
    UuidPath, ValidatedJson, ValidatedQuery,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::EmailResult;
use crate::models::{
    EmailHealth, EmailLog, EmailStats, EmailStatus, Pagination, QueuedEmail, SendEmailRequest,
};
use crate::repository::EmailLogRepository;
use crate::service::EmailService;

pub const TAG: &str = "Emails";

/// OpenAPI documentation for Emails API
#[derive(OpenApi)]
#[openapi(
    paths(send_email, list_logs, get_log, get_stats, health, queue_email),
    components(
        schemas(
            EmailLog,
            EmailStatus,
            EmailStats,
            SendEmailRequest,
            QueuedEmail,
            EmailHealth
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = TAG, description = "Email delivery and delivery logs")
    )
)]
pub struct ApiDoc;

/// Create the email router with all HTTP endpoints
pub fn router<R: EmailLogRepository + 'static>(service: Arc<EmailService<R>>) -> Router {
    Router::new()
        .route("/send", post(send_email))
        .route("/queue", post(queue_email))
        .route("/logs", get(list_logs))
        .route("/logs/{id}", get(get_log))
        .route("/stats", get(get_stats))
        .route("/health", get(health))
        .with_state(service)
}

/// Send an email now and return its delivery log
///
/// A transport failure is not an HTTP error: the log comes back with
/// `status = failed` and the cause in `error_message`.
#[utoipa::path(
    post,
    path = "/send",
    tag = TAG,
    request_body = SendEmailRequest,
    responses(
        (status = 200, description = "Delivery attempted", body = EmailLog),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn send_email<R: EmailLogRepository>(
    State(service): State<Arc<EmailService<R>>>,
    ValidatedJson(input): ValidatedJson<SendEmailRequest>,
) -> EmailResult<Json<EmailLog>> {
    let log = service.send(input).await?;
    Ok(Json(log))
}

/// Queue an email on the `emails` topic
#[utoipa::path(
    post,
    path = "/queue",
    tag = TAG,
    request_body = SendEmailRequest,
    responses(
        (status = 202, description = "Email queued", body = QueuedEmail),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn queue_email<R: EmailLogRepository>(
    State(service): State<Arc<EmailService<R>>>,
    ValidatedJson(input): ValidatedJson<SendEmailRequest>,
) -> EmailResult<impl IntoResponse> {
    let stream_id = service.queue(input).await?;
    Ok((StatusCode::ACCEPTED, Json(QueuedEmail { stream_id })))
}

/// List delivery logs in creation order
#[utoipa::path(
    get,
    path = "/logs",
    tag = TAG,
    params(Pagination),
    responses(
        (status = 200, description = "Page of email logs", body = Vec<EmailLog>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_logs<R: EmailLogRepository>(
    State(service): State<Arc<EmailService<R>>>,
    ValidatedQuery(page): ValidatedQuery<Pagination>,
) -> EmailResult<Json<Vec<EmailLog>>> {
    let logs = service.list_logs(page).await?;
    Ok(Json(logs))
}

/// Get a delivery log by ID
#[utoipa::path(
    get,
    path = "/logs/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Email log ID")
    ),
    responses(
        (status = 200, description = "Email log found", body = EmailLog),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_log<R: EmailLogRepository>(
    State(service): State<Arc<EmailService<R>>>,
    UuidPath(id): UuidPath,
) -> EmailResult<Json<EmailLog>> {
    let log = service.get_log(id).await?;
    Ok(Json(log))
}

/// Delivery counts by status
#[utoipa::path(
    get,
    path = "/stats",
    tag = TAG,
    responses(
        (status = 200, description = "Email statistics", body = EmailStats),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_stats<R: EmailLogRepository>(
    State(service): State<Arc<EmailService<R>>>,
) -> EmailResult<Json<EmailStats>> {
    let stats = service.stats().await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = TAG,
    responses(
        (status = 200, description = "Email API is up", body = EmailHealth)
    )
)]
async fn health() -> Json<EmailHealth> {
    Json(EmailHealth {
        status: "healthy".to_string(),
        service: "email-service".to_string(),
    })
}
