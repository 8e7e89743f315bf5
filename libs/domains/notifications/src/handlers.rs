use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
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

use crate::error::NotificationResult;
use crate::models::{
    CreateNotification, DeletedNotification, MarkedAllRead, Notification, NotificationHealth,
    QueuedNotification, UnreadCount, UserNotificationsQuery, UserQuery,
};
use crate::repository::NotificationRepository;
use crate::service::NotificationService;

pub const TAG: &str = "Notifications";

/// OpenAPI documentation for Notifications API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_notifications,
        create_notification,
        get_notification,
        unread_count,
        mark_read,
        mark_all_read,
        delete_notification,
        publish_event,
        health,
    ),
    components(
        schemas(
            Notification,
            CreateNotification,
            UnreadCount,
            MarkedAllRead,
            DeletedNotification,
            QueuedNotification,
            NotificationHealth
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
        (name = TAG, description = "Per-user notifications and read state")
    )
)]
pub struct ApiDoc;

/// Create the notification router with all HTTP endpoints
pub fn router<R: NotificationRepository + 'static>(
    service: Arc<NotificationService<R>>,
) -> Router {
    Router::new()
        .route("/", get(list_notifications).post(create_notification))
        .route("/unread/count", get(unread_count))
        .route("/events", post(publish_event))
        .route("/health", get(health))
        .route("/user/{user_id}/read-all", put(mark_all_read))
        .route("/{id}", get(get_notification).delete(delete_notification))
        .route("/{id}/read", put(mark_read))
        .with_state(service)
}

/// List a user's notifications in creation order
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(UserNotificationsQuery),
    responses(
        (status = 200, description = "Page of notifications", body = Vec<Notification>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_notifications<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    ValidatedQuery(query): ValidatedQuery<UserNotificationsQuery>,
) -> NotificationResult<Json<Vec<Notification>>> {
    let notifications = service.list_for_user(query).await?;
    Ok(Json(notifications))
}

/// Create a notification
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateNotification,
    responses(
        (status = 200, description = "Notification created", body = Notification),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_notification<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateNotification>,
) -> NotificationResult<Json<Notification>> {
    let notification = service.create(input).await?;
    Ok(Json(notification))
}

/// Get a notification by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification found", body = Notification),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_notification<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    UuidPath(id): UuidPath,
) -> NotificationResult<Json<Notification>> {
    let notification = service.get(id).await?;
    Ok(Json(notification))
}

/// Count a user's unread notifications
#[utoipa::path(
    get,
    path = "/unread/count",
    tag = TAG,
    params(UserQuery),
    responses(
        (status = 200, description = "Unread count", body = UnreadCount),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn unread_count<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    ValidatedQuery(UserQuery { user_id }): ValidatedQuery<UserQuery>,
) -> NotificationResult<Json<UnreadCount>> {
    let unread_count = service.unread_count(&user_id).await?;
    Ok(Json(UnreadCount {
        user_id,
        unread_count,
    }))
}

/// Mark a notification as read
#[utoipa::path(
    put,
    path = "/{id}/read",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn mark_read<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    UuidPath(id): UuidPath,
) -> NotificationResult<Json<Notification>> {
    let notification = service.mark_read(id).await?;
    Ok(Json(notification))
}

/// Mark all of a user's notifications as read
#[utoipa::path(
    put,
    path = "/user/{user_id}/read-all",
    tag = TAG,
    params(
        ("user_id" = String, Path, description = "Recipient user")
    ),
    responses(
        (status = 200, description = "Number of notifications marked", body = MarkedAllRead),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn mark_all_read<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    Path(user_id): Path<String>,
) -> NotificationResult<Json<MarkedAllRead>> {
    let marked_as_read = service.mark_all_read(&user_id).await?;
    Ok(Json(MarkedAllRead {
        user_id,
        marked_as_read,
    }))
}

/// Delete a notification
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification deleted", body = DeletedNotification),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_notification<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    UuidPath(id): UuidPath,
) -> NotificationResult<Json<DeletedNotification>> {
    service.delete(id).await?;
    Ok(Json(DeletedNotification {
        message: "Notification deleted".to_string(),
    }))
}

/// Publish a notification event on the `notifications` topic
#[utoipa::path(
    post,
    path = "/events",
    tag = TAG,
    request_body = CreateNotification,
    responses(
        (status = 202, description = "Event published", body = QueuedNotification),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn publish_event<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateNotification>,
) -> NotificationResult<impl IntoResponse> {
    let stream_id = service.publish(input).await?;
    Ok((StatusCode::ACCEPTED, Json(QueuedNotification { stream_id })))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = TAG,
    responses(
        (status = 200, description = "Notifications API is up", body = NotificationHealth)
    )
)]
async fn health() -> Json<NotificationHealth> {
    Json(NotificationHealth {
        status: "healthy".to_string(),
        service: "notifications-service".to_string(),
    })
}
