//! HTTP surface of the notifications service

use axum::{Json, Router, routing::get};
use axum_helpers::{create_router_with_root, health_router};
use chrono::{DateTime, Utc};
use core_config::AppInfo;
use domain_notifications::{NotificationRepository, NotificationService, handlers};
use serde::Serialize;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;

/// Combined OpenAPI documentation for the notifications service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notifications Service API",
        version = "1.0.0",
        description = "Stores per-user notifications and tracks their read state"
    ),
    servers(
        (url = "http://localhost:8002", description = "Local development server")
    ),
    nest(
        (path = "/api/v1/notifications", api = handlers::ApiDoc)
    )
)]
pub struct ApiDoc;

const ENDPOINTS: [&str; 9] = [
    "GET /api/v1/notifications",
    "POST /api/v1/notifications",
    "GET /api/v1/notifications/unread/count",
    "POST /api/v1/notifications/events",
    "GET /api/v1/notifications/{id}",
    "PUT /api/v1/notifications/{id}/read",
    "PUT /api/v1/notifications/user/{user_id}/read-all",
    "DELETE /api/v1/notifications/{id}",
    "GET /api/v1/notifications/health",
];

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: &'static str,
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub endpoints: Vec<&'static str>,
}

async fn metrics() -> String {
    stream_worker::render_metrics()
}

fn info_router(service_name: String) -> Router {
    Router::new().route(
        "/",
        get(move || {
            let service = service_name.clone();
            async move {
                Json(ServiceInfo {
                    service,
                    version: "1.0.0",
                    status: "running",
                    timestamp: Utc::now(),
                    endpoints: ENDPOINTS.to_vec(),
                })
            }
        }),
    )
}

/// Full application router: `/api/v1/notifications/*`, `/`, `/health` and
/// `/metrics`.
pub fn router<R: NotificationRepository + 'static>(
    service: Arc<NotificationService<R>>,
    app: AppInfo,
    service_name: &str,
) -> io::Result<Router> {
    let apis = Router::new().nest("/v1/notifications", handlers::router(service));

    let root = info_router(service_name.to_string())
        .merge(health_router(app))
        .route("/metrics", get(metrics));
    create_router_with_root::<ApiDoc>(apis, root)
}
