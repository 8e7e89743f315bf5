//! HTTP surface of the email service

use axum::{Json, Router, routing::get};
use axum_helpers::{create_router_with_root, health_router};
use chrono::{DateTime, Utc};
use core_config::AppInfo;
use domain_emails::{EmailLogRepository, EmailService, handlers};
use serde::Serialize;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;

/// Combined OpenAPI documentation for the email service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Email Service API",
        version = "1.0.0",
        description = "Sends transactional emails and keeps a log of every delivery attempt"
    ),
    servers(
        (url = "http://localhost:8003", description = "Local development server")
    ),
    nest(
        (path = "/api/v1/emails", api = handlers::ApiDoc)
    )
)]
pub struct ApiDoc;

const ENDPOINTS: [&str; 6] = [
    "POST /api/v1/emails/send",
    "POST /api/v1/emails/queue",
    "GET /api/v1/emails/logs",
    "GET /api/v1/emails/logs/{id}",
    "GET /api/v1/emails/stats",
    "GET /api/v1/emails/health",
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

/// Full application router: `/api/v1/emails/*`, `/`, `/health` and `/metrics`.
pub fn router<R: EmailLogRepository + 'static>(
    service: Arc<EmailService<R>>,
    app: AppInfo,
    service_name: &str,
) -> io::Result<Router> {
    let apis = Router::new().nest("/v1/emails", handlers::router(service));

    let root = info_router(service_name.to_string())
        .merge(health_router(app))
        .route("/metrics", get(metrics));
    create_router_with_root::<ApiDoc>(apis, root)
}
