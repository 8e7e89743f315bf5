use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::http::{cors_layer_from_env, security_headers};
use axum::{Json, Router, middleware, routing::get};
use core_config::server::ServerConfig;
use std::io;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Path the OpenAPI document is served from.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Starts the Axum server and serves until shutdown.
///
/// The server stops accepting connections once `shutdown` fires (OS signal
/// or a programmatic [`ShutdownCoordinator::shutdown`]) and drains in-flight
/// requests before returning.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails.
pub async fn create_app(
    router: Router,
    server_config: &ServerConfig,
    shutdown: ShutdownCoordinator,
) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { shutdown.wait_for_signal().await })
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    info!("Server stopped");
    Ok(())
}

/// Creates a configured Axum router with common middleware and documentation.
///
/// This function sets up:
/// - The OpenAPI document at [`OPENAPI_PATH`]
/// - API routes nested under `/api`
/// - Tracing, security headers, CORS (`CORS_ALLOWED_ORIGIN`) and compression
/// - 404 fallback with the standard error envelope
///
/// Use [`create_router_with_root`] for routes outside `/api` that should
/// get the same middleware.
///
/// # Errors
/// Returns an error if `CORS_ALLOWED_ORIGIN` contains invalid values.
pub fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    create_router_with_root::<T>(apis, Router::new())
}

/// Like [`create_router`], with `root` (health, info, metrics) merged at the
/// top level before the middleware is applied.
///
/// # Errors
/// Returns an error if `CORS_ALLOWED_ORIGIN` contains invalid values.
pub fn create_router_with_root<T>(apis: Router, root: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let cors_layer = cors_layer_from_env()?;
    let openapi = T::openapi();

    let router = Router::new()
        .route(OPENAPI_PATH, get(move || async move { Json(openapi) }))
        .nest("/api", apis)
        .merge(root)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new());

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[derive(OpenApi)]
    #[openapi(info(title = "Probe API"))]
    struct ProbeDoc;

    fn router() -> Router {
        let apis = Router::new().route("/v1/ping", get(|| async { "pong" }));
        create_router::<ProbeDoc>(apis).unwrap()
    }

    #[tokio::test]
    async fn test_api_routes_are_nested() {
        let response = router()
            .oneshot(Request::get("/api/v1/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_root_routes_get_middleware() {
        let root = Router::new().route("/health", get(|| async { "ok" }));
        let response = create_router_with_root::<ProbeDoc>(Router::new(), root)
            .unwrap()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_fallback_reports_path() {
        let response = router()
            .oneshot(Request::get("/api/v2/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["details"]["path"], "/api/v2/nothing");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let response = router()
            .oneshot(Request::get(OPENAPI_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["info"]["title"], "Probe API");
    }
}
