//! # Axum Helpers
//!
//! Utilities, middleware, and helpers shared by the service HTTP layers.
//!
//! ## Modules
//!
//! - **[`server`]**: Router setup, health endpoint, graceful shutdown
//! - **[`http`]**: HTTP middleware (CORS, security headers)
//! - **[`errors`]**: Structured error responses with error codes
//! - **[`extractors`]**: Custom extractors (UUID path, validated JSON and query)
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_app, create_router, ShutdownCoordinator};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let router = create_router::<ApiDoc>(Router::new())?;
//!     create_app(router, &ServerConfig::default(), ShutdownCoordinator::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

// Re-export server types
pub use server::{
    HealthResponse, ShutdownCoordinator, create_app, create_router, create_router_with_root,
    health_router, shutdown_signal,
};

// Re-export HTTP middleware
pub use http::{cors_layer_from_env, security_headers};

// Re-export error types
pub use errors::{AppError, ErrorCode, ErrorResponse};

// Re-export extractors
pub use extractors::{UuidPath, ValidatedJson, ValidatedQuery};
