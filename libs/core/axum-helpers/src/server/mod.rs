//! Server infrastructure module.
//!
//! - Router setup with OpenAPI document and common middleware
//! - Health endpoint
//! - Graceful shutdown coordination
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_app, create_router, health_router, ShutdownCoordinator};
//! use core_config::{server::ServerConfig, app_info};
//!
//! let router = create_router::<ApiDoc>(api_routes)?;
//! let app = router.merge(health_router(app_info!()));
//!
//! let shutdown = ShutdownCoordinator::new();
//! create_app(app, &ServerConfig::default(), shutdown).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_app, create_router, create_router_with_root};
pub use health::{HealthResponse, health_router};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
