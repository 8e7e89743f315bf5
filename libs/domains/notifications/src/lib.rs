//! Notifications Domain
//!
//! Stores per-user notifications with read state. Notifications arrive
//! from the `notifications` stream or through the REST API.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_notifications::{
//!     handlers, InMemoryNotificationRepository, NotificationService,
//! };
//! use std::sync::Arc;
//!
//! let service = Arc::new(NotificationService::new(InMemoryNotificationRepository::new()));
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod processor;
pub mod repository;
pub mod service;
pub mod streams;

// Re-export commonly used types
pub use error::{NotificationError, NotificationResult};
pub use events::{NotificationCommand, NotificationEvent};
pub use models::{CreateNotification, Notification, UserNotificationsQuery};
pub use postgres::PgNotificationRepository;
pub use processor::NotificationProcessor;
pub use repository::{InMemoryNotificationRepository, NotificationRepository};
pub use service::NotificationService;
pub use streams::NotificationStream;
