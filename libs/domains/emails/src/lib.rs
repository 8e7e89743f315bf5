//! Emails Domain
//!
//! Sends transactional emails and keeps an append-only log of every
//! delivery attempt.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐
//! │  Handlers   │   │  Processor  │  ← HTTP endpoints / `emails` stream
//! └──────┬──────┘   └──────┬──────┘
//!        └────────┬────────┘
//!          ┌──────▼──────┐
//!          │   Service   │  ← Validation, templates, delivery
//!          └──┬───────┬──┘
//!     ┌───────▼──┐ ┌──▼───────┐
//!     │ Provider │ │Repository│  ← SMTP / log storage
//!     └──────────┘ └──────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_emails::{
//!     handlers, EmailService, InMemoryEmailLogRepository, RecordingEmailProvider,
//! };
//! use std::sync::Arc;
//!
//! let service = EmailService::new(
//!     InMemoryEmailLogRepository::new(),
//!     Arc::new(RecordingEmailProvider::new()),
//! )
//! .expect("templates compile");
//!
//! let router = handlers::router(Arc::new(service));
//! ```

pub mod entity;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod processor;
pub mod providers;
pub mod repository;
pub mod service;
pub mod streams;
pub mod templates;

// Re-export commonly used types
pub use error::{EmailError, EmailResult};
pub use events::{EmailCommand, EmailEvent};
pub use models::{EmailLog, EmailStats, EmailStatus, Pagination, SendEmailRequest};
pub use postgres::PgEmailLogRepository;
pub use processor::EmailProcessor;
pub use providers::{
    EmailContent, EmailProvider, RecordingEmailProvider, SentEmail, SmtpConfig, SmtpProvider,
};
pub use repository::{EmailLogRepository, InMemoryEmailLogRepository};
pub use service::EmailService;
pub use streams::EmailStream;
pub use templates::{EmailTemplate, TemplateEngine};
