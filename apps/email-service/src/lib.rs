//! Email Service
//!
//! Sends transactional emails requested over HTTP or through the `emails`
//! Redis stream, and keeps a log of every delivery attempt.
//!
//! ## Architecture
//!
//! ```text
//! Redis Stream (emails)                 HTTP /api/v1/emails/*
//!   ↓ (Consumer Group: email-service-group)   ↓
//! StreamWorker<EmailProcessor>                 ↓
//!   ↓                                          ↓
//! EmailService ── TemplateEngine (Handlebars) ─┘
//!   ↓ SMTP (lettre)
//! EmailLogRepository (PostgreSQL or in-memory)
//! ```
//!
//! The broker is optional: with `BROKER_URL` empty, or when Redis cannot be
//! reached at startup, the service keeps serving HTTP and `/queue` answers
//! 503.

pub mod api;
pub mod config;

use config::{BrokerConfig, Config};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{self, run_migrations};
use database::redis::{self as broker, ConnectionManager};
use domain_emails::{
    EmailLogRepository, EmailProcessor, EmailProvider, EmailService, EmailStream,
    InMemoryEmailLogRepository, PgEmailLogRepository, SmtpProvider,
};
use eyre::{Result, WrapErr};
use migration::Migrator;
use std::sync::Arc;
use stream_worker::{StreamConsumer, StreamProducer, StreamWorker, WorkerConfig};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Run the email service until SIGINT/SIGTERM.
///
/// 1. Loads configuration and sets up tracing and metrics
/// 2. Picks the email log store (PostgreSQL when `DATABASE_URL` is set)
/// 3. Connects to the broker, if configured, and starts the consumer
/// 4. Serves HTTP, then stops the consumer between messages
pub async fn run() -> Result<()> {
    install_color_eyre();
    let config = Config::from_env().wrap_err("Failed to load configuration")?;
    init_tracing(&config.environment, &config.log_level);
    stream_worker::init_metrics();

    info!(
        service = %config.service_name,
        version = %config.app.version,
        environment = ?config.environment,
        "Starting email service"
    );

    let provider: Arc<dyn EmailProvider> =
        Arc::new(SmtpProvider::new(config.smtp.clone()).wrap_err("Invalid SMTP configuration")?);
    info!(host = %config.smtp.host, port = config.smtp.port, "SMTP provider configured");

    match config.database.clone() {
        Some(db_config) => {
            let db = postgres::connect_with_retry(db_config, None)
                .await
                .wrap_err("Failed to connect to PostgreSQL")?;
            run_migrations::<Migrator>(&db, &config.service_name)
                .await
                .wrap_err("Failed to run migrations")?;
            serve(config, PgEmailLogRepository::new(db), provider).await
        }
        None => {
            warn!("DATABASE_URL not set, email logs are kept in memory");
            serve(config, InMemoryEmailLogRepository::new(), provider).await
        }
    }
}

async fn serve<R: EmailLogRepository + 'static>(
    config: Config,
    repository: R,
    provider: Arc<dyn EmailProvider>,
) -> Result<()> {
    let shutdown = axum_helpers::ShutdownCoordinator::new();
    let mut service = EmailService::new(repository, provider.clone())?;
    info!(provider = service.provider_name(), "Email service ready");

    // Reachability is only reported; sends fail into the log either way
    tokio::spawn(async move {
        match provider.health_check().await {
            Ok(true) => info!("Mail transport reachable"),
            Ok(false) => warn!("Mail transport did not answer"),
            Err(e) => warn!(error = %e, "Mail transport check failed"),
        }
    });

    let redis = connect_broker(&config.broker).await;
    if let Some(redis) = &redis {
        let producer = StreamProducer::new(redis.clone(), config.broker.topic.clone());
        service = service.with_publisher(Arc::new(producer));
    }
    let service = Arc::new(service);

    let worker = redis.map(|redis| {
        spawn_worker(redis, &config.broker, service.clone(), shutdown.subscribe())
    });

    let router = api::router(service, config.app.clone(), &config.service_name)?;
    axum_helpers::create_app(router, &config.server, shutdown.clone()).await?;

    shutdown.shutdown();
    if let Some(handle) = worker {
        if let Err(e) = handle.await {
            error!(error = %e, "Email consumer task panicked");
        }
    }

    info!("Email service stopped");
    Ok(())
}

/// Connect to Redis, or `None` to run HTTP-only.
async fn connect_broker(config: &BrokerConfig) -> Option<ConnectionManager> {
    let Some(url) = config.url.as_deref() else {
        warn!("BROKER_URL is empty, event consumer disabled");
        return None;
    };

    match broker::connect_with_retry(url, None).await {
        Ok(conn) => {
            info!("Connected to broker");
            Some(conn)
        }
        Err(e) => {
            error!(error = %e, "Broker unavailable, serving HTTP without the event consumer");
            None
        }
    }
}

fn spawn_worker<R: EmailLogRepository + 'static>(
    redis: ConnectionManager,
    config: &BrokerConfig,
    service: Arc<EmailService<R>>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    // ConnectionManager multiplexes a single connection; a blocking
    // XREADGROUP would stall the producer sharing it.
    let worker_config = WorkerConfig::from_stream_def::<EmailStream>()
        .with_stream_name(config.topic.clone())
        .with_consumer_group(config.consumer_group.clone())
        .with_blocking(None);
    info!(
        stream = %worker_config.stream_name,
        consumer_group = %worker_config.consumer_group,
        consumer_id = %worker_config.consumer_id,
        "Starting email consumer"
    );

    let consumer = StreamConsumer::new(redis, worker_config.clone());
    let worker = StreamWorker::new(
        consumer,
        Arc::new(EmailProcessor::new(service)),
        worker_config,
    );

    tokio::spawn(async move {
        match worker.run(shutdown).await {
            Ok(()) => info!("Email consumer stopped"),
            Err(e) => error!(error = %e, "Email consumer exited, HTTP keeps serving"),
        }
    })
}
