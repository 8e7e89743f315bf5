//! Notifications Service
//!
//! Records per-user notifications created over HTTP or through the
//! `notifications` Redis stream, and tracks their read state.
//!
//! ## Architecture
//!
//! ```text
//! Redis Stream (notifications)          HTTP /api/v1/notifications/*
//!   ↓ (Consumer Group: notifications-service-group)   ↓
//! StreamWorker<NotificationProcessor>                  ↓
//!   ↓                                                  ↓
//! NotificationService ─────────────────────────────────┘
//!   ↓
//! NotificationRepository (PostgreSQL or in-memory)
//! ```
//!
//! The broker is optional: with `BROKER_URL` empty, or when Redis cannot be
//! reached at startup, the service keeps serving HTTP and `/events` answers
//! 503.

pub mod api;
pub mod config;

use config::{BrokerConfig, Config};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{self, run_migrations};
use database::redis::{self as broker, ConnectionManager};
use domain_notifications::{
    InMemoryNotificationRepository, NotificationProcessor, NotificationRepository,
    NotificationService, NotificationStream, PgNotificationRepository,
};
use eyre::{Result, WrapErr};
use migration::Migrator;
use std::sync::Arc;
use stream_worker::{StreamConsumer, StreamProducer, StreamWorker, WorkerConfig};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Run the notifications service until SIGINT/SIGTERM.
///
/// 1. Loads configuration and sets up tracing and metrics
/// 2. Picks the notification store (PostgreSQL when `DATABASE_URL` is set)
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
        "Starting notifications service"
    );

    match config.database.clone() {
        Some(db_config) => {
            let db = postgres::connect_with_retry(db_config, None)
                .await
                .wrap_err("Failed to connect to PostgreSQL")?;
            run_migrations::<Migrator>(&db, &config.service_name)
                .await
                .wrap_err("Failed to run migrations")?;
            serve(config, PgNotificationRepository::new(db)).await
        }
        None => {
            warn!("DATABASE_URL not set, notifications are kept in memory");
            serve(config, InMemoryNotificationRepository::new()).await
        }
    }
}

async fn serve<R: NotificationRepository + 'static>(config: Config, repository: R) -> Result<()> {
    let shutdown = axum_helpers::ShutdownCoordinator::new();
    let mut service = NotificationService::new(repository);

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
            error!(error = %e, "Notification consumer task panicked");
        }
    }

    info!("Notifications service stopped");
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

fn spawn_worker<R: NotificationRepository + 'static>(
    redis: ConnectionManager,
    config: &BrokerConfig,
    service: Arc<NotificationService<R>>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    // ConnectionManager multiplexes a single connection; a blocking
    // XREADGROUP would stall the producer sharing it.
    let worker_config = WorkerConfig::from_stream_def::<NotificationStream>()
        .with_stream_name(config.topic.clone())
        .with_consumer_group(config.consumer_group.clone())
        .with_blocking(None);
    info!(
        stream = %worker_config.stream_name,
        consumer_group = %worker_config.consumer_group,
        consumer_id = %worker_config.consumer_id,
        "Starting notification consumer"
    );

    let consumer = StreamConsumer::new(redis, worker_config.clone());
    let worker = StreamWorker::new(
        consumer,
        Arc::new(NotificationProcessor::new(service)),
        worker_config,
    );

    tokio::spawn(async move {
        match worker.run(shutdown).await {
            Ok(()) => info!("Notification consumer stopped"),
            Err(e) => error!(error = %e, "Notification consumer exited, HTTP keeps serving"),
        }
    })
}
