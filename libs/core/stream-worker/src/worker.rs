//! The generic StreamWorker implementation.
//!
//! One worker drives one consumer group member: it makes sure the group
//! exists, recovers messages left pending by a previous run, then reads new
//! messages and hands each one to the processor. Every message is
//! acknowledged once the processor returns, whatever the outcome, so a bad
//! message is logged and never redelivered.

use crate::config::WorkerConfig;
use crate::consumer::MessageSource;
use crate::error::{ErrorCategory, StreamError};
use crate::event::StreamMessage;
use crate::metrics::StreamMetrics;
use crate::registry::StreamProcessor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Result of a single poll of the source.
enum Poll {
    /// Number of messages handled (0 when the source had nothing)
    Handled(usize),
    /// Shutdown was requested mid-poll
    Stopped,
}

/// Generic stream worker that feeds messages to a processor.
///
/// # Example
///
/// ```rust,ignore
/// let config = WorkerConfig::from_stream_def::<EmailStream>();
/// let consumer = StreamConsumer::new(redis, config.clone());
/// let worker = StreamWorker::new(consumer, Arc::new(processor), config);
///
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// tokio::spawn(async move { worker.run(shutdown_rx).await });
/// ```
pub struct StreamWorker<S, P>
where
    S: MessageSource,
    P: StreamProcessor,
{
    source: S,
    processor: Arc<P>,
    config: WorkerConfig,
    metrics: StreamMetrics,
}

impl<S, P> StreamWorker<S, P>
where
    S: MessageSource,
    P: StreamProcessor,
{
    /// Create a new stream worker.
    pub fn new(source: S, processor: Arc<P>, config: WorkerConfig) -> Self {
        let metrics = StreamMetrics::new(source.stream_name(), processor.name());
        Self {
            source,
            processor,
            config,
            metrics,
        }
    }

    /// Run the worker loop until shutdown is signalled.
    ///
    /// Broker failures are retried with exponential backoff. After
    /// `max_consecutive_errors` failures in a row the last error is returned
    /// and the loop ends; the caller decides what that means for the process.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), StreamError> {
        info!(
            consumer_id = %self.config.consumer_id,
            stream = %self.source.stream_name(),
            group = %self.config.consumer_group,
            processor = %self.processor.name(),
            blocking = self.source.is_blocking(),
            batch_size = self.config.batch_size,
            "Starting stream worker"
        );

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut consecutive_errors: u32 = 0;
        let mut group_ready = false;
        let mut recovering = true;

        loop {
            if *shutdown.borrow() {
                info!("Received shutdown signal, stopping worker");
                break;
            }

            match self
                .poll(&mut group_ready, &mut recovering, &mut shutdown)
                .await
            {
                Ok(Poll::Stopped) => {
                    info!("Received shutdown signal, stopping worker");
                    break;
                }
                Ok(Poll::Handled(count)) => {
                    if consecutive_errors > 0 {
                        info!("Broker recovered after {} errors", consecutive_errors);
                        consecutive_errors = 0;
                    }

                    // Blocking sources wait on the broker themselves
                    if count == 0
                        && !self.source.is_blocking()
                        && sleep_or_shutdown(&mut shutdown, poll_interval).await
                    {
                        info!("Received shutdown signal, stopping worker");
                        break;
                    }
                }
                Err(e) => {
                    consecutive_errors += 1;
                    self.metrics.broker_error();
                    // The rest of a failed batch is still pending for us
                    recovering = true;

                    if e.is_nogroup_error() {
                        warn!("Consumer group missing, recreating...");
                        group_ready = false;
                    }

                    if consecutive_errors >= self.config.max_consecutive_errors {
                        error!(
                            error = %e,
                            consecutive_errors = consecutive_errors,
                            "Giving up on broker, stopping worker"
                        );
                        return Err(e);
                    }

                    let backoff_ms = ErrorCategory::Transient.backoff_delay_ms(
                        self.config.retry_base_ms,
                        consecutive_errors - 1,
                        self.config.max_backoff_ms,
                    );
                    warn!(
                        error = %e,
                        consecutive_errors = consecutive_errors,
                        backoff_ms = backoff_ms,
                        "Broker error, backing off"
                    );

                    if sleep_or_shutdown(&mut shutdown, Duration::from_millis(backoff_ms)).await {
                        info!("Received shutdown signal, stopping worker");
                        break;
                    }
                }
            }
        }

        info!("Stream worker stopped");
        Ok(())
    }

    /// Read one batch and handle it.
    ///
    /// While `recovering`, messages left pending for this consumer are
    /// handled first; once none remain the worker switches to new messages.
    async fn poll(
        &self,
        group_ready: &mut bool,
        recovering: &mut bool,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Poll, StreamError> {
        if !*group_ready {
            self.source.ensure_group().await?;
            *group_ready = true;
        }

        let mut messages = Vec::new();
        if *recovering {
            messages = self.source.read_pending(self.config.batch_size).await?;
            if messages.is_empty() {
                *recovering = false;
            } else {
                info!(count = messages.len(), "Recovering pending messages");
            }
        }

        if messages.is_empty() {
            tokio::select! {
                read = self.source.read_new(self.config.batch_size) => messages = read?,
                _ = wait_for_shutdown(shutdown) => return Ok(Poll::Stopped),
            }
        }

        let total = messages.len();
        for message in messages {
            if *shutdown.borrow() {
                // Unacknowledged messages are redelivered on the next start
                return Ok(Poll::Stopped);
            }
            self.handle(&message).await?;
        }

        Ok(Poll::Handled(total))
    }

    /// Hand one message to the processor, then acknowledge it.
    ///
    /// Handler failures are logged and counted; only acknowledgement
    /// failures are returned.
    async fn handle(&self, message: &StreamMessage) -> Result<(), StreamError> {
        self.metrics.message_received();
        let start = Instant::now();

        debug!(
            stream_id = %message.stream_id,
            key = ?message.key,
            age_ms = message.age_ms(),
            "Processing message"
        );

        let result = match message.decode() {
            Ok(payload) => self.processor.process(&payload).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.metrics.message_processed(start.elapsed());
                debug!(stream_id = %message.stream_id, "Message processed");
            }
            Err(e) => {
                let category = e.category();
                self.metrics.message_failed(category.as_str());
                error!(
                    stream_id = %message.stream_id,
                    processor = %self.processor.name(),
                    category = category.as_str(),
                    error = %e,
                    "Failed to process message"
                );
            }
        }

        self.source.ack(&message.stream_id).await
    }
}

/// Resolves once shutdown is requested or the sender is gone.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // Err means the sender was dropped, which also stops the worker
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Sleep for `duration`, returning `true` early if shutdown is requested.
async fn sleep_or_shutdown(shutdown: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    tokio::select! {
        _ = wait_for_shutdown(shutdown) => true,
        _ = tokio::time::sleep(duration) => false,
    }
}
