//! Prometheus metrics for stream workers
//!
//! Provides observability into worker throughput and failures.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::{info, warn};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize Prometheus metrics
///
/// Call this once at startup. Subsequent calls are no-ops. If another
/// recorder is already installed the failure is logged and metrics are
/// simply not rendered.
pub fn init_metrics() {
    if PROMETHEUS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROMETHEUS_HANDLE.set(handle).is_ok() {
                info!("Prometheus metrics initialized");
            }
        }
        Err(e) => warn!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Get the Prometheus handle for rendering metrics
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Render metrics in Prometheus format
pub fn render_metrics() -> String {
    prometheus_handle().map(|h| h.render()).unwrap_or_default()
}

/// Stream worker metrics helper
#[derive(Clone)]
pub struct StreamMetrics {
    /// Stream name for labeling
    stream_name: String,
    /// Processor name for labeling
    processor_name: String,
}

impl StreamMetrics {
    /// Create new StreamMetrics
    pub fn new(stream_name: impl Into<String>, processor_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            processor_name: processor_name.into(),
        }
    }

    /// Record a message being received
    pub fn message_received(&self) {
        counter!(
            "stream_worker_messages_received_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .increment(1);
    }

    /// Record a message being processed successfully
    pub fn message_processed(&self, duration: Duration) {
        counter!(
            "stream_worker_messages_processed_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone(),
            "status" => "success"
        )
        .increment(1);

        histogram!(
            "stream_worker_message_duration_seconds",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .record(duration.as_secs_f64());
    }

    /// Record a message whose handling failed
    pub fn message_failed(&self, category: &str) {
        counter!(
            "stream_worker_messages_processed_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone(),
            "status" => "failed"
        )
        .increment(1);

        counter!(
            "stream_worker_message_errors_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone(),
            "category" => category.to_string()
        )
        .increment(1);
    }

    /// Record a failed broker operation (read, ack, group creation)
    pub fn broker_error(&self) {
        counter!(
            "stream_worker_broker_errors_total",
            "stream" => self.stream_name.clone()
        )
        .increment(1);
    }
}
