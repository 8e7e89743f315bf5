//! Worker configuration
//!
//! This module provides `WorkerConfig` for configuring the stream worker.

use crate::registry::StreamDef;
use uuid::Uuid;

/// Configuration for the stream worker
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Redis stream name (the topic)
    pub stream_name: String,

    /// Consumer group name
    pub consumer_group: String,

    /// Unique consumer ID within the group
    pub consumer_id: String,

    /// Maximum stream length before trimming
    pub max_length: i64,

    /// Poll interval in milliseconds when no messages are available
    pub poll_interval_ms: u64,

    /// Batch size for reading messages
    pub batch_size: usize,

    /// Blocking read timeout in milliseconds (None = non-blocking)
    pub blocking_timeout_ms: Option<u64>,

    /// Consecutive broker failures tolerated before the worker gives up
    pub max_consecutive_errors: u32,

    /// Initial backoff after a broker failure
    pub retry_base_ms: u64,

    /// Upper bound for the broker failure backoff
    pub max_backoff_ms: u64,
}

impl WorkerConfig {
    /// Create a new WorkerConfig from a StreamDef
    pub fn from_stream_def<S: StreamDef>() -> Self {
        Self::new(S::STREAM_NAME, S::CONSUMER_GROUP).with_max_length(S::MAX_LENGTH)
    }

    /// Create a new WorkerConfig with explicit values
    pub fn new(stream_name: impl Into<String>, consumer_group: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            consumer_group: consumer_group.into(),
            consumer_id: format!("worker-{}", Uuid::new_v4()),
            max_length: 100_000,
            poll_interval_ms: 1000,
            batch_size: 10,
            blocking_timeout_ms: Some(5000),
            max_consecutive_errors: 10,
            retry_base_ms: 500,
            max_backoff_ms: 30_000,
        }
    }

    /// Set the stream name (topic override from configuration)
    pub fn with_stream_name(mut self, stream: impl Into<String>) -> Self {
        self.stream_name = stream.into();
        self
    }

    /// Set the consumer group
    pub fn with_consumer_group(mut self, group: impl Into<String>) -> Self {
        self.consumer_group = group.into();
        self
    }

    /// Set the consumer ID
    pub fn with_consumer_id(mut self, id: impl Into<String>) -> Self {
        self.consumer_id = id.into();
        self
    }

    /// Set the maximum stream length
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval_ms(mut self, interval: u64) -> Self {
        self.poll_interval_ms = interval;
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the blocking timeout (None for non-blocking)
    pub fn with_blocking(mut self, timeout_ms: Option<u64>) -> Self {
        self.blocking_timeout_ms = timeout_ms;
        self
    }

    /// Set how many consecutive broker failures end the worker
    pub fn with_max_consecutive_errors(mut self, count: u32) -> Self {
        self.max_consecutive_errors = count.max(1);
        self
    }

    /// Set the broker failure backoff window
    pub fn with_backoff_ms(mut self, base_ms: u64, max_ms: u64) -> Self {
        self.retry_base_ms = base_ms;
        self.max_backoff_ms = max_ms.max(base_ms);
        self
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::new("stream:jobs", "workers")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestStream;

    impl StreamDef for TestStream {
        const STREAM_NAME: &'static str = "test-stream";
        const CONSUMER_GROUP: &'static str = "test-group";
        const MAX_LENGTH: i64 = 500;
    }

    #[test]
    fn test_from_stream_def() {
        let config = WorkerConfig::from_stream_def::<TestStream>();

        assert_eq!(config.stream_name, "test-stream");
        assert_eq!(config.consumer_group, "test-group");
        assert_eq!(config.max_length, 500);
        assert!(config.consumer_id.starts_with("worker-"));
    }

    #[test]
    fn test_builder_pattern() {
        let config = WorkerConfig::from_stream_def::<TestStream>()
            .with_stream_name("emails-staging")
            .with_consumer_id("worker-1")
            .with_batch_size(0)
            .with_blocking(None)
            .with_max_consecutive_errors(3)
            .with_backoff_ms(10, 5);

        assert_eq!(config.stream_name, "emails-staging");
        assert_eq!(config.consumer_id, "worker-1");
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.blocking_timeout_ms, None);
        assert_eq!(config.max_consecutive_errors, 3);
        assert_eq!(config.retry_base_ms, 10);
        assert_eq!(config.max_backoff_ms, 10);
    }
}
