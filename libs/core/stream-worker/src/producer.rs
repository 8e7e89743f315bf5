//! Stream producer for event publishing
//!
//! Generic producer that any service can use to publish events for
//! background processing.
//!
//! # Example
//!
//! ```rust,ignore
//! use stream_worker::{EventPublisher, StreamProducer};
//!
//! let producer = StreamProducer::from_stream_def::<EmailStream>(redis);
//!
//! let payload = serde_json::json!({ "to_email": "ana@example.com" });
//! let stream_id = producer
//!     .publish(Some("ana@example.com"), payload.as_object().unwrap())
//!     .await?;
//! ```

use crate::error::StreamError;
use crate::event::Payload;
use crate::registry::{MessageKey, StreamDef};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;

/// Publishes events onto a topic.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Append an event, returning its stream ID.
    async fn publish(&self, key: Option<&str>, payload: &Payload) -> Result<String, StreamError>;

    /// Topic the events go to.
    fn stream_name(&self) -> &str;
}

/// Redis Streams producer.
#[derive(Clone)]
pub struct StreamProducer {
    redis: ConnectionManager,
    stream_name: String,
    max_length: i64,
}

impl StreamProducer {
    /// Create a new StreamProducer for a specific stream.
    pub fn new(redis: ConnectionManager, stream_name: impl Into<String>) -> Self {
        Self {
            redis,
            stream_name: stream_name.into(),
            max_length: 100_000,
        }
    }

    /// Create a producer from a `StreamDef` implementation.
    pub fn from_stream_def<S: StreamDef>(redis: ConnectionManager) -> Self {
        Self::new(redis, S::STREAM_NAME).with_max_length(S::MAX_LENGTH)
    }

    /// Set the maximum stream length (MAXLEN ~).
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = max_length;
        self
    }
}

#[async_trait]
impl EventPublisher for StreamProducer {
    async fn publish(&self, key: Option<&str>, payload: &Payload) -> Result<String, StreamError> {
        let mut conn = self.redis.clone();

        let body = serde_json::to_string(payload)?;

        // Use XADD with MAXLEN ~ for approximate trimming (more efficient)
        let mut cmd = redis::cmd("XADD");
        cmd.arg(&self.stream_name)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.max_length)
            .arg("*")
            .arg(MessageKey::Payload.as_ref())
            .arg(&body);

        if let Some(key) = key {
            cmd.arg(MessageKey::Key.as_ref()).arg(key);
        }

        let stream_id: String = cmd.query_async(&mut conn).await?;

        debug!(
            stream = %self.stream_name,
            stream_id = %stream_id,
            "Published event"
        );

        Ok(stream_id)
    }

    fn stream_name(&self) -> &str {
        &self.stream_name
    }
}
