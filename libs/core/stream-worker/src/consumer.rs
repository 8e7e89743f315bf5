//! Stream consumer for Redis operations
//!
//! Handles reading messages from Redis streams using consumer groups.

use crate::config::WorkerConfig;
use crate::error::StreamError;
use crate::event::StreamMessage;
use crate::registry::MessageKey;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::RedisResult;
use tracing::{debug, info, warn};

type StreamReply = Vec<(String, Vec<(String, Vec<(String, String)>)>)>;

/// A source of stream messages consumed as part of a consumer group.
///
/// Implemented by the Redis consumer and by the in-memory broker used in tests.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Create the consumer group if it does not exist yet.
    async fn ensure_group(&self) -> Result<(), StreamError>;

    /// Messages delivered to this consumer earlier but never acknowledged.
    async fn read_pending(&self, count: usize) -> Result<Vec<StreamMessage>, StreamError>;

    /// Messages never delivered to the group.
    async fn read_new(&self, count: usize) -> Result<Vec<StreamMessage>, StreamError>;

    /// Acknowledge a message so it is not redelivered.
    async fn ack(&self, stream_id: &str) -> Result<(), StreamError>;

    /// Whether `read_new` waits on the broker for messages.
    ///
    /// Non-blocking sources get a poll sleep between empty reads.
    fn is_blocking(&self) -> bool {
        false
    }

    /// Stream this source reads from.
    fn stream_name(&self) -> &str;
}

/// Stream consumer for Redis operations
#[derive(Clone)]
pub struct StreamConsumer {
    redis: ConnectionManager,
    config: WorkerConfig,
}

impl StreamConsumer {
    /// Create a new StreamConsumer
    pub fn new(redis: ConnectionManager, config: WorkerConfig) -> Self {
        Self { redis, config }
    }

    /// Get the consumer group
    pub fn consumer_group(&self) -> &str {
        &self.config.consumer_group
    }

    /// Get the consumer ID
    pub fn consumer_id(&self) -> &str {
        &self.config.consumer_id
    }

    fn parse_stream_response(streams: StreamReply) -> Vec<StreamMessage> {
        streams
            .into_iter()
            .flat_map(|(_stream_name, entries)| entries)
            .map(|(stream_id, fields)| Self::parse_entry(stream_id, fields))
            .collect()
    }

    /// Turn a raw entry into a message.
    ///
    /// Entries without a payload field are still returned so the worker can
    /// acknowledge them; decoding fails later and is logged there.
    fn parse_entry(stream_id: String, fields: Vec<(String, String)>) -> StreamMessage {
        let mut body = None;
        let mut key = None;

        for (field, value) in fields {
            match field.parse::<MessageKey>() {
                Ok(MessageKey::Payload) => body = Some(value),
                Ok(MessageKey::Key) => key = Some(value),
                Err(_) => {}
            }
        }

        if body.is_none() {
            warn!(stream_id = %stream_id, "Missing 'payload' field in message");
        }

        StreamMessage::new(stream_id, body, key)
    }
}

#[async_trait]
impl MessageSource for StreamConsumer {
    async fn ensure_group(&self) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();

        // Try to create the group, ignore error if it already exists
        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("0") // Start from beginning
            .arg("MKSTREAM") // Create stream if it doesn't exist
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => {
                info!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Created consumer group"
                );
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Consumer group already exists"
                );
            }
            Err(e) => return Err(StreamError::Redis(e)),
        }

        Ok(())
    }

    async fn read_pending(&self, count: usize) -> Result<Vec<StreamMessage>, StreamError> {
        let mut conn = self.redis.clone();

        let streams: StreamReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg("COUNT")
            .arg(count)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg("0") // Read pending messages
            .query_async(&mut conn)
            .await?;

        Ok(Self::parse_stream_response(streams))
    }

    async fn read_new(&self, count: usize) -> Result<Vec<StreamMessage>, StreamError> {
        let mut conn = self.redis.clone();

        let mut cmd = redis::cmd("XREADGROUP");
        cmd.arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id);

        if let Some(timeout) = self.config.blocking_timeout_ms {
            cmd.arg("BLOCK").arg(timeout);
        }

        cmd.arg("COUNT")
            .arg(count)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg(">"); // Only new messages

        let result: Option<StreamReply> = cmd.query_async(&mut conn).await?;

        // None means the blocking read timed out
        Ok(result.map(Self::parse_stream_response).unwrap_or_default())
    }

    async fn ack(&self, stream_id: &str) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();

        let _: i64 = redis::cmd("XACK")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(stream_id)
            .query_async(&mut conn)
            .await?;

        debug!(stream_id = %stream_id, "Acknowledged message");
        Ok(())
    }

    fn is_blocking(&self) -> bool {
        self.config.blocking_timeout_ms.is_some()
    }

    fn stream_name(&self) -> &str {
        &self.config.stream_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_reads_known_fields() {
        let message = StreamConsumer::parse_entry(
            "1700000000000-3".to_string(),
            vec![
                ("payload".to_string(), r#"{"to_email":"a@b.c"}"#.to_string()),
                ("key".to_string(), "a@b.c".to_string()),
                ("trace".to_string(), "ignored".to_string()),
            ],
        );

        assert_eq!(message.stream_id, "1700000000000-3");
        assert_eq!(message.key.as_deref(), Some("a@b.c"));
        assert_eq!(message.decode().unwrap()["to_email"], "a@b.c");
    }

    #[test]
    fn test_parse_entry_without_payload() {
        let message = StreamConsumer::parse_entry("1-0".to_string(), vec![]);
        assert!(message.body.is_none());
        assert!(message.decode().is_err());
    }

    #[test]
    fn test_parse_stream_response_flattens_streams() {
        let reply: StreamReply = vec![(
            "emails".to_string(),
            vec![
                ("1-0".to_string(), vec![("payload".to_string(), "{}".to_string())]),
                ("2-0".to_string(), vec![("payload".to_string(), "{}".to_string())]),
            ],
        )];

        let messages = StreamConsumer::parse_stream_response(reply);
        let ids: Vec<_> = messages.iter().map(|m| m.stream_id.as_str()).collect();
        assert_eq!(ids, vec!["1-0", "2-0"]);
    }
}
