//! Stream registry types and definitions.
//!
//! This module provides:
//! - `StreamDef` trait for domain-specific stream definitions
//! - `StreamProcessor` trait for message handlers
//! - `MessageKey` enum for the field names used in stream entries

use crate::error::StreamError;
use crate::event::Payload;
use async_trait::async_trait;
use strum::{AsRefStr, Display, EnumString};

/// Standard message keys used in stream entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKey {
    /// The event payload (JSON object).
    Payload,
    /// Partition-style routing key (recipient email, user id).
    Key,
}

/// Stream definition trait.
///
/// Each domain implements this trait to define its default topic and
/// consumer group. Deployments may still override both through configuration.
///
/// # Example
///
/// ```rust,ignore
/// use stream_worker::StreamDef;
///
/// pub struct EmailStream;
///
/// impl StreamDef for EmailStream {
///     const STREAM_NAME: &'static str = "emails";
///     const CONSUMER_GROUP: &'static str = "email-service-group";
/// }
/// ```
pub trait StreamDef: Send + Sync {
    /// The Redis stream name (e.g., "emails", "notifications").
    const STREAM_NAME: &'static str;

    /// The consumer group name for this stream.
    const CONSUMER_GROUP: &'static str;

    /// Maximum stream length before auto-trim (MAXLEN).
    const MAX_LENGTH: i64 = 100_000;

    /// Get the stream name.
    fn stream_name() -> &'static str {
        Self::STREAM_NAME
    }

    /// Get the consumer group name.
    fn consumer_group() -> &'static str {
        Self::CONSUMER_GROUP
    }
}

/// Handler invoked by the worker for every message.
///
/// Receives the decoded payload as an untyped JSON object; implementations
/// validate it into their own command types.
///
/// # Example
///
/// ```rust,ignore
/// #[async_trait]
/// impl StreamProcessor for NotificationProcessor {
///     async fn process(&self, payload: &Payload) -> Result<(), StreamError> {
///         let command = NotificationCommand::try_from(payload)?;
///         self.service.apply(command).await?;
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "NotificationProcessor"
///     }
/// }
/// ```
#[async_trait]
pub trait StreamProcessor: Send + Sync {
    /// Process a single message payload.
    async fn process(&self, payload: &Payload) -> Result<(), StreamError>;

    /// Get the processor name for logging.
    fn name(&self) -> &'static str;
}
