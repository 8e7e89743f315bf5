//! Stream message wrapper
//!
//! Wraps a raw stream entry with its metadata (ID, timestamp, key).

use crate::error::StreamError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Decoded message payload: string keys mapped to arbitrary JSON values.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// A raw message read from a stream
#[derive(Debug, Clone)]
pub struct StreamMessage {
    /// Stream entry ID (e.g., "1234567890123-0")
    pub stream_id: String,

    /// Raw JSON body, if the entry carried one
    pub body: Option<String>,

    /// Routing key set by the producer
    pub key: Option<String>,

    /// When the entry was appended (parsed from the stream ID)
    pub timestamp: DateTime<Utc>,
}

impl StreamMessage {
    /// Create a new StreamMessage
    pub fn new(stream_id: String, body: Option<String>, key: Option<String>) -> Self {
        let timestamp = Self::parse_timestamp(&stream_id);
        Self {
            stream_id,
            body,
            key,
            timestamp,
        }
    }

    /// Parse timestamp from a stream ID
    ///
    /// Stream IDs are in format "timestamp_ms-sequence"
    fn parse_timestamp(stream_id: &str) -> DateTime<Utc> {
        stream_id
            .split('-')
            .next()
            .and_then(|ts| ts.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now)
    }

    /// Decode the body into a JSON object.
    pub fn decode(&self) -> Result<Payload, StreamError> {
        let body = self.body.as_deref().ok_or_else(|| {
            StreamError::Serialization(format!("message {} has no payload field", self.stream_id))
        })?;

        match serde_json::from_str::<serde_json::Value>(body)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(StreamError::Serialization(format!(
                "payload must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Get age in milliseconds
    pub fn age_ms(&self) -> i64 {
        (Utc::now() - self.timestamp).num_milliseconds()
    }
}

/// Encode a serializable event as a payload. The value must serialize to
/// a JSON object.
pub fn to_payload<T: Serialize>(event: &T) -> Result<Payload, StreamError> {
    match serde_json::to_value(event)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StreamError::Serialization(format!(
            "event must serialize to a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Parse an event timestamp: RFC 3339, or an ISO 8601 datetime without
/// offset, which is read as UTC.
pub fn parse_event_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Serde adapter for [`parse_event_timestamp`].
///
/// ```rust,ignore
/// #[serde(deserialize_with = "stream_worker::deserialize_event_timestamp")]
/// pub timestamp: DateTime<Utc>,
/// ```
pub fn deserialize_event_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_event_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
