//! In-process broker with consumer group semantics.
//!
//! Mirrors the subset of Redis Streams the worker relies on: append-only
//! topics, per-group delivery cursors and per-consumer pending lists.
//! Used by tests and local tooling that should not need a Redis server.

use crate::config::WorkerConfig;
use crate::consumer::MessageSource;
use crate::error::StreamError;
use crate::event::{Payload, StreamMessage};
use crate::producer::EventPublisher;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    body: Option<String>,
    key: Option<String>,
}

impl Entry {
    fn to_message(&self) -> StreamMessage {
        StreamMessage::new(self.id.clone(), self.body.clone(), self.key.clone())
    }
}

#[derive(Debug, Default)]
struct Group {
    next_index: usize,
    /// index into the stream -> (consumer id, stream id)
    pending: BTreeMap<usize, (String, String)>,
}

#[derive(Debug, Default)]
struct State {
    streams: HashMap<String, Vec<Entry>>,
    groups: HashMap<(String, String), Group>,
    last_ms: i64,
    seq: u64,
    failures_left: u32,
    ack_failures_left: u32,
}

impl State {
    fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis().max(self.last_ms);
        if now == self.last_ms {
            self.seq += 1;
        } else {
            self.last_ms = now;
            self.seq = 0;
        }
        format!("{}-{}", self.last_ms, self.seq)
    }

    fn check_available(&mut self) -> Result<(), StreamError> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(StreamError::Broker("broker unavailable".to_string()));
        }
        Ok(())
    }
}

/// Shared in-memory broker. Cloning yields another handle to the same topics.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    state: Arc<Mutex<State>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publisher handle for a topic.
    pub fn producer(&self, stream_name: impl Into<String>) -> MemoryProducer {
        MemoryProducer {
            broker: self.clone(),
            stream_name: stream_name.into(),
        }
    }

    /// Consumer handle using the stream, group and consumer id from `config`.
    pub fn consumer(&self, config: &WorkerConfig) -> MemoryConsumer {
        MemoryConsumer {
            broker: self.clone(),
            stream_name: config.stream_name.clone(),
            group: config.consumer_group.clone(),
            consumer_id: config.consumer_id.clone(),
        }
    }

    /// Append a raw entry; `body` is stored as-is without validation.
    pub async fn publish_raw(
        &self,
        stream_name: &str,
        body: Option<String>,
        key: Option<String>,
    ) -> Result<String, StreamError> {
        let mut state = self.state.lock().await;
        state.check_available()?;

        let id = state.next_id();
        state
            .streams
            .entry(stream_name.to_string())
            .or_default()
            .push(Entry {
                id: id.clone(),
                body,
                key,
            });
        Ok(id)
    }

    /// Number of entries ever appended to a topic.
    pub async fn len(&self, stream_name: &str) -> usize {
        let state = self.state.lock().await;
        state.streams.get(stream_name).map_or(0, Vec::len)
    }

    /// Whether a topic has no entries.
    pub async fn is_empty(&self, stream_name: &str) -> bool {
        self.len(stream_name).await == 0
    }

    /// Number of delivered but unacknowledged entries for a group.
    pub async fn pending(&self, stream_name: &str, group: &str) -> usize {
        let state = self.state.lock().await;
        state
            .groups
            .get(&(stream_name.to_string(), group.to_string()))
            .map_or(0, |g| g.pending.len())
    }

    /// Make the next `count` broker operations fail with a broker error.
    pub async fn fail_next(&self, count: u32) {
        self.state.lock().await.failures_left = count;
    }

    /// Make the next `count` acknowledgements fail; reads keep working.
    pub async fn fail_next_acks(&self, count: u32) {
        self.state.lock().await.ack_failures_left = count;
    }
}

/// Publisher bound to one topic of a [`MemoryBroker`].
#[derive(Clone)]
pub struct MemoryProducer {
    broker: MemoryBroker,
    stream_name: String,
}

#[async_trait]
impl EventPublisher for MemoryProducer {
    async fn publish(&self, key: Option<&str>, payload: &Payload) -> Result<String, StreamError> {
        let body = serde_json::to_string(payload)?;
        self.broker
            .publish_raw(&self.stream_name, Some(body), key.map(str::to_string))
            .await
    }

    fn stream_name(&self) -> &str {
        &self.stream_name
    }
}

/// Group consumer bound to one topic of a [`MemoryBroker`].
#[derive(Clone)]
pub struct MemoryConsumer {
    broker: MemoryBroker,
    stream_name: String,
    group: String,
    consumer_id: String,
}

impl MemoryConsumer {
    fn group_key(&self) -> (String, String) {
        (self.stream_name.clone(), self.group.clone())
    }

    fn missing_group(&self) -> StreamError {
        StreamError::Broker(format!(
            "consumer group '{}' does not exist on '{}'",
            self.group, self.stream_name
        ))
    }
}

#[async_trait]
impl MessageSource for MemoryConsumer {
    async fn ensure_group(&self) -> Result<(), StreamError> {
        let mut state = self.broker.state.lock().await;
        state.check_available()?;

        state.streams.entry(self.stream_name.clone()).or_default();
        state.groups.entry(self.group_key()).or_default();
        Ok(())
    }

    async fn read_pending(&self, count: usize) -> Result<Vec<StreamMessage>, StreamError> {
        let mut state = self.broker.state.lock().await;
        state.check_available()?;

        let group = state
            .groups
            .get(&self.group_key())
            .ok_or_else(|| self.missing_group())?;
        let indexes: Vec<usize> = group
            .pending
            .iter()
            .filter(|(_, (consumer, _))| *consumer == self.consumer_id)
            .map(|(index, _)| *index)
            .take(count)
            .collect();

        let entries = state.streams.get(&self.stream_name);
        Ok(indexes
            .into_iter()
            .filter_map(|i| entries.and_then(|e| e.get(i)))
            .map(Entry::to_message)
            .collect())
    }

    async fn read_new(&self, count: usize) -> Result<Vec<StreamMessage>, StreamError> {
        let mut guard = self.broker.state.lock().await;
        guard.check_available()?;

        let state = &mut *guard;
        let group = state
            .groups
            .get_mut(&self.group_key())
            .ok_or_else(|| self.missing_group())?;
        let entries = state
            .streams
            .get(&self.stream_name)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let start = group.next_index.min(entries.len());
        let end = (start + count).min(entries.len());
        let batch = &entries[start..end];

        for (offset, entry) in batch.iter().enumerate() {
            group
                .pending
                .insert(start + offset, (self.consumer_id.clone(), entry.id.clone()));
        }
        group.next_index = end;

        Ok(batch.iter().map(Entry::to_message).collect())
    }

    async fn ack(&self, stream_id: &str) -> Result<(), StreamError> {
        let mut state = self.broker.state.lock().await;
        state.check_available()?;
        if state.ack_failures_left > 0 {
            state.ack_failures_left -= 1;
            return Err(StreamError::Broker("ack rejected".to_string()));
        }

        if let Some(group) = state.groups.get_mut(&self.group_key()) {
            group.pending.retain(|_, (_, id)| id != stream_id);
        }
        Ok(())
    }

    fn stream_name(&self) -> &str {
        &self.stream_name
    }
}
