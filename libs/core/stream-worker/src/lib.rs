//! Stream Worker Framework
//!
//! A small event pipeline over Redis Streams consumer groups: producers
//! publish JSON payloads onto a topic, a `StreamWorker` reads them as a
//! group member and hands each payload to a `StreamProcessor`.
//!
//! ## Features
//!
//! - **Consumer groups**: each service reads a topic through its own group
//! - **At-least-once delivery**: unacknowledged messages are recovered on restart
//! - **Broker resilience**: exponential backoff on broker errors
//! - **Prometheus metrics**: received / processed / failed counters
//! - **In-memory broker**: the same semantics for tests, no Redis needed
//!
//! ## Example
//!
//! ```ignore
//! use stream_worker::{StreamConsumer, StreamDef, StreamProcessor, StreamWorker, WorkerConfig};
//!
//! struct EmailStream;
//! impl StreamDef for EmailStream {
//!     const STREAM_NAME: &'static str = "emails";
//!     const CONSUMER_GROUP: &'static str = "email-service-group";
//! }
//!
//! let config = WorkerConfig::from_stream_def::<EmailStream>();
//! let consumer = StreamConsumer::new(redis, config.clone());
//! let worker = StreamWorker::new(consumer, Arc::new(processor), config);
//! worker.run(shutdown_rx).await?;
//! ```

mod config;
mod consumer;
mod error;
mod event;
pub mod memory;
pub mod metrics;
mod producer;
mod registry;
mod worker;

// Re-export main types
pub use config::WorkerConfig;
pub use consumer::{MessageSource, StreamConsumer};
pub use error::{ErrorCategory, StreamError};
pub use event::{
    deserialize_event_timestamp, parse_event_timestamp, to_payload, Payload, StreamMessage,
};
pub use memory::{MemoryBroker, MemoryConsumer, MemoryProducer};
pub use metrics::{init_metrics, render_metrics, StreamMetrics};
pub use producer::{EventPublisher, StreamProducer};
pub use registry::{MessageKey, StreamDef, StreamProcessor};
pub use worker::StreamWorker;
