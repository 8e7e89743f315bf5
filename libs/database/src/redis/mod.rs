//! Redis connection helpers

mod connector;

pub use connector::{connect, connect_with_retry, connect_with_timeout};

// Re-export redis types for convenience
pub use redis::aio::ConnectionManager;
pub use redis::{Client, RedisResult};
