//! Redis container for stream tests

use redis::aio::ConnectionManager;
use redis::{Client, RedisResult};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::redis::Redis;

/// Redis 7 container plus a managed connection.
///
/// The container is removed when this value is dropped.
///
/// ```no_run
/// use test_utils::TestRedis;
///
/// # async fn example() {
/// let redis = TestRedis::new().await;
/// let conn = redis.connection();
/// // Hand conn to a StreamProducer or StreamConsumer
/// # }
/// ```
pub struct TestRedis {
    _container: ContainerAsync<Redis>,
    connection: ConnectionManager,
    pub url: String,
}

impl TestRedis {
    pub async fn new() -> Self {
        let container = Redis::default()
            .with_tag("7-alpine")
            .start()
            .await
            .expect("Failed to start Redis container");

        let port = container
            .get_host_port_ipv4(6379)
            .await
            .expect("Failed to get Redis port");
        let url = format!("redis://127.0.0.1:{}", port);

        let client = Client::open(url.as_str()).expect("Failed to create Redis client");
        let connection = ConnectionManager::new(client)
            .await
            .expect("Failed to connect to Redis");

        tracing::info!(port, "Test Redis ready");

        Self {
            _container: container,
            connection,
            url,
        }
    }

    /// Connection handle; clones share the underlying connection.
    pub fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }

    /// Entries currently in `stream` (XLEN)
    pub async fn stream_len(&self, stream: &str) -> RedisResult<u64> {
        redis::cmd("XLEN")
            .arg(stream)
            .query_async(&mut self.connection())
            .await
    }

    /// Delivered but unacknowledged entries of `group` (XPENDING summary)
    pub async fn pending(&self, stream: &str, group: &str) -> RedisResult<u64> {
        let (count, _, _, _): (u64, Option<String>, Option<String>, redis::Value) =
            redis::cmd("XPENDING")
                .arg(stream)
                .arg(group)
                .query_async(&mut self.connection())
                .await?;
        Ok(count)
    }
}
