use redis::aio::ConnectionManager;
use redis::{Client, ErrorKind, RedisError};
use std::time::Duration;
use tracing::info;

use crate::common::{retry_with_backoff, RetryConfig};

/// Connect to Redis and verify the connection with PING
///
/// The ConnectionManager reconnects on its own after the first success.
///
/// # Example
/// ```ignore
/// let redis = database::redis::connect("redis://127.0.0.1:6379").await?;
/// ```
pub async fn connect(url: &str) -> redis::RedisResult<ConnectionManager> {
    info!("Attempting to connect to Redis at {}", url);

    let client = Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;

    let mut conn = manager.clone();
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;

    info!("Successfully connected to Redis");
    Ok(manager)
}

/// [`connect`] bounded by `timeout`; an elapsed timeout is an IO error
pub async fn connect_with_timeout(
    url: &str,
    timeout: Duration,
) -> redis::RedisResult<ConnectionManager> {
    match tokio::time::timeout(timeout, connect(url)).await {
        Ok(result) => result,
        Err(_) => Err(RedisError::from((
            ErrorKind::Io,
            "Timed out connecting to Redis",
            format!("no response within {}s", timeout.as_secs()),
        ))),
    }
}

/// Connect with exponential backoff; each attempt is bounded by a 15s
/// timeout. `None` uses [`RetryConfig::startup`].
pub async fn connect_with_retry(
    url: &str,
    retry_config: Option<RetryConfig>,
) -> redis::RedisResult<ConnectionManager> {
    let retry_config = retry_config.unwrap_or_else(RetryConfig::startup);
    retry_with_backoff(
        "redis",
        || connect_with_timeout(url, Duration::from_secs(15)),
        retry_config,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires actual Redis
    async fn test_connect() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let result = connect(&redis_url).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let retry = RetryConfig::new()
            .with_max_retries(1)
            .with_initial_delay(1)
            .without_jitter();

        assert!(connect_with_retry("not-a-redis-url", Some(retry)).await.is_err());
    }
}
