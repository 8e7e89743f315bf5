//! Test infrastructure shared by the email and notification domains.
//!
//! - [`TestDatabase`]: PostgreSQL 16 container with the workspace
//!   migrations applied (feature `postgres`, on by default)
//! - [`TestRedis`]: Redis 7 container for stream tests (feature `redis`)
//! - [`TestDataBuilder`]: per-test identifiers that do not collide when
//!   tests share a container
//! - [`assertions`]: assertion helpers with readable failure messages
//!
//! Container-backed tests need Docker; mark them
//! `#[ignore = "requires Docker"]` and run with `cargo test -- --ignored`.
//!
//! ```rust,ignore
//! use stream_worker::StreamProducer;
//! use test_utils::{TestDataBuilder, TestRedis};
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn publishes_to_redis() {
//!     let redis = TestRedis::new().await;
//!     let producer = StreamProducer::new(redis.connection(), "notifications");
//!     let user_id = TestDataBuilder::from_test_name("publishes_to_redis").user_key();
//! }
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

#[cfg(feature = "redis")]
pub use redis::TestRedis;

/// Identifiers derived from a seed, so a test gets the same values on every
/// run and different tests get different ones.
#[derive(Debug, Clone, Copy)]
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test's name.
    pub fn from_test_name(name: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Deterministic UUID built from the seed bytes
    pub fn uuid(&self) -> Uuid {
        let half = self.seed.to_be_bytes();
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&half);
        bytes[8..].copy_from_slice(&half);
        Uuid::from_bytes(bytes)
    }

    /// User key in the form the services store (`user-<uuid>`)
    pub fn user_key(&self) -> String {
        format!("user-{}", self.uuid())
    }

    /// Recipient address unique to this test
    pub fn email(&self, local: &str) -> String {
        format!("{}.{}@example.com", local, self.seed)
    }
}

/// Assertion helpers
pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Unwrap an `Option`, naming what was missing on failure.
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_data() {
        let a = TestDataBuilder::from_test_name("same");
        let b = TestDataBuilder::from_test_name("same");

        assert_eq!(a.uuid(), b.uuid());
        assert_eq!(a.user_key(), b.user_key());
        assert_eq!(a.email("ana"), b.email("ana"));
    }

    #[test]
    fn test_different_names_different_data() {
        let a = TestDataBuilder::from_test_name("first");
        let b = TestDataBuilder::from_test_name("second");

        assert_ne!(a.user_key(), b.user_key());
        assert_ne!(a.email("ana"), b.email("ana"));
    }

    #[test]
    fn test_formats() {
        let builder = TestDataBuilder::new(7);
        assert!(builder.user_key().starts_with("user-"));
        assert_eq!(builder.email("ana"), "ana.7@example.com");
    }
}
