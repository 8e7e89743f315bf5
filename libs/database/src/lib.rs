//! Connectors for the stores the services persist to.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL support with SeaORM
//! - `redis` (default) - Redis connections for the event broker
//!
//! # Examples
//!
//! ## PostgreSQL
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let db = postgres::connect_with_retry(PostgresConfig::new(url), None).await?;
//! postgres::run_migrations::<Migrator>(&db, "email-service").await?;
//! ```
//!
//! ## Redis
//!
//! ```ignore
//! use database::redis;
//!
//! let conn = redis::connect_with_retry("redis://127.0.0.1:6379", None).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;
