//! PostgreSQL connector and migration runner

mod config;
mod connector;

pub use config::PostgresConfig;
pub use connector::{connect, connect_with_retry, run_migrations};

// Re-export SeaORM types for convenience
pub use sea_orm::{DatabaseConnection, DbErr};
pub use sea_orm_migration::MigratorTrait;
