//! Configuration for the notifications service

use core_config::{
    AppInfo, ConfigError, Environment, FromEnv, app_info, env_optional, env_or_default,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;
use domain_notifications::NotificationStream;
use stream_worker::StreamDef;

pub const DEFAULT_PORT: u16 = 8002;
pub const DEFAULT_BROKER_URL: &str = "redis://127.0.0.1:6379";

/// Broker connection and subscription settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerConfig {
    /// `None` runs the service HTTP-only
    pub url: Option<String>,
    pub topic: String,
    pub consumer_group: String,
}

impl FromEnv for BrokerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_or_default("BROKER_URL", DEFAULT_BROKER_URL);
        let url = (!url.trim().is_empty()).then_some(url);

        Ok(Self {
            url,
            topic: env_or_default("NOTIFICATION_TOPIC", NotificationStream::STREAM_NAME),
            consumer_group: env_or_default("CONSUMER_GROUP", NotificationStream::CONSUMER_GROUP),
        })
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub service_name: String,
    pub environment: Environment,
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    /// `None` keeps notifications in memory
    pub database: Option<PostgresConfig>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = env_optional("DATABASE_URL")
            .map(PostgresConfig::from_url_and_env)
            .transpose()?;

        Ok(Self {
            app: app_info!(),
            service_name: env_or_default("SERVICE_NAME", "notifications-service"),
            environment: Environment::from_env(),
            server: ServerConfig::from_env_with_port(DEFAULT_PORT)?,
            broker: BrokerConfig::from_env()?,
            database,
            log_level: env_or_default("LOG_LEVEL", "info"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(
            [
                "APP_ENV",
                "SERVICE_PORT",
                "SERVICE_NAME",
                "BROKER_URL",
                "NOTIFICATION_TOPIC",
                "CONSUMER_GROUP",
                "DATABASE_URL",
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.service_name, "notifications-service");
                assert_eq!(config.server.port, 8002);
                assert_eq!(config.broker.url.as_deref(), Some(DEFAULT_BROKER_URL));
                assert_eq!(config.broker.topic, "notifications");
                assert_eq!(config.broker.consumer_group, "notifications-service-group");
                assert!(config.database.is_none());
            },
        );
    }

    #[test]
    fn test_blank_broker_url_disables_consumer() {
        temp_env::with_var("BROKER_URL", Some("  "), || {
            assert!(BrokerConfig::from_env().unwrap().url.is_none());
        });
    }

    #[test]
    fn test_database_pool_settings_come_from_env() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://app:app@db:5432/notifications")),
                ("DB_MAX_CONNECTIONS", Some("5")),
            ],
            || {
                let database = Config::from_env().unwrap().database.unwrap();
                assert_eq!(database.url(), "postgres://app:app@db:5432/notifications");
                assert_eq!(database.max_connections, 5);
            },
        );
    }
}
