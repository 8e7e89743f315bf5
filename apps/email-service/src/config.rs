//! Configuration for the email service

use core_config::{
    AppInfo, ConfigError, Environment, FromEnv, app_info, env_optional, env_or_default,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;
use domain_emails::{EmailStream, SmtpConfig};
use stream_worker::StreamDef;

pub const DEFAULT_PORT: u16 = 8003;
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
            topic: env_or_default("EMAIL_TOPIC", EmailStream::STREAM_NAME),
            consumer_group: env_or_default("CONSUMER_GROUP", EmailStream::CONSUMER_GROUP),
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
    /// `None` keeps email logs in memory
    pub database: Option<PostgresConfig>,
    pub smtp: SmtpConfig,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = env_optional("DATABASE_URL")
            .map(PostgresConfig::from_url_and_env)
            .transpose()?;

        Ok(Self {
            app: app_info!(),
            service_name: env_or_default("SERVICE_NAME", "email-service"),
            environment: Environment::from_env(),
            server: ServerConfig::from_env_with_port(DEFAULT_PORT)?,
            broker: BrokerConfig::from_env()?,
            database,
            smtp: SmtpConfig::from_env()?,
            log_level: env_or_default("LOG_LEVEL", "info"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 9] = [
        "APP_ENV",
        "HOST",
        "SERVICE_PORT",
        "SERVICE_NAME",
        "BROKER_URL",
        "EMAIL_TOPIC",
        "CONSUMER_GROUP",
        "DATABASE_URL",
        "LOG_LEVEL",
    ];

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(VARS, || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.service_name, "email-service");
            assert_eq!(config.server.port, 8003);
            assert_eq!(config.broker.url.as_deref(), Some(DEFAULT_BROKER_URL));
            assert_eq!(config.broker.topic, "emails");
            assert_eq!(config.broker.consumer_group, "email-service-group");
            assert!(config.database.is_none());
            assert_eq!(config.log_level, "info");
            assert!(config.environment.is_development());
        });
    }

    #[test]
    fn test_empty_broker_url_disables_consumer() {
        temp_env::with_var("BROKER_URL", Some(""), || {
            let broker = BrokerConfig::from_env().unwrap();
            assert!(broker.url.is_none());
        });
    }

    #[test]
    fn test_overrides() {
        temp_env::with_vars(
            [
                ("SERVICE_PORT", Some("9100")),
                ("BROKER_URL", Some("redis://broker:6379")),
                ("EMAIL_TOPIC", Some("emails-staging")),
                ("CONSUMER_GROUP", Some("staging-group")),
                ("DATABASE_URL", Some("postgres://app:app@db:5432/emails")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.server.port, 9100);
                assert_eq!(config.broker.url.as_deref(), Some("redis://broker:6379"));
                assert_eq!(config.broker.topic, "emails-staging");
                assert_eq!(config.broker.consumer_group, "staging-group");
                assert_eq!(
                    config.database.unwrap().url(),
                    "postgres://app:app@db:5432/emails"
                );
            },
        );
    }

    #[test]
    fn test_bad_port_is_rejected() {
        temp_env::with_var("SERVICE_PORT", Some("eighty"), || {
            assert!(Config::from_env().is_err());
        });
    }
}
