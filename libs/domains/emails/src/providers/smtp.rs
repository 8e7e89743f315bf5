//! SMTP email provider implementation using lettre.

use super::{mailbox, EmailContent, EmailProvider, SentEmail};
use crate::error::{EmailError, EmailResult};
use async_trait::async_trait;
use core_config::{env_flag, env_optional, env_or_default, env_parse, ConfigError, FromEnv};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, error, info};
use uuid::Uuid;

/// SMTP configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub from_email: String,
    pub from_name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// STARTTLS (or implicit TLS on port 465); plaintext when false
    pub use_tls: bool,
}

impl SmtpConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }

    pub fn with_sender(
        mut self,
        from_email: impl Into<String>,
        from_name: impl Into<String>,
    ) -> Self {
        self.from_email = from_email.into();
        self.from_name = from_name.into();
        self
    }

    fn sender_domain(&self) -> &str {
        self.from_email
            .rsplit_once('@')
            .map(|(_, domain)| domain)
            .unwrap_or("localhost")
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            from_email: "noreply@colaboraapp.com".to_string(),
            from_name: "Colabora App".to_string(),
            username: None,
            password: None,
            use_tls: true,
        }
    }
}

/// Environment variables:
/// - `SMTP_HOST` (default: smtp.gmail.com)
/// - `SMTP_PORT` (default: 587)
/// - `SMTP_USER` / `SMTP_PASSWORD` (optional)
/// - `SMTP_FROM_EMAIL` (default: noreply@colaboraapp.com)
/// - `SMTP_FROM_NAME` (default: Colabora App)
/// - `SMTP_USE_TLS` (default: true)
impl FromEnv for SmtpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: env_or_default("SMTP_HOST", &defaults.host),
            port: env_parse("SMTP_PORT", defaults.port)?,
            from_email: env_or_default("SMTP_FROM_EMAIL", &defaults.from_email),
            from_name: env_or_default("SMTP_FROM_NAME", &defaults.from_name),
            username: env_optional("SMTP_USER"),
            password: env_optional("SMTP_PASSWORD"),
            use_tls: env_flag("SMTP_USE_TLS", defaults.use_tls)?,
        })
    }
}

/// SMTP email provider.
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: SmtpConfig,
    from: Mailbox,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> EmailResult<Self> {
        let transport = Self::build_transport(&config)?;
        let from_name = Some(config.from_name.clone()).filter(|name| !name.trim().is_empty());
        let from = mailbox(from_name, &config.from_email)
            .map_err(|e| EmailError::Provider(format!("Invalid from address: {}", e)))?;

        Ok(Self {
            transport,
            config,
            from,
        })
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    fn build_transport(config: &SmtpConfig) -> EmailResult<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = if config.use_tls {
            let relay = if config.port == 465 {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            };
            relay
                .map_err(|e| EmailError::Provider(format!("Failed to create SMTP relay: {}", e)))?
                .port(config.port)
        } else {
            // Local dev servers (Mailpit, MailHog) speak plaintext
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host).port(config.port)
        };

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }

    fn build_message(&self, email: &EmailContent, message_id: &str) -> EmailResult<Message> {
        let to = email.recipient()?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .message_id(Some(message_id.to_string()))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )
            .map_err(|e| EmailError::Provider(format!("Failed to build email message: {}", e)))
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &EmailContent) -> EmailResult<SentEmail> {
        debug!(
            to = %email.to_email,
            subject = %email.subject,
            host = %self.config.host,
            port = %self.config.port,
            "Sending email via SMTP"
        );

        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.config.sender_domain());
        let message = self.build_message(email, &message_id)?;

        self.transport.send(message).await.map_err(|e| {
            error!(to = %email.to_email, error = %e, "Failed to send email via SMTP");
            EmailError::Provider(format!("SMTP send failed: {}", e))
        })?;

        info!(to = %email.to_email, message_id = %message_id, "Email sent via SMTP");

        Ok(SentEmail {
            message_id: Some(message_id),
        })
    }

    fn name(&self) -> &'static str {
        "SMTP"
    }

    async fn health_check(&self) -> EmailResult<bool> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| EmailError::Provider(format!("SMTP health check failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_config_defaults() {
        let config = SmtpConfig::default();
        assert_eq!(config.host, "smtp.gmail.com");
        assert_eq!(config.port, 587);
        assert!(config.use_tls);
        assert_eq!(config.sender_domain(), "colaboraapp.com");
    }

    #[test]
    fn test_smtp_config_from_env() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", Some("localhost")),
                ("SMTP_PORT", Some("1025")),
                ("SMTP_USE_TLS", Some("false")),
                ("SMTP_USER", None),
                ("SMTP_PASSWORD", None),
                ("SMTP_FROM_EMAIL", None),
                ("SMTP_FROM_NAME", None),
            ],
            || {
                let config = SmtpConfig::from_env().unwrap();
                assert_eq!(config.host, "localhost");
                assert_eq!(config.port, 1025);
                assert!(!config.use_tls);
                assert!(config.username.is_none());
                assert_eq!(config.from_name, "Colabora App");
            },
        );
    }

    #[test]
    fn test_smtp_config_rejects_bad_port() {
        temp_env::with_var("SMTP_PORT", Some("smtp"), || {
            let err = SmtpConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("SMTP_PORT"));
        });
    }

    #[tokio::test]
    async fn test_build_message() {
        let provider =
            SmtpProvider::new(SmtpConfig::new("localhost", 1025).with_tls(false)).unwrap();
        let email = EmailContent::from_body(
            "ana@example.com",
            Some("Ana".to_string()),
            "Hola",
            "Line one\nLine two",
        );

        let message = provider.build_message(&email, "<id@colaboraapp.com>").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: Ana <ana@example.com>"));
        assert!(raw.contains("Message-ID: <id@colaboraapp.com>"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[tokio::test]
    async fn test_build_message_quotes_name_with_comma() {
        let provider =
            SmtpProvider::new(SmtpConfig::new("localhost", 1025).with_tls(false)).unwrap();
        let email = EmailContent::from_body(
            "ana@example.com",
            Some("Doe, Ana".to_string()),
            "Hola",
            "Body",
        );

        let message = provider.build_message(&email, "<id@colaboraapp.com>").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: \"Doe, Ana\" <ana@example.com>"));
    }

    #[test]
    fn test_sender_name_with_comma() {
        let config = SmtpConfig::new("localhost", 1025)
            .with_tls(false)
            .with_sender("team@example.com", "Colabora, Team");
        assert!(SmtpProvider::new(config).is_ok());
    }
}
