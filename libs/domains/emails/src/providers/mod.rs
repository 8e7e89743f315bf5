//! Email provider implementations.
//!
//! This module contains the `EmailProvider` trait, the SMTP implementation
//! used in production and a recording provider for tests and local runs.

mod recording;
mod smtp;

pub use recording::RecordingEmailProvider;
pub use smtp::{SmtpConfig, SmtpProvider};

use crate::error::{EmailError, EmailResult};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::Address;

/// Provider acknowledgement of an accepted email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentEmail {
    /// Message-ID assigned to the email, for tracking.
    pub message_id: Option<String>,
}

/// Email content ready for sending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailContent {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl EmailContent {
    /// Build both alternatives from a single body.
    ///
    /// An HTML body is sent as-is with a tag-stripped text part; plain text
    /// is escaped and gets `<br>` line breaks in the HTML part.
    pub fn from_body(
        to_email: impl Into<String>,
        to_name: Option<String>,
        subject: impl Into<String>,
        body: &str,
    ) -> Self {
        let (html_body, text_body) = if looks_like_html(body) {
            (body.to_string(), html_to_text(body))
        } else {
            (text_to_html(body), body.to_string())
        };

        Self {
            to_email: to_email.into(),
            to_name: to_name.filter(|name| !name.trim().is_empty()),
            subject: subject.into(),
            html_body,
            text_body,
        }
    }

    /// Recipient mailbox. The display name is quoted on output when it
    /// holds RFC 5322 specials, so only the address can be rejected.
    pub fn recipient(&self) -> EmailResult<Mailbox> {
        mailbox(self.to_name.clone(), &self.to_email)
            .map_err(|e| EmailError::Provider(format!("Invalid to address: {}", e)))
    }
}

/// Trait for email sending providers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send an email.
    async fn send(&self, email: &EmailContent) -> EmailResult<SentEmail>;

    /// Get the provider name for logging.
    fn name(&self) -> &'static str;

    /// Check if the provider is reachable.
    async fn health_check(&self) -> EmailResult<bool>;
}

pub(crate) fn mailbox(
    name: Option<String>,
    email: &str,
) -> Result<Mailbox, lettre::address::AddressError> {
    Ok(Mailbox::new(name, email.trim().parse::<Address>()?))
}

fn looks_like_html(body: &str) -> bool {
    let lower = body.trim_start().to_ascii_lowercase();
    ["<html", "<!doctype", "<body", "<p>", "<p ", "<div", "<h1", "<table", "<br"]
        .iter()
        .any(|tag| lower.contains(tag))
}

fn text_to_html(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '"' => html.push_str("&quot;"),
            '\n' => html.push_str("<br>"),
            '\r' => {}
            other => html.push(other),
        }
    }
    html
}

fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
