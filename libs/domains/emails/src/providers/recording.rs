//! Provider that records emails instead of sending them

use super::{EmailContent, EmailProvider, SentEmail};
use crate::error::{EmailError, EmailResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Captures sent emails in memory; can be set up to fail every send.
#[derive(Clone, Default)]
pub struct RecordingEmailProvider {
    sent: Arc<Mutex<Vec<EmailContent>>>,
    failure: Option<String>,
}

impl RecordingEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every send fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(message.into()),
        }
    }

    pub async fn sent_emails(&self) -> Vec<EmailContent> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent
            .lock()
            .await
            .iter()
            .any(|sent| sent.to_email == email)
    }
}

#[async_trait]
impl EmailProvider for RecordingEmailProvider {
    async fn send(&self, email: &EmailContent) -> EmailResult<SentEmail> {
        if let Some(message) = &self.failure {
            return Err(EmailError::Provider(message.clone()));
        }

        self.sent.lock().await.push(email.clone());
        Ok(SentEmail {
            message_id: Some(format!("<{}@recording.local>", Uuid::new_v4())),
        })
    }

    fn name(&self) -> &'static str {
        "recording"
    }

    async fn health_check(&self) -> EmailResult<bool> {
        Ok(self.failure.is_none())
    }
}
