use chrono::Utc;
use std::sync::Arc;
use stream_worker::{to_payload, EventPublisher};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{EmailError, EmailResult};
use crate::events::EmailEvent;
use crate::models::{EmailLog, EmailStats, EmailStatus, Pagination, SendEmailRequest};
use crate::providers::{EmailContent, EmailProvider};
use crate::repository::EmailLogRepository;
use crate::templates::TemplateEngine;

/// Service layer for email delivery and its logs
pub struct EmailService<R: EmailLogRepository> {
    repository: Arc<R>,
    provider: Arc<dyn EmailProvider>,
    templates: Arc<TemplateEngine>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl<R: EmailLogRepository> EmailService<R> {
    pub fn new(repository: R, provider: Arc<dyn EmailProvider>) -> EmailResult<Self> {
        Ok(Self {
            repository: Arc::new(repository),
            provider,
            templates: Arc::new(TemplateEngine::new()?),
            publisher: None,
        })
    }

    /// Enable `queue` by attaching a producer for the `emails` topic
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Render, deliver and log one email.
    ///
    /// Delivery failures are recorded on the returned log as `failed`; only
    /// invalid input and storage failures are errors.
    #[instrument(skip(self, request), fields(to = %request.to_email))]
    pub async fn send(&self, request: SendEmailRequest) -> EmailResult<EmailLog> {
        request.validate()?;

        let body = self.templates.resolve_body(
            request.template_name.as_deref(),
            request.template_data.as_ref(),
            &request.body,
        );
        let content = EmailContent::from_body(
            &request.to_email,
            request.to_name.clone(),
            &request.subject,
            &body,
        );

        let mut log = EmailLog {
            id: Uuid::now_v7(),
            to_email: request.to_email,
            to_name: request.to_name,
            subject: request.subject,
            body,
            status: EmailStatus::Pending,
            error_message: None,
            message_id: None,
            created_at: Utc::now(),
            sent_at: None,
            event_type: request.event_type,
            related_user_id: request.related_user_id,
            related_project_id: request.related_project_id,
        };

        match self.provider.send(&content).await {
            Ok(sent) => {
                log.status = EmailStatus::Sent;
                log.sent_at = Some(Utc::now());
                log.message_id = sent.message_id;
                info!(id = %log.id, provider = self.provider.name(), "Email sent");
            }
            Err(e) => {
                log.status = EmailStatus::Failed;
                log.error_message = Some(e.to_string());
                warn!(id = %log.id, error = %e, "Email delivery failed");
            }
        }

        self.repository.insert(log).await
    }

    pub async fn get_log(&self, id: Uuid) -> EmailResult<EmailLog> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(EmailError::NotFound(id))
    }

    pub async fn list_logs(&self, page: Pagination) -> EmailResult<Vec<EmailLog>> {
        page.validate()?;
        self.repository.list(page.skip, page.limit).await
    }

    pub async fn stats(&self) -> EmailResult<EmailStats> {
        self.repository.stats().await
    }

    /// Publish a send request to the `emails` topic, keyed by recipient.
    ///
    /// Returns the broker's stream id.
    pub async fn queue(&self, request: SendEmailRequest) -> EmailResult<String> {
        request.validate()?;

        let publisher = self
            .publisher
            .as_ref()
            .ok_or(EmailError::BrokerUnavailable)?;

        let key = request.to_email.clone();
        let event = EmailEvent::from_request(request, Utc::now());
        let stream_id = publisher.publish(Some(&key), &to_payload(&event)?).await?;

        info!(stream_id = %stream_id, to = %key, "Email queued");
        Ok(stream_id)
    }
}
