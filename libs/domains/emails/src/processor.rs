//! Email processor for the stream worker.
//!
//! Decodes each `emails` event into an [`EmailCommand`] and runs it through
//! the [`EmailService`]. A delivery failure is recorded on the log and is not
//! a processing error.

use async_trait::async_trait;
use std::sync::Arc;
use stream_worker::{Payload, StreamError, StreamProcessor};
use tracing::info;

use crate::events::EmailCommand;
use crate::models::EmailStatus;
use crate::repository::EmailLogRepository;
use crate::service::EmailService;

pub struct EmailProcessor<R: EmailLogRepository> {
    service: Arc<EmailService<R>>,
}

impl<R: EmailLogRepository> EmailProcessor<R> {
    pub fn new(service: Arc<EmailService<R>>) -> Self {
        Self { service }
    }
}

impl<R: EmailLogRepository> Clone for EmailProcessor<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

#[async_trait]
impl<R: EmailLogRepository + 'static> StreamProcessor for EmailProcessor<R> {
    async fn process(&self, payload: &Payload) -> Result<(), StreamError> {
        match EmailCommand::try_from(payload)? {
            EmailCommand::Send(request) => {
                let event_type = request.event_type.clone().unwrap_or_default();
                let log = self.service.send(request).await?;

                info!(
                    id = %log.id,
                    event_type = %event_type,
                    to = %log.to_email,
                    delivered = log.status == EmailStatus::Sent,
                    "Processed email event"
                );
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "EmailProcessor"
    }
}
