//! Notification processor for the stream worker.

use async_trait::async_trait;
use std::sync::Arc;
use stream_worker::{Payload, StreamError, StreamProcessor};
use tracing::info;

use crate::events::NotificationCommand;
use crate::repository::NotificationRepository;
use crate::service::NotificationService;

/// Turns `notifications` events into stored notifications
pub struct NotificationProcessor<R: NotificationRepository> {
    service: Arc<NotificationService<R>>,
}

impl<R: NotificationRepository> NotificationProcessor<R> {
    pub fn new(service: Arc<NotificationService<R>>) -> Self {
        Self { service }
    }
}

impl<R: NotificationRepository> Clone for NotificationProcessor<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

#[async_trait]
impl<R: NotificationRepository + 'static> StreamProcessor for NotificationProcessor<R> {
    async fn process(&self, payload: &Payload) -> Result<(), StreamError> {
        match NotificationCommand::try_from(payload)? {
            NotificationCommand::Create(input) => {
                let notification = self.service.create(input).await?;
                info!(
                    notification_id = %notification.id,
                    user_id = %notification.user_id,
                    "Processed notification event"
                );
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "NotificationProcessor"
    }
}
