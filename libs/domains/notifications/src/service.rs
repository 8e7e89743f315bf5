use chrono::Utc;
use std::sync::Arc;
use stream_worker::{to_payload, EventPublisher};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{NotificationError, NotificationResult};
use crate::events::NotificationEvent;
use crate::models::{CreateNotification, Notification, UserNotificationsQuery};
use crate::repository::NotificationRepository;

/// Service layer for Notification business logic
pub struct NotificationService<R: NotificationRepository> {
    repository: Arc<R>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl<R: NotificationRepository> NotificationService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            publisher: None,
        }
    }

    /// Enable `publish` by attaching a producer for the `notifications` topic
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Create an unread notification
    pub async fn create(&self, input: CreateNotification) -> NotificationResult<Notification> {
        input.validate()?;

        let notification = self.repository.insert(Notification::new(input)).await?;
        info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            "Notification created"
        );
        Ok(notification)
    }

    pub async fn get(&self, id: Uuid) -> NotificationResult<Notification> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(NotificationError::NotFound(id))
    }

    pub async fn list_for_user(
        &self,
        query: UserNotificationsQuery,
    ) -> NotificationResult<Vec<Notification>> {
        query.validate()?;
        self.repository
            .list_for_user(&query.user_id, query.skip, query.limit)
            .await
    }

    pub async fn unread_count(&self, user_id: &str) -> NotificationResult<u64> {
        self.repository.unread_count(user_id).await
    }

    pub async fn mark_read(&self, id: Uuid) -> NotificationResult<Notification> {
        self.repository
            .mark_read(id)
            .await?
            .ok_or(NotificationError::NotFound(id))
    }

    /// Returns the number of notifications that were unread
    pub async fn mark_all_read(&self, user_id: &str) -> NotificationResult<u64> {
        let marked = self.repository.mark_all_read(user_id).await?;
        info!(user_id = %user_id, marked, "Marked all notifications read");
        Ok(marked)
    }

    pub async fn delete(&self, id: Uuid) -> NotificationResult<()> {
        if !self.repository.delete(id).await? {
            return Err(NotificationError::NotFound(id));
        }

        info!(notification_id = %id, "Notification deleted");
        Ok(())
    }

    /// Publish a notification event keyed by `user_id`, returning the stream id
    pub async fn publish(&self, input: CreateNotification) -> NotificationResult<String> {
        input.validate()?;

        let publisher = self
            .publisher
            .as_ref()
            .ok_or(NotificationError::BrokerUnavailable)?;

        let key = input.user_id.clone();
        let event = NotificationEvent::from_request(input, Utc::now());
        let stream_id = publisher.publish(Some(&key), &to_payload(&event)?).await?;

        info!(stream_id = %stream_id, user_id = %key, "Notification event published");
        Ok(stream_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryNotificationRepository, MockNotificationRepository};
    use mockall::predicate::*;
    use stream_worker::MemoryBroker;

    #[tokio::test]
    async fn test_create_starts_unread() {
        let service = NotificationService::new(InMemoryNotificationRepository::new());

        let created = service
            .create(CreateNotification::new("u1", "task_assigned", "T", "M"))
            .await
            .unwrap();

        assert!(!created.is_read);
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(service.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_validates_before_storing() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_insert().never();

        let service = NotificationService::new(repo);
        let result = service
            .create(CreateNotification::new("", "task_assigned", "T", "M"))
            .await;

        assert!(matches!(result, Err(NotificationError::Validation(_))));
    }

    #[tokio::test]
    async fn test_mark_read_not_found() {
        let id = Uuid::now_v7();
        let mut repo = MockNotificationRepository::new();
        repo.expect_mark_read()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(None));

        let service = NotificationService::new(repo);
        let result = service.mark_read(id).await;
        assert!(matches!(result, Err(NotificationError::NotFound(got)) if got == id));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_delete().times(1).returning(|_| Ok(false));

        let service = NotificationService::new(repo);
        assert!(matches!(
            service.delete(Uuid::now_v7()).await,
            Err(NotificationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_passes_user_and_page() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_list_for_user()
            .withf(|user_id, skip, limit| user_id == "u1" && *skip == 10 && *limit == 5)
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let service = NotificationService::new(repo);
        let page = service
            .list_for_user(UserNotificationsQuery::new("u1", 10, 5))
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_mark_all_read_then_unread_count_is_zero() {
        let service = NotificationService::new(InMemoryNotificationRepository::new());
        for title in ["a", "b", "c"] {
            service
                .create(CreateNotification::new("u1", "t", title, "M"))
                .await
                .unwrap();
        }

        let unread = service.unread_count("u1").await.unwrap();
        assert_eq!(service.mark_all_read("u1").await.unwrap(), unread);
        assert_eq!(service.unread_count("u1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_publish_requires_broker() {
        let service = NotificationService::new(InMemoryNotificationRepository::new());
        let result = service
            .publish(CreateNotification::new("u1", "t", "T", "M"))
            .await;
        assert!(matches!(result, Err(NotificationError::BrokerUnavailable)));

        let broker = MemoryBroker::new();
        let service = NotificationService::new(InMemoryNotificationRepository::new())
            .with_publisher(Arc::new(broker.producer("notifications")));
        service
            .publish(CreateNotification::new("u1", "t", "T", "M"))
            .await
            .unwrap();
        assert_eq!(broker.len("notifications").await, 1);
    }
}
