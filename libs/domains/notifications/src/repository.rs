use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::NotificationResult;
use crate::models::Notification;

/// Repository trait for Notification persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: Notification) -> NotificationResult<Notification>;

    async fn get_by_id(&self, id: Uuid) -> NotificationResult<Option<Notification>>;

    /// One user's notifications in creation order, offset/limit applied
    /// after filtering by user
    async fn list_for_user(
        &self,
        user_id: &str,
        skip: u64,
        limit: u64,
    ) -> NotificationResult<Vec<Notification>>;

    async fn unread_count(&self, user_id: &str) -> NotificationResult<u64>;

    /// Mark one notification read; `None` when it does not exist
    async fn mark_read(&self, id: Uuid) -> NotificationResult<Option<Notification>>;

    /// Mark every unread notification of a user read, returning how many changed
    async fn mark_all_read(&self, user_id: &str) -> NotificationResult<u64>;

    /// Returns true if a notification was deleted
    async fn delete(&self, id: Uuid) -> NotificationResult<bool>;
}

/// In-memory implementation of NotificationRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryNotificationRepository {
    notifications: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert(&self, notification: Notification) -> NotificationResult<Notification> {
        let mut notifications = self.notifications.write().await;
        notifications.push(notification.clone());
        Ok(notification)
    }

    async fn get_by_id(&self, id: Uuid) -> NotificationResult<Option<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        skip: u64,
        limit: u64,
    ) -> NotificationResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn unread_count(&self, user_id: &str) -> NotificationResult<u64> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as u64)
    }

    async fn mark_read(&self, id: Uuid) -> NotificationResult<Option<Notification>> {
        let mut notifications = self.notifications.write().await;
        Ok(notifications.iter_mut().find(|n| n.id == id).map(|n| {
            n.mark_read();
            n.clone()
        }))
    }

    async fn mark_all_read(&self, user_id: &str) -> NotificationResult<u64> {
        let mut notifications = self.notifications.write().await;
        let mut marked = 0;
        for notification in notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            notification.mark_read();
            marked += 1;
        }
        Ok(marked)
    }

    async fn delete(&self, id: Uuid) -> NotificationResult<bool> {
        let mut notifications = self.notifications.write().await;
        let before = notifications.len();
        notifications.retain(|n| n.id != id);
        Ok(notifications.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateNotification;

    fn notification(user_id: &str, title: &str) -> Notification {
        Notification::new(CreateNotification::new(user_id, "task_assigned", title, "M"))
    }

    async fn seeded(repo: &InMemoryNotificationRepository) {
        for i in 0..4 {
            repo.insert(notification("u1", &format!("u1-{}", i))).await.unwrap();
            repo.insert(notification("u2", &format!("u2-{}", i))).await.unwrap();
        }
    }

    fn titles(notifications: &[Notification]) -> Vec<String> {
        notifications.iter().map(|n| n.title.clone()).collect()
    }

    #[tokio::test]
    async fn test_list_filters_by_user_before_paginating() {
        let repo = InMemoryNotificationRepository::new();
        seeded(&repo).await;

        let page = repo.list_for_user("u1", 1, 2).await.unwrap();
        assert_eq!(titles(&page), vec!["u1-1", "u1-2"]);

        // Consecutive pages concatenate to the larger page
        let mut joined = repo.list_for_user("u1", 0, 2).await.unwrap();
        joined.extend(repo.list_for_user("u1", 2, 3).await.unwrap());
        assert_eq!(joined, repo.list_for_user("u1", 0, 5).await.unwrap());

        assert!(repo.list_for_user("nobody", 0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_and_unread_count() {
        let repo = InMemoryNotificationRepository::new();
        seeded(&repo).await;
        let first = repo.list_for_user("u1", 0, 1).await.unwrap().remove(0);

        assert_eq!(repo.unread_count("u1").await.unwrap(), 4);
        let marked = repo.mark_read(first.id).await.unwrap().unwrap();
        assert!(marked.is_read);
        assert_eq!(marked.created_at, first.created_at);
        assert_eq!(repo.unread_count("u1").await.unwrap(), 3);

        // Marking again keeps it read
        assert!(repo.mark_read(first.id).await.unwrap().unwrap().is_read);
        assert!(repo.mark_read(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_all_read_counts_only_unread() {
        let repo = InMemoryNotificationRepository::new();
        seeded(&repo).await;
        let first = repo.list_for_user("u1", 0, 1).await.unwrap().remove(0);
        repo.mark_read(first.id).await.unwrap();

        assert_eq!(repo.mark_all_read("u1").await.unwrap(), 3);
        assert_eq!(repo.unread_count("u1").await.unwrap(), 0);
        assert_eq!(repo.mark_all_read("u1").await.unwrap(), 0);

        // Other users are untouched
        assert_eq!(repo.unread_count("u2").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryNotificationRepository::new();
        let stored = repo.insert(notification("u1", "T")).await.unwrap();

        assert!(!repo.delete(Uuid::now_v7()).await.unwrap());
        assert!(repo.delete(stored.id).await.unwrap());
        assert!(repo.get_by_id(stored.id).await.unwrap().is_none());
        assert!(!repo.delete(stored.id).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_and_mark_all_read() {
        let repo = InMemoryNotificationRepository::new();
        let mut inserts = Vec::new();
        let mut sweeps = Vec::new();

        for i in 0..200 {
            let insert_repo = repo.clone();
            inserts.push(tokio::spawn(async move {
                insert_repo.insert(notification("u1", &format!("n-{}", i))).await.unwrap()
            }));
            if i % 20 == 0 {
                let repo = repo.clone();
                sweeps.push(tokio::spawn(async move { repo.mark_all_read("u1").await.unwrap() }));
            }
        }

        let mut ids = std::collections::HashSet::new();
        for handle in inserts {
            ids.insert(handle.await.unwrap().id);
        }
        let mut marked = 0;
        for handle in sweeps {
            marked += handle.await.unwrap();
        }

        // Every record is either still unread or was counted by exactly one sweep
        assert_eq!(ids.len(), 200);
        assert_eq!(repo.unread_count("u1").await.unwrap() + marked, 200);
        assert_eq!(repo.list_for_user("u1", 0, 500).await.unwrap().len(), 200);
    }
}
