use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::EmailResult;
use crate::models::{EmailLog, EmailStats};

/// Repository trait for EmailLog persistence.
///
/// Logs are append-only: there is no update or delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailLogRepository: Send + Sync {
    /// Store a finished delivery attempt
    async fn insert(&self, log: EmailLog) -> EmailResult<EmailLog>;

    /// Get a log by ID
    async fn get_by_id(&self, id: Uuid) -> EmailResult<Option<EmailLog>>;

    /// Logs in creation order, offset/limit paginated
    async fn list(&self, skip: u64, limit: u64) -> EmailResult<Vec<EmailLog>>;

    /// Counts by status
    async fn stats(&self) -> EmailResult<EmailStats>;
}

/// In-memory implementation of EmailLogRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryEmailLogRepository {
    // Vec keeps creation order
    logs: Arc<RwLock<Vec<EmailLog>>>,
}

impl InMemoryEmailLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmailLogRepository for InMemoryEmailLogRepository {
    async fn insert(&self, log: EmailLog) -> EmailResult<EmailLog> {
        let mut logs = self.logs.write().await;
        logs.push(log.clone());
        Ok(log)
    }

    async fn get_by_id(&self, id: Uuid) -> EmailResult<Option<EmailLog>> {
        let logs = self.logs.read().await;
        Ok(logs.iter().find(|log| log.id == id).cloned())
    }

    async fn list(&self, skip: u64, limit: u64) -> EmailResult<Vec<EmailLog>> {
        let logs = self.logs.read().await;
        Ok(logs
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn stats(&self) -> EmailResult<EmailStats> {
        let logs = self.logs.read().await;
        let mut stats = EmailStats::default();
        for log in logs.iter() {
            stats.record(log.status);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailStatus;
    use chrono::Utc;

    fn log(to: &str, status: EmailStatus) -> EmailLog {
        EmailLog {
            id: Uuid::now_v7(),
            to_email: to.to_string(),
            to_name: None,
            subject: "Subject".to_string(),
            body: "Body".to_string(),
            status,
            error_message: None,
            message_id: None,
            created_at: Utc::now(),
            sent_at: None,
            event_type: None,
            related_user_id: None,
            related_project_id: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryEmailLogRepository::new();
        let stored = repo.insert(log("ana@example.com", EmailStatus::Sent)).await.unwrap();

        let fetched = repo.get_by_id(stored.id).await.unwrap();
        assert_eq!(fetched, Some(stored));
        assert!(repo.get_by_id(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order() {
        let repo = InMemoryEmailLogRepository::new();
        for i in 0..5 {
            repo.insert(log(&format!("user{}@example.com", i), EmailStatus::Sent))
                .await
                .unwrap();
        }

        let page = repo.list(1, 2).await.unwrap();
        let recipients: Vec<&str> = page.iter().map(|l| l.to_email.as_str()).collect();
        assert_eq!(recipients, vec!["user1@example.com", "user2@example.com"]);

        assert!(repo.list(10, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats_sum_to_total() {
        let repo = InMemoryEmailLogRepository::new();
        repo.insert(log("a@example.com", EmailStatus::Sent)).await.unwrap();
        repo.insert(log("b@example.com", EmailStatus::Failed)).await.unwrap();
        repo.insert(log("c@example.com", EmailStatus::Sent)).await.unwrap();

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.total_sent, 2);
        assert_eq!(stats.total_failed, 1);
        assert_eq!(stats.total_pending, 0);
        assert_eq!(stats.total(), 3);
    }
}
