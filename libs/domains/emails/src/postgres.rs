use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    entity,
    error::EmailResult,
    models::{EmailLog, EmailStats, EmailStatus},
    repository::EmailLogRepository,
};

/// PostgreSQL-backed EmailLogRepository
#[derive(Clone)]
pub struct PgEmailLogRepository {
    db: DatabaseConnection,
}

impl PgEmailLogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PgEmailLogRepository {
    async fn count_status(&self, status: EmailStatus) -> EmailResult<u64> {
        let count = entity::Entity::find()
            .filter(entity::Column::Status.eq(status.to_string()))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl EmailLogRepository for PgEmailLogRepository {
    async fn insert(&self, log: EmailLog) -> EmailResult<EmailLog> {
        let active_model: entity::ActiveModel = log.into();
        let model = active_model.insert(&self.db).await?;

        tracing::debug!(email_id = %model.id, "Stored email log");
        Ok(EmailLog::try_from(model)?)
    }

    async fn get_by_id(&self, id: Uuid) -> EmailResult<Option<EmailLog>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(EmailLog::try_from).transpose()?)
    }

    async fn list(&self, skip: u64, limit: u64) -> EmailResult<Vec<EmailLog>> {
        // UUID v7 ids break created_at ties in insertion order
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::CreatedAt)
            .order_by_asc(entity::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?;

        let logs = models
            .into_iter()
            .map(EmailLog::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    async fn stats(&self) -> EmailResult<EmailStats> {
        Ok(EmailStats {
            total_sent: self.count_status(EmailStatus::Sent).await?,
            total_failed: self.count_status(EmailStatus::Failed).await?,
            total_pending: self.count_status(EmailStatus::Pending).await?,
        })
    }
}
