use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    entity, error::NotificationResult, models::Notification,
    repository::NotificationRepository,
};

/// PostgreSQL-backed NotificationRepository
#[derive(Clone)]
pub struct PgNotificationRepository {
    db: DatabaseConnection,
}

impl PgNotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn insert(&self, notification: Notification) -> NotificationResult<Notification> {
        let active_model: entity::ActiveModel = notification.into();
        let model = active_model.insert(&self.db).await?;

        tracing::debug!(
            notification_id = %model.id,
            user_id = %model.user_id,
            "Stored notification"
        );
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> NotificationResult<Option<Notification>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        skip: u64,
        limit: u64,
    ) -> NotificationResult<Vec<Notification>> {
        let models = entity::Entity::find()
            .filter(entity::Column::UserId.eq(user_id))
            .order_by_asc(entity::Column::CreatedAt)
            .order_by_asc(entity::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn unread_count(&self, user_id: &str) -> NotificationResult<u64> {
        let count = entity::Entity::find()
            .filter(entity::Column::UserId.eq(user_id))
            .filter(entity::Column::IsRead.eq(false))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn mark_read(&self, id: Uuid) -> NotificationResult<Option<Notification>> {
        let Some(model) = entity::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active_model = model.into_active_model();
        active_model.is_read = Set(true);
        active_model.updated_at = Set(Utc::now().into());

        let updated = active_model.update(&self.db).await?;
        Ok(Some(updated.into()))
    }

    async fn mark_all_read(&self, user_id: &str) -> NotificationResult<u64> {
        let result = entity::Entity::update_many()
            .col_expr(entity::Column::IsRead, Expr::value(true))
            .col_expr(entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(entity::Column::UserId.eq(user_id))
            .filter(entity::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;

        tracing::debug!(
            user_id = %user_id,
            marked = result.rows_affected,
            "Marked notifications read"
        );
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> NotificationResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
