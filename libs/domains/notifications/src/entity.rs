use crate::models::Notification;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// Sea-ORM Entity for the notifications table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub notification_type: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub is_read: bool,
    pub related_project_id: Option<String>,
    pub related_user_id: Option<String>,
    pub related_task_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Notification {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            notification_type: model.notification_type,
            title: model.title,
            message: model.message,
            is_read: model.is_read,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            related_project_id: model.related_project_id,
            related_user_id: model.related_user_id,
            related_task_id: model.related_task_id,
        }
    }
}

impl From<Notification> for ActiveModel {
    fn from(notification: Notification) -> Self {
        ActiveModel {
            id: Set(notification.id),
            user_id: Set(notification.user_id),
            notification_type: Set(notification.notification_type),
            title: Set(notification.title),
            message: Set(notification.message),
            is_read: Set(notification.is_read),
            related_project_id: Set(notification.related_project_id),
            related_user_id: Set(notification.related_user_id),
            related_task_id: Set(notification.related_task_id),
            created_at: Set(notification.created_at.into()),
            updated_at: Set(notification.updated_at.into()),
        }
    }
}
