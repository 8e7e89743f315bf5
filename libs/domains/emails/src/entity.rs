use crate::models::{EmailLog, EmailStatus};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// Sea-ORM Entity for the email_logs table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "email_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub to_email: String,
    pub to_name: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub status: String, // Stored as text, converted to/from enum
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub message_id: Option<String>,
    pub event_type: Option<String>,
    pub related_user_id: Option<String>,
    pub related_project_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub sent_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for EmailLog {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse::<EmailStatus>()
            .map_err(|_| DbErr::Type(format!("Invalid email status '{}'", model.status)))?;

        Ok(Self {
            id: model.id,
            to_email: model.to_email,
            to_name: model.to_name,
            subject: model.subject,
            body: model.body,
            status,
            error_message: model.error_message,
            message_id: model.message_id,
            created_at: model.created_at.into(),
            sent_at: model.sent_at.map(Into::into),
            event_type: model.event_type,
            related_user_id: model.related_user_id,
            related_project_id: model.related_project_id,
        })
    }
}

impl From<EmailLog> for ActiveModel {
    fn from(log: EmailLog) -> Self {
        ActiveModel {
            id: Set(log.id),
            to_email: Set(log.to_email),
            to_name: Set(log.to_name),
            subject: Set(log.subject),
            body: Set(log.body),
            status: Set(log.status.to_string()),
            error_message: Set(log.error_message),
            message_id: Set(log.message_id),
            event_type: Set(log.event_type),
            related_user_id: Set(log.related_user_id),
            related_project_id: Set(log.related_project_id),
            created_at: Set(log.created_at.into()),
            sent_at: Set(log.sent_at.map(Into::into)),
        }
    }
}
