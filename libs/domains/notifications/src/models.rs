use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// In-app notification addressed to one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    /// Free-form kind, e.g. `task_assigned`
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub related_project_id: Option<String>,
    pub related_user_id: Option<String>,
    pub related_task_id: Option<String>,
}

impl Notification {
    /// New unread notification stamped with the current time
    pub fn new(input: CreateNotification) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            notification_type: input.notification_type,
            title: input.title,
            message: input.message,
            is_read: false,
            created_at: now,
            updated_at: now,
            related_project_id: input.related_project_id,
            related_user_id: input.related_user_id,
            related_task_id: input.related_task_id,
        }
    }

    pub fn mark_read(&mut self) {
        self.is_read = true;
        self.updated_at = Utc::now();
    }
}

/// Input for creating a notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateNotification {
    #[validate(length(min = 1, max = 64))]
    pub user_id: String,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub notification_type: String,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub message: String,

    #[serde(default)]
    pub related_project_id: Option<String>,
    #[serde(default)]
    pub related_user_id: Option<String>,
    #[serde(default)]
    pub related_task_id: Option<String>,
}

impl CreateNotification {
    pub fn new(
        user_id: impl Into<String>,
        notification_type: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            notification_type: notification_type.into(),
            title: title.into(),
            message: message.into(),
            related_project_id: None,
            related_user_id: None,
            related_task_id: None,
        }
    }
}

fn default_limit() -> u64 {
    10
}

/// Paginated query over one user's notifications
#[derive(Debug, Clone, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct UserNotificationsQuery {
    /// Recipient user
    #[validate(length(min = 1))]
    pub user_id: String,

    /// Number of records to skip
    #[serde(default)]
    pub skip: u64,

    /// Maximum number of records to return (1-100)
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u64,
}

impl UserNotificationsQuery {
    pub fn new(user_id: impl Into<String>, skip: u64, limit: u64) -> Self {
        Self {
            user_id: user_id.into(),
            skip,
            limit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    #[validate(length(min = 1))]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UnreadCount {
    pub user_id: String,
    pub unread_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MarkedAllRead {
    pub user_id: String,
    pub marked_as_read: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedNotification {
    pub message: String,
}

/// Broker acknowledgement for a published notification event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueuedNotification {
    pub stream_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationHealth {
    pub status: String,
    pub service: String,
}
