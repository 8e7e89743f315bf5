//! Event schema of the `notifications` topic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stream_worker::{Payload, StreamError};
use validator::Validate;

use crate::models::CreateNotification;

/// Event type stamped on notifications published through the HTTP API
pub const DEFAULT_EVENT_TYPE: &str = "notification_requested";

/// Wire format of a `notifications` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NotificationEvent {
    #[validate(length(min = 1))]
    pub event_type: String,

    #[validate(length(min = 1, max = 64))]
    pub user_id: String,

    #[validate(length(min = 1, max = 50))]
    pub notification_type: String,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub message: String,

    #[serde(deserialize_with = "stream_worker::deserialize_event_timestamp")]
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub related_project_id: Option<String>,
    #[serde(default)]
    pub related_user_id: Option<String>,
    #[serde(default)]
    pub related_task_id: Option<String>,
}

impl NotificationEvent {
    pub fn from_request(input: CreateNotification, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            user_id: input.user_id,
            notification_type: input.notification_type,
            title: input.title,
            message: input.message,
            timestamp,
            related_project_id: input.related_project_id,
            related_user_id: input.related_user_id,
            related_task_id: input.related_task_id,
        }
    }
}

/// Commands the notification processor executes
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationCommand {
    Create(CreateNotification),
}

impl TryFrom<&Payload> for NotificationCommand {
    type Error = StreamError;

    fn try_from(payload: &Payload) -> Result<Self, Self::Error> {
        let event: NotificationEvent = serde_json::from_value(Value::Object(payload.clone()))
            .map_err(|e| StreamError::validation(format!("invalid notification event: {}", e)))?;
        event
            .validate()
            .map_err(|e| StreamError::validation(format!("invalid notification event: {}", e)))?;

        Ok(NotificationCommand::Create(CreateNotification {
            user_id: event.user_id,
            notification_type: event.notification_type,
            title: event.title,
            message: event.message,
            related_project_id: event.related_project_id,
            related_user_id: event.related_user_id,
            related_task_id: event.related_task_id,
        }))
    }
}
