use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use strum::{AsRefStr, Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Delivery status of an email log.
///
/// A log is written once delivery has been attempted, so it leaves the
/// service as `sent` or `failed`; `pending` only exists for rows written by
/// other producers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmailStatus {
    #[default]
    Pending,
    Sent,
    Failed,
}

/// Append-only record of one delivery attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmailLog {
    pub id: Uuid,
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    /// Body as sent, after template rendering
    pub body: String,
    pub status: EmailStatus,
    pub error_message: Option<String>,
    /// Identifier returned by the mail transport
    pub message_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub event_type: Option<String>,
    pub related_user_id: Option<String>,
    pub related_project_id: Option<String>,
}

/// Request to send an email, from HTTP or from an `emails` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct SendEmailRequest {
    #[validate(email(message = "Invalid recipient address"))]
    pub to_email: String,

    #[validate(length(max = 255))]
    pub to_name: Option<String>,

    #[validate(length(min = 1, max = 998, message = "Subject must be 1-998 characters"))]
    pub subject: String,

    pub body: String,

    /// One of `welcome`, `project_invitation`, `task_assigned`
    pub template_name: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub template_data: Option<HashMap<String, Value>>,

    pub event_type: Option<String>,
    pub related_user_id: Option<String>,
    pub related_project_id: Option<String>,
}

impl SendEmailRequest {
    pub fn new(
        to_email: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to_email: to_email.into(),
            to_name: None,
            subject: subject.into(),
            body: body.into(),
            template_name: None,
            template_data: None,
            event_type: None,
            related_user_id: None,
            related_project_id: None,
        }
    }

    pub fn with_to_name(mut self, to_name: impl Into<String>) -> Self {
        self.to_name = Some(to_name.into());
        self
    }

    pub fn with_template(mut self, name: impl Into<String>, data: HashMap<String, Value>) -> Self {
        self.template_name = Some(name.into());
        self.template_data = Some(data);
        self
    }
}

/// Aggregate counts by status, recomputed on every call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmailStats {
    pub total_sent: u64,
    pub total_failed: u64,
    pub total_pending: u64,
}

impl EmailStats {
    pub fn total(&self) -> u64 {
        self.total_sent + self.total_failed + self.total_pending
    }

    pub fn record(&mut self, status: EmailStatus) {
        match status {
            EmailStatus::Sent => self.total_sent += 1,
            EmailStatus::Failed => self.total_failed += 1,
            EmailStatus::Pending => self.total_pending += 1,
        }
    }
}

fn default_limit() -> u64 {
    10
}

/// Offset pagination for email logs
#[derive(Debug, Clone, Copy, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Number of records to skip
    #[serde(default)]
    pub skip: u64,

    /// Maximum number of records to return (1-100)
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

/// Broker acknowledgement for a queued email
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueuedEmail {
    pub stream_id: String,
}

/// Static liveness payload of the email API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmailHealth {
    pub status: String,
    pub service: String,
}
