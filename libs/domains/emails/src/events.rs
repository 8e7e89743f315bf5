//! Event schema of the `emails` topic and the commands it maps to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use stream_worker::{Payload, StreamError};
use validator::Validate;

use crate::models::SendEmailRequest;

/// Event type stamped on emails queued through the HTTP API without one
pub const DEFAULT_EVENT_TYPE: &str = "email_requested";

/// Wire format of an `emails` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EmailEvent {
    #[validate(length(min = 1, message = "event_type must not be empty"))]
    pub event_type: String,

    #[validate(email(message = "Invalid recipient address"))]
    pub to_email: String,

    #[serde(default)]
    pub to_name: Option<String>,

    #[validate(length(min = 1, max = 998))]
    pub subject: String,

    pub body: String,

    #[serde(default)]
    pub template_name: Option<String>,

    #[serde(default)]
    pub template_data: Option<HashMap<String, Value>>,

    #[serde(deserialize_with = "stream_worker::deserialize_event_timestamp")]
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub related_user_id: Option<String>,

    #[serde(default)]
    pub related_project_id: Option<String>,
}

impl EmailEvent {
    /// Event for a request accepted over HTTP
    pub fn from_request(request: SendEmailRequest, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_type: request
                .event_type
                .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
            to_email: request.to_email,
            to_name: request.to_name,
            subject: request.subject,
            body: request.body,
            template_name: request.template_name,
            template_data: request.template_data,
            timestamp,
            related_user_id: request.related_user_id,
            related_project_id: request.related_project_id,
        }
    }
}

/// Commands the email processor executes
#[derive(Debug, Clone, PartialEq)]
pub enum EmailCommand {
    Send(SendEmailRequest),
}

impl TryFrom<&Payload> for EmailCommand {
    type Error = StreamError;

    fn try_from(payload: &Payload) -> Result<Self, Self::Error> {
        let event: EmailEvent = serde_json::from_value(Value::Object(payload.clone()))
            .map_err(|e| StreamError::validation(format!("invalid email event: {}", e)))?;
        event
            .validate()
            .map_err(|e| StreamError::validation(format!("invalid email event: {}", e)))?;

        Ok(EmailCommand::Send(SendEmailRequest {
            to_email: event.to_email,
            to_name: event.to_name,
            subject: event.subject,
            body: event.body,
            template_name: event.template_name,
            template_data: event.template_data,
            event_type: Some(event.event_type),
            related_user_id: event.related_user_id,
            related_project_id: event.related_project_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stream_worker::to_payload;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test payloads are objects"),
        }
    }

    #[test]
    fn test_valid_event_maps_to_send() {
        let event = payload(json!({
            "event_type": "project_invitation",
            "to_email": "ana@example.com",
            "to_name": "Ana",
            "subject": "Invitación",
            "body": "fallback",
            "template_name": "project_invitation",
            "template_data": {"user_name": "Ana"},
            "timestamp": "2025-03-01T10:00:00Z",
            "related_project_id": "p-1"
        }));

        let EmailCommand::Send(request) = EmailCommand::try_from(&event).unwrap();
        assert_eq!(request.to_email, "ana@example.com");
        assert_eq!(request.event_type.as_deref(), Some("project_invitation"));
        assert_eq!(request.related_project_id.as_deref(), Some("p-1"));
        assert_eq!(request.template_data.unwrap()["user_name"], "Ana");
    }

    #[test]
    fn test_missing_required_key_is_validation_error() {
        let event = payload(json!({
            "event_type": "welcome",
            "to_email": "ana@example.com",
            "body": "Hola",
            "timestamp": "2025-03-01T10:00:00Z"
        }));

        let err = EmailCommand::try_from(&event).unwrap_err();
        assert!(matches!(err, StreamError::Validation(_)));
        assert!(err.to_string().contains("subject"));
    }

    #[test]
    fn test_bad_address_and_timestamp_are_rejected() {
        let bad_address = payload(json!({
            "event_type": "welcome",
            "to_email": "ana",
            "subject": "Hola",
            "body": "Hola",
            "timestamp": "2025-03-01T10:00:00Z"
        }));
        assert!(EmailCommand::try_from(&bad_address).is_err());

        let bad_timestamp = payload(json!({
            "event_type": "welcome",
            "to_email": "ana@example.com",
            "subject": "Hola",
            "body": "Hola",
            "timestamp": "last tuesday"
        }));
        assert!(EmailCommand::try_from(&bad_timestamp).is_err());
    }

    #[test]
    fn test_queued_event_decodes_back() {
        let request = SendEmailRequest::new("leo@example.com", "Hola", "Body");
        let event = EmailEvent::from_request(request.clone(), Utc::now());
        assert_eq!(event.event_type, DEFAULT_EVENT_TYPE);

        let payload = to_payload(&event).unwrap();
        let EmailCommand::Send(decoded) = EmailCommand::try_from(&payload).unwrap();
        assert_eq!(decoded.to_email, request.to_email);
        assert_eq!(decoded.event_type.as_deref(), Some(DEFAULT_EVENT_TYPE));
    }
}
