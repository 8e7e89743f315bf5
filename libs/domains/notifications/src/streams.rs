//! Stream definition for the `notifications` topic.

use stream_worker::StreamDef;

/// Notification events consumed by the notifications service
pub struct NotificationStream;

impl StreamDef for NotificationStream {
    const STREAM_NAME: &'static str = "notifications";
    const CONSUMER_GROUP: &'static str = "notifications-service-group";
}
