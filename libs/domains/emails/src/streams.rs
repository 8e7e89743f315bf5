//! Stream definition for the `emails` topic.

use stream_worker::StreamDef;

/// Email requests consumed by the email service
pub struct EmailStream;

impl StreamDef for EmailStream {
    const STREAM_NAME: &'static str = "emails";
    const CONSUMER_GROUP: &'static str = "email-service-group";
}
