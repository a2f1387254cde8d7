//! FCM HTTP v1 push transport.
//!
//! Messages are data-only and topic-addressed. Android gets `high` priority;
//! APNs gets background-push headers so iOS wakes the app silently, plus an
//! `apns-priority` header when the message carries one.

use serde_json::{json, Value};

use herald_core::{NotifyError, PushMessage, PushTransport};

use crate::client::CloudClient;
use crate::error::from_ureq;

#[derive(Debug, Clone)]
pub struct MessagingTransport {
    client: CloudClient,
}

impl MessagingTransport {
    pub fn new(client: CloudClient) -> Self {
        Self { client }
    }
}

/// `messages:send` request body for `message`.
pub fn send_body(message: &PushMessage) -> Value {
    let mut headers = json!({ "apns-push-type": "background" });
    if let Some(priority) = message.apns_priority {
        headers["apns-priority"] = Value::String(priority.to_string());
    }
    json!({
        "message": {
            "topic": message.topic,
            "data": message.data,
            "android": { "priority": "high" },
            "apns": {
                "headers": headers,
                "payload": { "aps": { "content-available": 1 } }
            }
        }
    })
}

impl PushTransport for MessagingTransport {
    fn send(&self, message: &PushMessage) -> Result<String, NotifyError> {
        let url = self.client.messaging_url();
        let fail = |message_text: String| NotifyError {
            topic: message.topic.clone(),
            message: message_text,
        };

        tracing::debug!(topic = %message.topic, keys = message.data.len(), "sending FCM message");
        let response = self
            .client
            .request("POST", &url)
            .send_json(send_body(message))
            .map_err(|e| fail(from_ureq("POST", &url, e).to_string()))?;
        let body: Value = response
            .into_json()
            .map_err(|e| fail(format!("unreadable FCM response: {e}")))?;
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| fail(format!("FCM response has no message name: {body}")))?;

        tracing::info!(topic = %message.topic, message_id = %name, "push sent");
        Ok(name.to_string())
    }
}
