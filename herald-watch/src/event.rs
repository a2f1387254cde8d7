//! Remote Config publish events.
//!
//! A publish event is `{"versionNumber": "18", "updateType": "INCREMENTAL_UPDATE", ...}`
//! as delivered by the Remote Config update trigger. Extra fields are ignored;
//! `versionNumber` may be a string or a number.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use herald_core::{NotifyError, PushTransport};
use herald_reconcile::notify::publish_event_message;

use crate::error::WatchError;

/// `updateType` used when the watcher, not a trigger, saw the change.
pub const OBSERVED_UPDATE: &str = "OBSERVED_UPDATE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishEvent {
    pub version_number: String,
    pub update_type: String,
}

impl PublishEvent {
    pub fn observed(version_number: impl Into<String>) -> Self {
        Self {
            version_number: version_number.into(),
            update_type: OBSERVED_UPDATE.to_string(),
        }
    }

    /// Parse an event body, tolerating numeric versions and missing fields.
    pub fn from_json(raw: &str) -> Result<Self, WatchError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| WatchError::Event(e.to_string()))?;
        let Some(obj) = value.as_object() else {
            return Err(WatchError::Event("event must be a JSON object".to_string()));
        };
        let text = |key: &str| match obj.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        Ok(Self {
            version_number: text("versionNumber"),
            update_type: text("updateType"),
        })
    }
}

/// Wake clients after a template publish. Returns the push message id.
///
/// Failure is returned to the caller; a trigger runtime retries on error.
pub fn handle_publish_event(
    event: &PublishEvent,
    transport: &dyn PushTransport,
    topic: &str,
) -> Result<String, NotifyError> {
    match transport.send(&publish_event_message(topic)) {
        Ok(message_id) => {
            tracing::info!(
                message_id = %message_id,
                update_type = %event.update_type,
                version = %event.version_number,
                "sent new-announcement push"
            );
            Ok(message_id)
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                version = %event.version_number,
                "failed to send new-announcement push"
            );
            Err(err)
        }
    }
}
