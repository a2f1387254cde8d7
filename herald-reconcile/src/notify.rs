//! Push payloads and best-effort delivery.
//!
//! Every message is data-only. Publish, ping and refresh also ask APNs for
//! priority 5; clear, prune and the publish-event wake-up leave it unset.
//! Clients key off these fields:
//!
//! | message      | data                                                   |
//! |--------------|--------------------------------------------------------|
//! | publish      | `newAnnouncement`, `announcement_version`, `ann_fp`, `ann_count` |
//! | clear        | `clear`, `ann_fp`                                      |
//! | prune        | `ann_fp`                                               |
//! | ping         | `newAnnouncement`, `announcement_version`              |
//! | refresh      | `updatePrayerTimes`, `year`                            |

use herald_core::{Mode, PushMessage, PushTransport};

use crate::policy::ReconciliationResult;

/// APNs priority for background pushes that should arrive promptly.
const APNS_BACKGROUND_PRIORITY: u8 = 5;

/// What happened to the post-publish push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Not requested, or no transport configured.
    Skipped,
    Sent { message_id: String },
    /// Delivery failed. The template is already published.
    Failed { error: String },
}

/// Message announcing the result of a reconciliation.
pub fn reconcile_message(topic: &str, result: &ReconciliationResult) -> PushMessage {
    let message = PushMessage::new(topic).with("ann_fp", &result.fingerprint);
    match result.mode {
        Mode::Publish => message
            .with_apns_priority(APNS_BACKGROUND_PRIORITY)
            .with("newAnnouncement", "true")
            .with("announcement_version", &result.version_tag)
            .with("ann_count", result.item_count.to_string()),
        Mode::Clear(_) => message.with("clear", "true"),
        Mode::Prune => message,
    }
}

/// Manual "check for announcements" wake-up.
pub fn ping_message(topic: &str, version: &str) -> PushMessage {
    PushMessage::new(topic)
        .with_apns_priority(APNS_BACKGROUND_PRIORITY)
        .with("newAnnouncement", "true")
        .with("announcement_version", version)
}

/// Ask clients to refetch the prayer schedule for `year`.
pub fn refresh_message(topic: &str, year: i32) -> PushMessage {
    PushMessage::new(topic)
        .with_apns_priority(APNS_BACKGROUND_PRIORITY)
        .with("updatePrayerTimes", "true")
        .with("year", year.to_string())
}

/// Bare wake-up sent when a template publish is observed.
pub fn publish_event_message(topic: &str) -> PushMessage {
    PushMessage::new(topic).with("newAnnouncement", "true")
}

/// Send `message`, turning failure into a warning.
pub fn send_best_effort(transport: &dyn PushTransport, message: &PushMessage) -> NotifyOutcome {
    match transport.send(message) {
        Ok(message_id) => {
            tracing::info!("notified topic '{}' ({message_id})", message.topic);
            NotifyOutcome::Sent { message_id }
        }
        Err(err) => {
            tracing::warn!("{err}; template changes stay published");
            NotifyOutcome::Failed {
                error: err.to_string(),
            }
        }
    }
}
