//! Domain types shared by the reconciler, the adapters and the CLI.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

// ---------------------------------------------------------------------------
// Announcement items
// ---------------------------------------------------------------------------

/// A single announcement as published in `announcements_json`.
///
/// All four fields are always serialized; missing input fields are defaulted
/// by [`crate::input`] before an item is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnouncementItem {
    pub id: String,
    pub title: String,
    pub text: String,
    pub published_at: String,
}

impl AnnouncementItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        published_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            published_at: published_at.into(),
        }
    }

    /// Positional placeholder used when an input entry carries no `id`.
    pub fn positional_id(index: usize) -> String {
        format!("item-{index}")
    }
}

// ---------------------------------------------------------------------------
// Namespace prefix
// ---------------------------------------------------------------------------

/// Literal prepended to announcement keys to form a parallel key space
/// (e.g. `ABC_announcement_title`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespacePrefix(String);

impl NamespacePrefix {
    /// Parse a prefix. Remote Config keys only allow ASCII letters, digits and
    /// underscores, so anything else is rejected up front.
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::InvalidPrefix {
                prefix: raw.to_string(),
                reason: "prefix is empty".to_string(),
            });
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(InputError::InvalidPrefix {
                prefix: raw.to_string(),
                reason: format!("character '{bad}' is not allowed in a parameter key"),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<prefix><key>`
    pub fn apply(&self, key: &str) -> String {
        format!("{}{key}", self.0)
    }

    /// Strip the prefix from `name`, comparing ASCII case-insensitively.
    pub fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        let head = name.get(..self.0.len())?;
        if head.eq_ignore_ascii_case(&self.0) {
            name.get(self.0.len()..)
        } else {
            None
        }
    }
}

impl fmt::Display for NamespacePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for NamespacePrefix {
    type Error = InputError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<NamespacePrefix> for String {
    fn from(p: NamespacePrefix) -> Self {
        p.0
    }
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// What a clear leaves behind in the legacy singular card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearVariant {
    /// `active=true` with the "No new announcements to display" title.
    #[default]
    Placeholder,
    /// `active=false` with empty title and text.
    Blank,
}

impl fmt::Display for ClearVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearVariant::Placeholder => write!(f, "placeholder"),
            ClearVariant::Blank => write!(f, "blank"),
        }
    }
}

/// Reconciliation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Publish,
    Clear(ClearVariant),
    Prune,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Publish => write!(f, "publish"),
            Mode::Clear(variant) => write!(f, "clear ({variant})"),
            Mode::Prune => write!(f, "prune"),
        }
    }
}

// ---------------------------------------------------------------------------
// Collaborator payloads
// ---------------------------------------------------------------------------

/// Result of a successful template publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub version_number: String,
}

/// Data-only push message addressed to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub topic: String,
    pub data: BTreeMap<String, String>,
    /// `apns-priority` header. Unset leaves the APNs default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apns_priority: Option<u8>,
}

impl PushMessage {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            data: BTreeMap::new(),
            apns_priority: None,
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_apns_priority(mut self, priority: u8) -> Self {
        self.apns_priority = Some(priority);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_rejects_non_key_characters() {
        assert!(NamespacePrefix::parse("ABC_").is_ok());
        assert!(NamespacePrefix::parse("").is_err());
        let err = NamespacePrefix::parse("AB-C").unwrap_err();
        assert!(err.to_string().contains("'-'"), "got: {err}");
    }

    #[test]
    fn prefix_strip_is_case_insensitive() {
        let p = NamespacePrefix::parse("ABC_").unwrap();
        assert_eq!(p.strip("abc_ann_fp"), Some("ann_fp"));
        assert_eq!(p.strip("ABC_announcement_title"), Some("announcement_title"));
        assert_eq!(p.strip("XYZ_ann_fp"), None);
        assert_eq!(p.strip("AB"), None);
    }

    #[test]
    fn prefix_strip_handles_multibyte_names() {
        let p = NamespacePrefix::parse("AB").unwrap();
        assert_eq!(p.strip("é_ann_fp"), None);
    }

    #[test]
    fn mode_display_names_variant() {
        assert_eq!(Mode::Clear(ClearVariant::Blank).to_string(), "clear (blank)");
        assert_eq!(Mode::Prune.to_string(), "prune");
    }

    #[test]
    fn push_message_builder_collects_data() {
        let msg = PushMessage::new("allUsers").with("ann_fp", "abc").with("clear", "true");
        assert_eq!(msg.topic, "allUsers");
        assert_eq!(msg.data.get("clear").map(String::as_str), Some("true"));
        assert_eq!(msg.apns_priority, None);
        assert_eq!(msg.with_apns_priority(5).apns_priority, Some(5));
    }
}
