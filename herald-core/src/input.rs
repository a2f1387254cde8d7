//! Announcement list loading.
//!
//! Input comes either from a JSON file (an array of loosely-typed objects) or
//! from single-item flags. Both paths produce fully-populated
//! [`AnnouncementItem`]s: every field present, `id` defaulted positionally.

use std::path::Path;

use serde_json::Value;

use crate::error::{input_io_err, InputError};
use crate::types::AnnouncementItem;

/// Id given to an item assembled from single-item flags without `--id`.
pub const SINGLE_ITEM_ID: &str = "single-item";

/// Single-item fields as collected from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingleItemFields {
    pub id: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub published_at: Option<String>,
}

impl SingleItemFields {
    fn is_empty(&self) -> bool {
        [&self.title, &self.text, &self.published_at]
            .iter()
            .all(|f| f.as_deref().unwrap_or_default().is_empty())
    }
}

/// Load and normalize announcements from a JSON file.
pub fn load_items_from_file(path: &Path) -> Result<Vec<AnnouncementItem>, InputError> {
    let raw = std::fs::read_to_string(path).map_err(|e| input_io_err(path, e))?;
    let value: Value = serde_json::from_str(&raw).map_err(|e| InputError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let Value::Array(entries) = value else {
        return Err(InputError::NotAnArray {
            path: path.to_path_buf(),
        });
    };
    Ok(normalize_entries(&entries))
}

/// Normalize already-parsed entries. Non-object entries behave like `{}`.
pub fn normalize_entries(entries: &[Value]) -> Vec<AnnouncementItem> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| AnnouncementItem {
            id: field(entry, "id").unwrap_or_else(|| AnnouncementItem::positional_id(index)),
            title: field(entry, "title").unwrap_or_default(),
            text: field(entry, "text").unwrap_or_default(),
            published_at: field(entry, "published_at").unwrap_or_default(),
        })
        .collect()
}

/// Build the one-element list for a single-item publish.
///
/// At least one of title, text or published_at must be non-empty.
pub fn single_item(fields: SingleItemFields) -> Result<Vec<AnnouncementItem>, InputError> {
    if fields.is_empty() {
        return Err(InputError::MissingItems);
    }
    Ok(vec![AnnouncementItem {
        id: fields
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| SINGLE_ITEM_ID.to_string()),
        title: fields.title.unwrap_or_default(),
        text: fields.text.unwrap_or_default(),
        published_at: fields.published_at.unwrap_or_default(),
    }])
}

/// Stringify a scalar field; missing, null, empty and structured values read
/// as absent.
fn field(entry: &Value, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_default_and_ids_are_positional() {
        let entries = vec![
            json!({"title": "Eid Mubarak", "published_at": "2026-03-20T08:00:00-0500"}),
            json!({"id": "jumuah", "text": "Khutbah at 1:30"}),
            json!("not an object"),
        ];
        let items = normalize_entries(&entries);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, "item-0");
        assert_eq!(items[0].text, "");
        assert_eq!(items[1].id, "jumuah");
        assert_eq!(items[1].published_at, "");
        assert_eq!(items[2], AnnouncementItem::new("item-2", "", "", ""));
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let items = normalize_entries(&[json!({"id": 7, "title": "x"})]);
        assert_eq!(items[0].id, "7");
    }

    #[test]
    fn single_item_requires_some_content() {
        let err = single_item(SingleItemFields::default()).unwrap_err();
        assert!(matches!(err, InputError::MissingItems));

        let items = single_item(SingleItemFields {
            title: Some("Eid Mubarak".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(items[0].id, SINGLE_ITEM_ID);
        assert_eq!(items[0].title, "Eid Mubarak");
    }
}
