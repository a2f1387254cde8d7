//! Content fingerprint for announcement lists.
//!
//! SHA-256 over the canonical `announcements_json` serialization, hex
//! encoded and cut to [`FINGERPRINT_LEN`] characters. Clients compare it to
//! their cached value to decide whether to refetch.

use sha2::{Digest, Sha256};

use herald_core::AnnouncementItem;

pub const FINGERPRINT_LEN: usize = 12;

/// Canonical JSON for a list: compact, fields in `id`, `title`, `text`,
/// `published_at` order. This is also the exact `announcements_json` payload.
pub fn canonical_json(items: &[AnnouncementItem]) -> String {
    // Plain string fields; serialization cannot fail.
    serde_json::to_string(items).unwrap_or_default()
}

pub fn compute_fingerprint(items: &[AnnouncementItem]) -> String {
    let mut h = Sha256::new();
    h.update(canonical_json(items).as_bytes());
    let mut digest = hex::encode(h.finalize());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<AnnouncementItem> {
        vec![
            AnnouncementItem::new("eid", "Eid Mubarak", "Salah at 8:30 AM", "2026-03-20T08:00:00-0500"),
            AnnouncementItem::new("item-1", "Parking", "Use the north lot", "2026-03-18T12:00:00-0500"),
        ]
    }

    #[test]
    fn canonical_json_has_all_fields_in_order() {
        let json = canonical_json(&items()[..1]);
        assert_eq!(
            json,
            r#"[{"id":"eid","title":"Eid Mubarak","text":"Salah at 8:30 AM","published_at":"2026-03-20T08:00:00-0500"}]"#
        );
        assert_eq!(canonical_json(&[]), "[]");
    }

    #[test]
    fn fingerprint_is_twelve_hex_chars_and_deterministic() {
        let a = compute_fingerprint(&items());
        let b = compute_fingerprint(&items());
        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn every_field_change_moves_the_fingerprint() {
        let base = compute_fingerprint(&items());
        let edits: [fn(&mut AnnouncementItem); 4] = [
            |i| i.id.push('x'),
            |i| i.title.push('x'),
            |i| i.text.push('x'),
            |i| i.published_at.push('x'),
        ];
        for edit in edits {
            let mut changed = items();
            edit(&mut changed[1]);
            assert_ne!(compute_fingerprint(&changed), base);
        }
    }

    #[test]
    fn order_matters() {
        let mut reversed = items();
        reversed.reverse();
        assert_ne!(compute_fingerprint(&reversed), compute_fingerprint(&items()));
    }
}
