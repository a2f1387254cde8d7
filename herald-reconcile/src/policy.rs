//! Reconciliation Policy: publish, clear and prune-and-lock.
//!
//! Each mode is a pure function of (current template, plan) producing a
//! [`ReconciliationResult`]: the keys to delete and the keys to write.
//! Nothing here touches a store; applying the result is the caller's job
//! (see [`crate::pipeline`]).
//!
//! ## Legacy mirror
//!
//! Clients older than the list format only read the four singular keys
//! (`announcement_active/title/text/published_at`). Publish fills them only
//! when the list has exactly one item; otherwise the card is switched off
//! and blanked so an old client never shows one item out of several.

use std::collections::{BTreeMap, BTreeSet};

use herald_core::{AnnouncementItem, ClearVariant, Mode, NamespacePrefix, Template};

use crate::fingerprint::{canonical_json, compute_fingerprint};
use crate::matcher::KeyMatcher;
use crate::stamp::clear_tag;

/// Template key names.
pub mod keys {
    pub const ANNOUNCEMENTS_JSON: &str = "announcements_json";
    pub const ANNOUNCEMENTS_VERSION: &str = "announcements_version";
    pub const ANN_FP: &str = "ann_fp";
    pub const ACTIVE: &str = "announcement_active";
    pub const TITLE: &str = "announcement_title";
    pub const TEXT: &str = "announcement_text";
    pub const PUBLISHED_AT: &str = "announcement_published_at";

    /// The only keys prune-and-lock leaves behind.
    pub const LOCKED: [&str; 5] = [ACTIVE, TITLE, TEXT, PUBLISHED_AT, ANN_FP];
}

/// Title shown by the placeholder card.
pub const PLACEHOLDER_TITLE: &str = "No new announcements to display";

// ---------------------------------------------------------------------------
// Plan and result
// ---------------------------------------------------------------------------

/// Everything a reconciliation needs besides the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub mode: Mode,
    /// Desired items. Only publish reads them.
    pub items: Vec<AnnouncementItem>,
    /// Parallel namespace. `None` disables the prefixed space. Prune ignores it.
    pub prefix: Option<NamespacePrefix>,
    /// Current stamp, computed once per invocation.
    pub stamp: String,
}

impl Plan {
    pub fn publish(items: Vec<AnnouncementItem>, prefix: Option<NamespacePrefix>, stamp: String) -> Self {
        Self {
            mode: Mode::Publish,
            items,
            prefix,
            stamp,
        }
    }

    pub fn clear(variant: ClearVariant, prefix: Option<NamespacePrefix>, stamp: String) -> Self {
        Self {
            mode: Mode::Clear(variant),
            items: Vec::new(),
            prefix,
            stamp,
        }
    }

    pub fn prune(stamp: String) -> Self {
        Self {
            mode: Mode::Prune,
            items: Vec::new(),
            prefix: None,
            stamp,
        }
    }

    /// Matcher used to select (and, outside publish, delete) keys.
    pub fn matcher(&self) -> KeyMatcher {
        match self.mode {
            Mode::Publish | Mode::Clear(_) => KeyMatcher::standard(self.prefix.clone()),
            Mode::Prune => KeyMatcher::prune(),
        }
    }
}

/// Outcome of a reconciliation, ready to render or apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub mode: Mode,
    /// Existing keys the mode's matcher selected, sorted.
    pub matched: Vec<String>,
    /// Existing keys that survive the deletions, sorted.
    pub kept: Vec<String>,
    pub deletions: BTreeSet<String>,
    pub writes: BTreeMap<String, String>,
    pub removed_count: usize,
    pub fingerprint: String,
    pub version_tag: String,
    /// Number of published items (publish only).
    pub item_count: usize,
}

impl ReconciliationResult {
    /// Apply deletions, then writes, to `template`.
    pub fn apply_to(&self, template: &mut Template) {
        template.apply(&self.deletions, &self.writes);
    }

    /// Existing keys that are both deleted and rewritten.
    pub fn overwritten(&self) -> Vec<&str> {
        self.deletions
            .iter()
            .filter(|k| self.writes.contains_key(*k))
            .map(String::as_str)
            .collect()
    }
}

/// Dispatch on `plan.mode`.
pub fn reconcile(template: &Template, plan: &Plan) -> ReconciliationResult {
    match plan.mode {
        Mode::Publish => publish(template, &plan.items, plan.prefix.as_ref(), &plan.stamp),
        Mode::Clear(variant) => clear(template, variant, plan.prefix.as_ref(), &plan.stamp),
        Mode::Prune => prune(template, &plan.stamp),
    }
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

/// Write the list, its version and fingerprint, and the legacy mirror.
///
/// Items are ordered newest-first by `published_at` (stable, so equal
/// timestamps keep input order). No keys are deleted.
pub fn publish(
    template: &Template,
    items: &[AnnouncementItem],
    prefix: Option<&NamespacePrefix>,
    stamp: &str,
) -> ReconciliationResult {
    let mut ordered = items.to_vec();
    ordered.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let version = ordered
        .first()
        .map(|item| item.published_at.as_str())
        .filter(|v| !v.is_empty())
        .unwrap_or(stamp)
        .to_string();
    let fingerprint = compute_fingerprint(&ordered);
    let payload = canonical_json(&ordered);

    let (active, title, text, published_at) = match ordered.as_slice() {
        [only] => ("true", only.title.as_str(), only.text.as_str(), only.published_at.as_str()),
        _ => ("false", "", "", ""),
    };

    let mut writes = BTreeMap::new();
    for space in spaces(prefix) {
        put(&mut writes, space, keys::ANNOUNCEMENTS_JSON, &payload);
        put(&mut writes, space, keys::ANNOUNCEMENTS_VERSION, &version);
        put(&mut writes, space, keys::ANN_FP, &fingerprint);
        put(&mut writes, space, keys::ACTIVE, active);
        put(&mut writes, space, keys::TITLE, title);
        put(&mut writes, space, keys::TEXT, text);
        put(&mut writes, space, keys::PUBLISHED_AT, published_at);
    }

    let matched = KeyMatcher::standard(prefix.cloned()).matching(template.keys());
    tracing::debug!(
        "publish: {} item(s), version={version}, fp={fingerprint}",
        ordered.len()
    );

    ReconciliationResult {
        mode: Mode::Publish,
        matched,
        kept: template.keys().map(str::to_string).collect(),
        deletions: BTreeSet::new(),
        writes,
        removed_count: 0,
        fingerprint,
        version_tag: version,
        item_count: ordered.len(),
    }
}

// ---------------------------------------------------------------------------
// Clear
// ---------------------------------------------------------------------------

/// Delete every announcement key (prefixed space included when enabled) and
/// publish an empty list with a placeholder or blank card.
pub fn clear(
    template: &Template,
    variant: ClearVariant,
    prefix: Option<&NamespacePrefix>,
    stamp: &str,
) -> ReconciliationResult {
    let matched = KeyMatcher::standard(prefix.cloned()).matching(template.keys());
    let deletions: BTreeSet<String> = matched.iter().cloned().collect();
    let tag = clear_tag(stamp);

    let (active, title) = match variant {
        ClearVariant::Placeholder => ("true", PLACEHOLDER_TITLE),
        ClearVariant::Blank => ("false", ""),
    };

    let mut writes = BTreeMap::new();
    for space in spaces(prefix) {
        put(&mut writes, space, keys::ANNOUNCEMENTS_JSON, "[]");
        put(&mut writes, space, keys::ANNOUNCEMENTS_VERSION, &tag);
        put(&mut writes, space, keys::ANN_FP, &tag);
        put(&mut writes, space, keys::ACTIVE, active);
        put(&mut writes, space, keys::TITLE, title);
        put(&mut writes, space, keys::TEXT, "");
        put(&mut writes, space, keys::PUBLISHED_AT, stamp);
    }

    finish(template, Mode::Clear(variant), matched, deletions, writes, tag.clone(), tag)
}

// ---------------------------------------------------------------------------
// Prune-and-lock
// ---------------------------------------------------------------------------

/// Collapse every announcement key in every namespace down to the five
/// locked keys, keeping their current values where non-empty.
pub fn prune(template: &Template, stamp: &str) -> ReconciliationResult {
    let matched = KeyMatcher::prune().matching(template.keys());
    let deletions: BTreeSet<String> = matched
        .iter()
        .filter(|k| !keys::LOCKED.contains(&k.as_str()))
        .cloned()
        .collect();

    // Read before anything is deleted.
    let current = |key: &str, default: String| -> String {
        template
            .value(key)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or(default)
    };
    let fp = current(keys::ANN_FP, clear_tag(stamp));

    let mut writes = BTreeMap::new();
    writes.insert(keys::ACTIVE.to_string(), current(keys::ACTIVE, "true".into()));
    writes.insert(
        keys::TITLE.to_string(),
        current(keys::TITLE, PLACEHOLDER_TITLE.into()),
    );
    writes.insert(keys::TEXT.to_string(), current(keys::TEXT, String::new()));
    writes.insert(
        keys::PUBLISHED_AT.to_string(),
        current(keys::PUBLISHED_AT, stamp.into()),
    );
    writes.insert(keys::ANN_FP.to_string(), fp.clone());

    finish(template, Mode::Prune, matched, deletions, writes, fp.clone(), fp)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Unprefixed space first, then the prefixed one when enabled.
fn spaces(prefix: Option<&NamespacePrefix>) -> Vec<Option<&NamespacePrefix>> {
    let mut out = vec![None];
    if let Some(p) = prefix {
        out.push(Some(p));
    }
    out
}

fn put(
    writes: &mut BTreeMap<String, String>,
    space: Option<&NamespacePrefix>,
    key: &str,
    value: &str,
) {
    let name = match space {
        Some(p) => p.apply(key),
        None => key.to_string(),
    };
    writes.insert(name, value.to_string());
}

fn finish(
    template: &Template,
    mode: Mode,
    matched: Vec<String>,
    deletions: BTreeSet<String>,
    writes: BTreeMap<String, String>,
    fingerprint: String,
    version_tag: String,
) -> ReconciliationResult {
    let kept = template
        .keys()
        .filter(|k| !deletions.contains(*k))
        .map(str::to_string)
        .collect();
    tracing::debug!(
        "{mode}: {} matched, {} deleted, {} written",
        matched.len(),
        deletions.len(),
        writes.len()
    );
    ReconciliationResult {
        mode,
        matched,
        kept,
        removed_count: deletions.len(),
        deletions,
        writes,
        fingerprint,
        version_tag,
        item_count: 0,
    }
}
