//! Plain-text reports of what a reconciliation did (or would do).
//!
//! Output is deterministic: keys appear in sorted order and long values are
//! shortened the same way every time.

use std::fmt::Write as _;

use herald_core::Mode;

use crate::policy::ReconciliationResult;

/// Values longer than this are cut and suffixed with `...`.
const MAX_VALUE_CHARS: usize = 96;

/// Full report: matched keys, deletions, keys left in place, writes, and the
/// resulting fingerprint/version.
pub fn render(result: &ReconciliationResult, matched_before: &[String]) -> String {
    let tag = format!("[{}]", result.mode);
    let mut out = String::new();

    let _ = writeln!(out, "{tag} matched {} key(s){}", matched_before.len(), list(matched_before));
    let deletions: Vec<String> = result.deletions.iter().cloned().collect();
    let _ = writeln!(out, "{tag} deleting {} key(s){}", result.removed_count, list(&deletions));

    let kept_matched: Vec<String> = matched_before
        .iter()
        .filter(|k| !result.deletions.contains(*k))
        .cloned()
        .collect();
    if !kept_matched.is_empty() {
        let _ = writeln!(out, "{tag} keeping {} matched key(s){}", kept_matched.len(), list(&kept_matched));
    }

    let _ = writeln!(out, "{tag} writing {} key(s):", result.writes.len());
    for (key, value) in &result.writes {
        let _ = writeln!(out, "  {key} = {:?}", shorten(value));
    }

    if result.mode == Mode::Publish {
        let _ = writeln!(out, "{tag} items: {}", result.item_count);
    }
    let _ = writeln!(
        out,
        "{tag} fingerprint={} version={}",
        result.fingerprint, result.version_tag
    );
    out
}

/// Report for `--list-only`: the matched keys and the template size.
pub fn render_listing(mode: Mode, matched: &[String], total: usize) -> String {
    let mut out = format!("[{mode}] {} of {total} key(s) match\n", matched.len());
    for key in matched {
        let _ = writeln!(out, "  {key}");
    }
    out
}

fn list(keys: &[String]) -> String {
    if keys.is_empty() {
        String::new()
    } else {
        format!(": {}", keys.join(", "))
    }
}

fn shorten(value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_CHARS {
        return value.to_string();
    }
    let cut: String = value.chars().take(MAX_VALUE_CHARS - 3).collect();
    format!("{cut}...")
}
