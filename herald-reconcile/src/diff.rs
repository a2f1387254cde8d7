//! Unified diff of the keys a reconciliation touches, for `--diff`.

use std::collections::BTreeSet;

use similar::TextDiff;

use herald_core::Template;

use crate::policy::ReconciliationResult;

/// Diff `before` against `before` with `result` applied.
///
/// Only keys that are deleted or written appear; untouched parameters stay
/// out of the output. Returns an empty string when nothing changes.
pub fn template_diff(before: &Template, result: &ReconciliationResult) -> String {
    let mut after = before.clone();
    result.apply_to(&mut after);

    let touched: BTreeSet<&str> = result
        .deletions
        .iter()
        .chain(result.writes.keys())
        .map(String::as_str)
        .collect();

    let old = render_keys(before, &touched);
    let new = render_keys(&after, &touched);
    if old == new {
        return String::new();
    }

    TextDiff::from_lines(&old, &new)
        .unified_diff()
        .header("a/template", "b/template")
        .context_radius(1)
        .to_string()
}

fn render_keys(template: &Template, keys: &BTreeSet<&str>) -> String {
    let mut out = String::new();
    for key in keys {
        if !template.contains(key) {
            continue;
        }
        match template.value(key) {
            Some(value) => out.push_str(&format!("{key} = {value:?}\n")),
            None => out.push_str(&format!("{key} (no string default)\n")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{clear, prune};
    use herald_core::ClearVariant;

    const STAMP: &str = "2026-01-15T14:35:59-06:00";

    #[test]
    fn prune_diff_shows_removed_and_rewritten_keys() {
        let before = Template::from_values([
            ("announcement_title", "Old"),
            ("XYZ_announcement_text", "stale"),
            ("foo_bar", "keep"),
        ]);
        let r = prune(&before, STAMP);
        let diff = template_diff(&before, &r);

        assert!(diff.contains("--- a/template"));
        assert!(diff.contains("+++ b/template"));
        assert!(diff.contains("-XYZ_announcement_text = \"stale\""));
        assert!(diff.contains("+ann_fp = \"clear-2026-01-15T14:35:59-06:00\""));
        assert!(!diff.contains("foo_bar"));
    }

    #[test]
    fn no_changes_means_empty_diff() {
        let before = Template::default();
        let r = clear(&before, ClearVariant::Blank, None, STAMP);
        let mut after = before.clone();
        r.apply_to(&mut after);

        let again = clear(&after, ClearVariant::Blank, None, STAMP);
        assert_eq!(template_diff(&after, &again), "");
    }
}
