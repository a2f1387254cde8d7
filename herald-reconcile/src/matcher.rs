//! Key Matcher: classifies template keys as announcement-related.
//!
//! - [`KeyMatcher::Standard`]: the unprefixed space plus, optionally, one
//!   configured namespace prefix. Used by publish and clear.
//! - [`KeyMatcher::Prune`]: the unprefixed space plus *any* `<x>_` prefix,
//!   to sweep legacy namespaces. Prune-and-lock only; publish and clear must
//!   never see it.
//!
//! All matching is ASCII case-insensitive.

use once_cell::sync::Lazy;
use regex::Regex;

use herald_core::NamespacePrefix;

/// Suffix patterns shared by every key space. The prefixed space is these
/// same patterns behind a literal prefix.
const SUFFIX_PATTERNS: &str = r"announcement_|announcements_|ann_fp$|announcements_version$";

static UNPREFIXED: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("(?i)^(?:{SUFFIX_PATTERNS})")).unwrap());

static ANY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^.*_(?:announcement_|announcements_|ann_fp$)").unwrap());

/// Matcher variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMatcher {
    Standard { prefix: Option<NamespacePrefix> },
    Prune,
}

impl KeyMatcher {
    pub fn standard(prefix: Option<NamespacePrefix>) -> Self {
        KeyMatcher::Standard { prefix }
    }

    pub fn prune() -> Self {
        KeyMatcher::Prune
    }

    pub fn is_match(&self, name: &str) -> bool {
        match self {
            KeyMatcher::Standard { prefix } => is_announcement_key(name, prefix.as_ref()),
            KeyMatcher::Prune => UNPREFIXED.is_match(name) || ANY_PREFIX.is_match(name),
        }
    }

    /// Matching keys from `names`, in iteration order.
    pub fn matching<'a, I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter(|n| self.is_match(n))
            .map(str::to_string)
            .collect()
    }
}

/// `true` when `name` is in the unprefixed announcement space, or in the
/// `prefix` space when one is given.
pub fn is_announcement_key(name: &str, prefix: Option<&NamespacePrefix>) -> bool {
    if UNPREFIXED.is_match(name) {
        return true;
    }
    prefix
        .and_then(|p| p.strip(name))
        .is_some_and(|rest| UNPREFIXED.is_match(rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn abc() -> Option<NamespacePrefix> {
        NamespacePrefix::parse("ABC_").ok()
    }

    #[rstest]
    #[case("announcement_title", true)]
    #[case("ANNOUNCEMENT_ACTIVE", true)]
    #[case("announcements_json", true)]
    #[case("announcements_version", true)]
    #[case("ann_fp", true)]
    #[case("Ann_Fp", true)]
    #[case("ann_fp_old", false)]
    #[case("announcement", false)]
    #[case("prayer_times_year", false)]
    #[case("ABC_announcement_title", false)]
    fn unprefixed_space(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_announcement_key(name, None), expected, "{name}");
    }

    #[rstest]
    #[case("ABC_announcement_title", true)]
    #[case("abc_announcements_json", true)]
    #[case("ABC_ann_fp", true)]
    #[case("ABC_ann_fp_backup", false)]
    #[case("XYZ_announcement_title", false)]
    #[case("ABC_feature_flag", false)]
    #[case("announcement_text", true)]
    fn prefixed_space(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_announcement_key(name, abc().as_ref()), expected, "{name}");
    }

    #[test]
    fn prefix_is_a_literal_not_a_pattern() {
        let short = NamespacePrefix::parse("A_").unwrap();
        assert!(is_announcement_key("A_ann_fp", Some(&short)));
        assert!(!is_announcement_key("AB_ann_fp", Some(&short)));
    }

    #[rstest]
    #[case("XYZ_announcement_title", true)]
    #[case("old_ABC_announcements_json", true)]
    #[case("legacy_ann_fp", true)]
    #[case("_announcement_text", true)]
    #[case("announcement_active", true)]
    #[case("foo_bar", false)]
    #[case("legacy_ann_fp_copy", false)]
    #[case("xannouncement_title", false)]
    fn prune_variant_is_broader(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(KeyMatcher::prune().is_match(name), expected, "{name}");
    }

    #[test]
    fn standard_never_matches_arbitrary_namespaces() {
        let standard = KeyMatcher::standard(abc());
        assert!(!standard.is_match("XYZ_announcement_title"));
        assert!(KeyMatcher::prune().is_match("XYZ_announcement_title"));
    }

    #[test]
    fn matching_preserves_order() {
        let names = ["foo_bar", "ann_fp", "ABC_ann_fp", "announcement_title"];
        let hits = KeyMatcher::standard(abc()).matching(names);
        assert_eq!(hits, vec!["ann_fp", "ABC_ann_fp", "announcement_title"]);
    }
}
