use std::fs;
use std::path::Path;

use herald_core::{
    AnnouncementItem, ClearVariant, FileTemplateStore, MemoryTemplateStore, NamespacePrefix,
    PublishReceipt, StoreError, Template, TemplateStore,
};
use herald_reconcile::{
    is_announcement_key, run, KeyMatcher, Plan, ReconcileError, RunOptions, RunOutcome,
};
use serde_json::{json, Value};
use tempfile::TempDir;

const STAMP: &str = "2026-01-15T14:35:59-06:00";

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_template(path: &Path, value: Value) {
    fs::write(path, serde_json::to_string_pretty(&value).expect("json")).expect("write template");
}

fn publish_options() -> RunOptions {
    RunOptions::default()
}

#[test]
fn prune_scenario_on_file_store() {
    init_logs();
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("template.json");
    write_template(
        &path,
        json!({
            "conditions": [{"name": "ios", "expression": "device.os == 'ios'"}],
            "parameters": {
                "ABC_announcement_title": {"defaultValue": {"value": "Old"}},
                "foo_bar": {"defaultValue": {"value": "keep"}},
                "announcement_active": {"defaultValue": {"value": "true"}},
                "announcements_json": {"defaultValue": {"value": "[]"}},
                "announcements_version": {"defaultValue": {"value": "v1"}}
            }
        }),
    );
    let store = FileTemplateStore::new(&path);

    let outcome = run(&store, None, &Plan::prune(STAMP.into()), &publish_options()).expect("run");
    assert!(matches!(outcome, RunOutcome::Published { .. }));

    let after = store.get().expect("reread");
    assert_eq!(after.value("foo_bar"), Some("keep"));
    assert_eq!(after.value("announcement_active"), Some("true"));
    assert!(!after.contains("ABC_announcement_title"));
    assert!(!after.contains("announcements_json"));
    assert!(!after.contains("announcements_version"));
    for key in [
        "announcement_title",
        "announcement_text",
        "announcement_published_at",
        "ann_fp",
    ] {
        assert!(after.contains(key), "{key} missing after prune");
    }
    assert!(after.extra.contains_key("conditions"), "conditions must round-trip");

    // Nothing announcement-shaped survives outside the locked five.
    let leftovers: Vec<&str> = after
        .keys()
        .filter(|k| KeyMatcher::prune().is_match(k))
        .collect();
    assert_eq!(leftovers.len(), 5);
}

#[test]
fn publish_two_items_then_clear_with_prefix() {
    init_logs();
    let tmp = TempDir::new().expect("tmp");
    let store = FileTemplateStore::new(tmp.path().join("template.json"));
    let prefix = NamespacePrefix::parse("ABC_").ok();

    let items = vec![
        AnnouncementItem::new("item-0", "A", "first", "2026-01-01T00:00:00-0600"),
        AnnouncementItem::new("item-1", "B", "second", "2026-02-01T00:00:00-0600"),
    ];
    run(
        &store,
        None,
        &Plan::publish(items, prefix.clone(), STAMP.into()),
        &publish_options(),
    )
    .expect("publish");

    let published = store.get().expect("reread");
    assert_eq!(
        published.value("announcements_version"),
        Some("2026-02-01T00:00:00-0600")
    );
    assert_eq!(published.value("announcement_active"), Some("false"));
    assert_eq!(
        published.value("ABC_announcements_version"),
        Some("2026-02-01T00:00:00-0600")
    );
    assert_eq!(published.version_number().as_deref(), Some("1"));

    run(
        &store,
        None,
        &Plan::clear(ClearVariant::Blank, prefix, STAMP.into()),
        &publish_options(),
    )
    .expect("clear");

    let cleared = store.get().expect("reread");
    assert_eq!(cleared.value("announcements_json"), Some("[]"));
    assert_eq!(cleared.value("ABC_announcements_json"), Some("[]"));
    assert_eq!(cleared.value("announcement_active"), Some("false"));
    assert_eq!(
        cleared.value("ann_fp"),
        Some("clear-2026-01-15T14:35:59-06:00")
    );
    assert_eq!(cleared.version_number().as_deref(), Some("2"));
}

#[test]
fn dry_run_leaves_file_untouched() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("template.json");
    write_template(
        &path,
        json!({"parameters": {"announcement_title": {"defaultValue": {"value": "Old"}}}}),
    );
    let before = fs::read_to_string(&path).expect("read");

    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };
    let outcome = run(
        &FileTemplateStore::new(&path),
        None,
        &Plan::clear(ClearVariant::Placeholder, None, STAMP.into()),
        &options,
    )
    .expect("dry run");

    let result = outcome.result().expect("result");
    assert_eq!(result.removed_count, 1);
    assert_eq!(fs::read_to_string(&path).expect("read"), before);
}

/// Simulates another editor publishing between our read and our publish.
struct RacingStore {
    inner: MemoryTemplateStore,
}

impl TemplateStore for RacingStore {
    fn describe(&self) -> String {
        "racing".to_string()
    }
    fn get(&self) -> Result<Template, StoreError> {
        self.inner.get()
    }
    fn validate(&self, template: &Template) -> Result<Template, StoreError> {
        self.inner
            .replace(Template::from_values([("announcement_title", "edited elsewhere")]));
        self.inner.validate(template)
    }
    fn publish(&self, template: &Template) -> Result<PublishReceipt, StoreError> {
        self.inner.publish(template)
    }
}

#[test]
fn concurrent_edit_surfaces_as_conflict() {
    let store = RacingStore {
        inner: MemoryTemplateStore::new(Template::from_values([("ann_fp", "x")])),
    };
    let err = run(&store, None, &Plan::prune(STAMP.into()), &publish_options()).unwrap_err();
    assert!(err.is_conflict(), "got: {err}");
    assert!(matches!(err, ReconcileError::Store { .. }));
    assert_eq!(
        store.inner.snapshot().value("announcement_title"),
        Some("edited elsewhere")
    );
}

#[test]
fn clear_never_deletes_foreign_keys() {
    let tpl = Template::from_values([
        ("announcement_title", "x"),
        ("XYZ_announcement_title", "other namespace"),
        ("feature_flag", "on"),
    ]);
    let store = MemoryTemplateStore::new(tpl);
    let prefix = NamespacePrefix::parse("ABC_").ok();
    run(
        &store,
        None,
        &Plan::clear(ClearVariant::Placeholder, prefix.clone(), STAMP.into()),
        &publish_options(),
    )
    .expect("clear");

    let after = store.snapshot();
    assert_eq!(after.value("XYZ_announcement_title"), Some("other namespace"));
    assert_eq!(after.value("feature_flag"), Some("on"));
    for key in after.keys() {
        if key == "XYZ_announcement_title" || key == "feature_flag" {
            continue;
        }
        assert!(is_announcement_key(key, prefix.as_ref()), "unexpected write {key}");
    }
}
