//! Announcement file loading: the file interface consumed by publish.

use assert_fs::prelude::*;
use herald_core::{input, InputError};
use rstest::rstest;

#[test]
fn loads_and_normalizes_array() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("announcements.json");
    file.write_str(
        r#"[
            {"id": "eid", "title": "Eid Mubarak", "text": "Takbeerat at 8:00 AM", "published_at": "2026-03-20T08:00:00-0500"},
            {"title": "Parking", "published_at": "2026-03-18T12:00:00-0500"}
        ]"#,
    )
    .expect("write");

    let items = input::load_items_from_file(file.path()).expect("load");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "eid");
    assert_eq!(items[1].id, "item-1");
    assert_eq!(items[1].text, "");
}

#[test]
fn empty_array_is_allowed() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("empty.json");
    file.write_str("[]").expect("write");
    assert!(input::load_items_from_file(file.path()).expect("load").is_empty());
}

#[rstest]
#[case(r#"{"title": "not a list"}"#)]
#[case(r#""just a string""#)]
#[case("42")]
fn non_array_top_level_is_rejected(#[case] body: &str) {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("bad.json");
    file.write_str(body).expect("write");

    let err = input::load_items_from_file(file.path()).unwrap_err();
    assert!(matches!(err, InputError::NotAnArray { .. }), "got: {err}");
    assert!(err.to_string().contains("bad.json"));
}

#[test]
fn malformed_json_reports_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("broken.json");
    file.write_str("[{\"title\": ").expect("write");

    let err = input::load_items_from_file(file.path()).unwrap_err();
    assert!(matches!(err, InputError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = input::load_items_from_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, InputError::Io { .. }), "got: {err}");
}
