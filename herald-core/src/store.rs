//! Collaborator traits and the local template stores.
//!
//! The reconciler never talks to Remote Config or FCM directly; it goes
//! through [`TemplateStore`] and [`PushTransport`]. HTTP-backed
//! implementations live in `herald-remote`. This module ships two local
//! stores:
//!
//! - [`FileTemplateStore`]: the template JSON in a file, published with the
//!   `.tmp` + rename pattern and guarded by a content-hash etag.
//! - [`MemoryTemplateStore`]: in-process, for tests and embedding.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sha2::{Digest, Sha256};

use crate::error::{NotifyError, StoreError};
use crate::template::Template;
use crate::types::{PublishReceipt, PushMessage};

/// Remote Config parameter keys are capped at this length.
pub const MAX_KEY_LEN: usize = 256;

/// Template storage: read the current snapshot, validate a candidate, publish.
pub trait TemplateStore: Send + Sync {
    /// Human-readable identity used in logs and errors.
    fn describe(&self) -> String;

    fn get(&self) -> Result<Template, StoreError>;

    /// Validate without publishing. Returns the template as the store would
    /// accept it (with a refreshed etag when the store issues one).
    fn validate(&self, template: &Template) -> Result<Template, StoreError>;

    /// Publish `template`. Must fail with [`StoreError::Conflict`] when
    /// `template.etag` no longer matches the stored version.
    fn publish(&self, template: &Template) -> Result<PublishReceipt, StoreError>;
}

/// Push delivery. Returns the transport's message id.
pub trait PushTransport: Send + Sync {
    fn send(&self, message: &PushMessage) -> Result<String, NotifyError>;
}

/// Check every parameter key against the Remote Config key rules:
/// `[A-Za-z_][A-Za-z0-9_]*`, at most [`MAX_KEY_LEN`] characters.
pub fn check_parameter_keys(template: &Template) -> Result<(), String> {
    for key in template.keys() {
        let mut chars = key.chars();
        let first_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !first_ok || !rest_ok {
            return Err(format!("parameter key '{key}' is not a valid Remote Config key"));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(format!(
                "parameter key '{key}' exceeds {MAX_KEY_LEN} characters"
            ));
        }
    }
    Ok(())
}

fn next_version(current: Option<String>) -> String {
    let n = current
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    (n + 1).to_string()
}

// ---------------------------------------------------------------------------
// FileTemplateStore
// ---------------------------------------------------------------------------

/// Template kept as Remote Config-shaped JSON in a local file.
///
/// A missing file reads as an empty template. The etag is the SHA-256 of the
/// file bytes, so any write between `get` and `publish` is detected.
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    path: PathBuf,
}

const ABSENT_ETAG: &str = "absent";

impl FileTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Read {
                store: self.describe(),
                message: err.to_string(),
            }),
        }
    }

    fn write_err(&self, message: impl Into<String>) -> StoreError {
        StoreError::Write {
            store: self.describe(),
            message: message.into(),
        }
    }
}

fn content_etag(raw: &str) -> String {
    let mut h = Sha256::new();
    h.update(raw.as_bytes());
    hex::encode(h.finalize())
}

impl TemplateStore for FileTemplateStore {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn get(&self) -> Result<Template, StoreError> {
        let Some(raw) = self.read_raw()? else {
            return Ok(Template {
                etag: Some(ABSENT_ETAG.to_string()),
                ..Template::default()
            });
        };
        let mut template: Template =
            serde_json::from_str(&raw).map_err(|e| StoreError::Read {
                store: self.describe(),
                message: format!("invalid template JSON: {e}"),
            })?;
        template.etag = Some(content_etag(&raw));
        Ok(template)
    }

    fn validate(&self, template: &Template) -> Result<Template, StoreError> {
        check_parameter_keys(template).map_err(|message| StoreError::Validation {
            store: self.describe(),
            message,
        })?;
        Ok(template.clone())
    }

    fn publish(&self, template: &Template) -> Result<PublishReceipt, StoreError> {
        self.validate(template)?;

        let current_raw = self.read_raw()?;
        let current_etag = current_raw
            .as_deref()
            .map(content_etag)
            .unwrap_or_else(|| ABSENT_ETAG.to_string());
        if let Some(expected) = template.etag.as_deref() {
            if expected != current_etag {
                return Err(StoreError::Conflict {
                    store: self.describe(),
                    expected: expected.to_string(),
                });
            }
        }

        let previous_version = current_raw
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Template>(raw).ok())
            .and_then(|t| t.version_number());
        let version_number = next_version(previous_version);

        let mut next = template.clone();
        next.set_version_number(&version_number);
        let json = serde_json::to_string_pretty(&next)
            .map_err(|e| self.write_err(format!("cannot serialize template: {e}")))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| self.write_err(e.to_string()))?;
        }
        let tmp = PathBuf::from(format!("{}.tmp", self.path.display()));
        std::fs::write(&tmp, json).map_err(|e| self.write_err(e.to_string()))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(self.write_err(e.to_string()));
        }

        tracing::info!("published {} as version {version_number}", self.describe());
        Ok(PublishReceipt { version_number })
    }
}

// ---------------------------------------------------------------------------
// MemoryTemplateStore
// ---------------------------------------------------------------------------

/// In-process store. Etags are a publish counter.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    template: Template,
    generation: u64,
    published: Vec<Template>,
}

impl MemoryTemplateStore {
    pub fn new(template: Template) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                template,
                generation: 0,
                published: Vec::new(),
            }),
        }
    }

    /// Current stored template.
    pub fn snapshot(&self) -> Template {
        self.lock().template.clone()
    }

    /// Every template accepted by `publish`, oldest first.
    pub fn published(&self) -> Vec<Template> {
        self.lock().published.clone()
    }

    /// Replace the stored template out-of-band, as a concurrent editor would.
    pub fn replace(&self, template: Template) {
        let mut state = self.lock();
        state.template = template;
        state.generation += 1;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a panicking test thread; the data is
        // still a consistent snapshot.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn get(&self) -> Result<Template, StoreError> {
        let state = self.lock();
        let mut template = state.template.clone();
        template.etag = Some(format!("mem-{}", state.generation));
        Ok(template)
    }

    fn validate(&self, template: &Template) -> Result<Template, StoreError> {
        check_parameter_keys(template).map_err(|message| StoreError::Validation {
            store: self.describe(),
            message,
        })?;
        Ok(template.clone())
    }

    fn publish(&self, template: &Template) -> Result<PublishReceipt, StoreError> {
        self.validate(template)?;
        let mut state = self.lock();
        let current = format!("mem-{}", state.generation);
        if let Some(expected) = template.etag.as_deref() {
            if expected != current {
                return Err(StoreError::Conflict {
                    store: "memory".to_string(),
                    expected: expected.to_string(),
                });
            }
        }
        let version_number = next_version(state.template.version_number());
        let mut next = template.clone();
        next.etag = None;
        next.set_version_number(&version_number);
        state.template = next.clone();
        state.generation += 1;
        state.published.push(next);
        Ok(PublishReceipt { version_number })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_empty_template() {
        let tmp = TempDir::new().unwrap();
        let store = FileTemplateStore::new(tmp.path().join("template.json"));
        let tpl = store.get().unwrap();
        assert!(tpl.parameters.is_empty());
        assert_eq!(tpl.etag.as_deref(), Some(ABSENT_ETAG));
    }

    #[test]
    fn publish_bumps_version_and_cleans_tmp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rc").join("template.json");
        let store = FileTemplateStore::new(&path);

        let mut tpl = store.get().unwrap();
        tpl.set_string("announcement_active", "true");
        let first = store.publish(&tpl).unwrap();
        assert_eq!(first.version_number, "1");

        let mut tpl = store.get().unwrap();
        tpl.set_string("announcement_active", "false");
        let second = store.publish(&tpl).unwrap();
        assert_eq!(second.version_number, "2");

        let reread = store.get().unwrap();
        assert_eq!(reread.value("announcement_active"), Some("false"));
        assert!(!PathBuf::from(format!("{}.tmp", path.display())).exists());
    }

    #[test]
    fn publish_after_concurrent_edit_is_a_conflict() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("template.json");
        std::fs::write(&path, r#"{"parameters":{}}"#).unwrap();
        let store = FileTemplateStore::new(&path);

        let mut tpl = store.get().unwrap();
        std::fs::write(
            &path,
            r#"{"parameters":{"ann_fp":{"defaultValue":{"value":"x"}}}}"#,
        )
        .unwrap();
        tpl.set_string("ann_fp", "y");

        let err = store.publish(&tpl).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }), "got: {err}");
    }

    #[test]
    fn corrupt_file_is_a_read_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("template.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = FileTemplateStore::new(&path).get().unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
        assert!(err.to_string().contains("template.json"));
    }

    #[test]
    fn invalid_keys_fail_validation() {
        let store = MemoryTemplateStore::default();
        let tpl = Template::from_values([("1bad-key", "x")]);
        let err = store.validate(&tpl).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn memory_store_detects_out_of_band_replace() {
        let store = MemoryTemplateStore::new(Template::from_values([("a", "1")]));
        let tpl = store.get().unwrap();
        store.replace(Template::from_values([("a", "2")]));
        assert!(matches!(
            store.publish(&tpl),
            Err(StoreError::Conflict { .. })
        ));
    }

    #[test]
    fn memory_store_records_published_templates() {
        let store = MemoryTemplateStore::default();
        let mut tpl = store.get().unwrap();
        tpl.set_string("ann_fp", "abc");
        let receipt = store.publish(&tpl).unwrap();
        assert_eq!(receipt.version_number, "1");
        assert_eq!(store.published().len(), 1);
        assert_eq!(store.snapshot().value("ann_fp"), Some("abc"));
        assert_eq!(store.snapshot().version_number().as_deref(), Some("1"));
    }
}
