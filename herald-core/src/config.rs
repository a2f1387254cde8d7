//! Operator configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.herald/
//!   config.yaml      (optional; defaults apply when absent)
//!   watch/state.json (publish watcher bookkeeping)
//! ```
//!
//! # API pattern
//!
//! As with every path-derived helper in this crate:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_TIMEZONE: &str = "America/Chicago";
pub const DEFAULT_TOPIC: &str = "allUsers";
pub const DEFAULT_PREFIX: &str = "ABC_";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 60;

/// Contents of `~/.herald/config.yaml`. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeraldConfig {
    /// Firebase / GCP project id. `GOOGLE_CLOUD_PROJECT` overrides it.
    pub project_id: Option<String>,
    /// IANA zone used for published-at stamps.
    pub timezone: String,
    /// Push topic devices subscribe to.
    pub topic: String,
    /// Namespace prefix cleared alongside the unprefixed keys.
    pub prefix: Option<String>,
    /// Stamp through `TZ=<zone> date` instead of the built-in zone database.
    pub stamp_via_shell: bool,
    /// Use a local template file instead of Remote Config.
    pub store_file: Option<PathBuf>,
    /// HTTP timeout for store and push calls.
    pub timeout_secs: u64,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    pub interval_secs: u64,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            timezone: DEFAULT_TIMEZONE.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            prefix: Some(DEFAULT_PREFIX.to_string()),
            stamp_via_shell: false,
            store_file: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            watch: WatchConfig::default(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_WATCH_INTERVAL_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.herald/`
pub fn herald_root(home: &Path) -> PathBuf {
    home.join(".herald")
}

/// `<home>/.herald/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    herald_root(home).join("config.yaml")
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load the config from an explicit file. A missing file yields defaults.
pub fn load_from(path: &Path) -> Result<HeraldConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("no config at {}; using defaults", path.display());
        return Ok(HeraldConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if contents.trim().is_empty() {
        return Ok(HeraldConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load `<home>/.herald/config.yaml`.
pub fn load_at(home: &Path) -> Result<HeraldConfig, ConfigError> {
    load_from(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<HeraldConfig, ConfigError> {
    load_at(&home()?)
}

/// Save the config atomically (`.tmp` + rename).
pub fn save_at(home: &Path, config: &HeraldConfig) -> Result<(), ConfigError> {
    let path = config_path_at(home);
    let dir = herald_root(home);
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::Io {
        path: dir.clone(),
        source: e,
    })?;
    let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::Parse {
        path: path.clone(),
        source: e,
    })?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| ConfigError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp, &path).map_err(|e| ConfigError::Io { path, source: e })
}

pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
