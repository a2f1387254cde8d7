//! Last-seen template version, persisted between watcher runs.
//!
//! `<home>/.herald/watch/state.json`, written with the `.tmp` + rename
//! pattern.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herald_core::config::herald_root;

use crate::error::{io_err, WatchError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchState {
    pub last_version: Option<String>,
    pub last_notified_at: Option<DateTime<Utc>>,
}

/// `~/.herald/watch/state.json`
pub fn state_path_at(home: &Path) -> PathBuf {
    herald_root(home).join("watch").join("state.json")
}

/// Load state from `path`; a missing file is a fresh state.
pub fn load(path: &Path) -> Result<WatchState, WatchError> {
    if !path.exists() {
        return Ok(WatchState::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&raw).map_err(|source| WatchError::State {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save(path: &Path, state: &WatchState) -> Result<(), WatchError> {
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid state path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(state).map_err(|source| WatchError::State {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))
}
