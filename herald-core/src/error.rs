//! Error types for herald-core.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed or missing operator input. Raised before any store call.
#[derive(Debug, Error)]
pub enum InputError {
    /// The announcement file could not be read.
    #[error("cannot read input file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The announcement file is not valid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The announcement file parsed, but its top level is not an array.
    #[error("{path}: input file must be a JSON array of announcements")]
    NotAnArray { path: PathBuf },

    /// Neither `--file` nor any single-item field was supplied.
    #[error("provide a file of announcements or at least one of title/text/published_at")]
    MissingItems,

    /// Prefix contains characters that cannot appear in a parameter key.
    #[error("invalid namespace prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: String },

    /// A required option had no value from flags, environment or config.
    #[error("missing {what}; {hint}")]
    Missing { what: &'static str, hint: &'static str },
}

/// The template store failed to return or accept a template.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the current template failed.
    #[error("failed to read template from {store}: {message}")]
    Read { store: String, message: String },

    /// Validating or publishing the template failed.
    #[error("failed to write template to {store}: {message}")]
    Write { store: String, message: String },

    /// The template changed between read and publish (ETag mismatch).
    #[error("template in {store} changed since it was read (expected etag {expected}); re-run to reconcile against the new version")]
    Conflict { store: String, expected: String },

    /// The store rejected the template as invalid.
    #[error("template rejected by {store}: {message}")]
    Validation { store: String, message: String },
}

/// The push transport failed. Reported as a warning by callers.
#[derive(Debug, Error)]
#[error("push to topic '{topic}' failed: {message}")]
pub struct NotifyError {
    pub topic: String,
    pub message: String,
}

/// Config file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error with the file path and serde_yaml line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or pass --config")]
    HomeNotFound,
}

/// Convenience constructor for [`InputError::Io`].
pub(crate) fn input_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> InputError {
    InputError::Io {
        path: path.into(),
        source,
    }
}
