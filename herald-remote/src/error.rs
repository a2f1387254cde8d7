//! Error types for herald-remote.

use thiserror::Error;

/// Failures talking to Google Cloud endpoints.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server answered with a non-2xx status.
    #[error("{method} {url} returned HTTP {status}: {message}")]
    Http {
        method: &'static str,
        url: String,
        status: u16,
        message: String,
    },

    /// DNS, TLS, connect or timeout failure.
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: &'static str,
        url: String,
        message: String,
    },

    /// The response body was not what the endpoint documents.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl RemoteError {
    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convert a `ureq` failure, pulling the Google error message out of the
/// JSON body when there is one.
pub(crate) fn from_ureq(method: &'static str, url: &str, err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            RemoteError::Http {
                method,
                url: url.to_string(),
                status,
                message: google_error_message(&body),
            }
        }
        ureq::Error::Transport(transport) => RemoteError::Transport {
            method,
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

/// `{"error": {"message": "..."}}` → the message; anything else → the body.
fn google_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
