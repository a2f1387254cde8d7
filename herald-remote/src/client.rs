//! Shared HTTP client for the Google Cloud endpoints.
//!
//! Built once per process and handed to each adapter. Holds the project id,
//! the OAuth access token and a `ureq::Agent` with the configured timeout.

use std::time::Duration;

/// Environment variables consulted for an access token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["HERALD_ACCESS_TOKEN", "GOOGLE_OAUTH_ACCESS_TOKEN"];

/// Environment variable consulted for the project id.
pub const PROJECT_ENV_VAR: &str = "GOOGLE_CLOUD_PROJECT";

/// Base URLs. Overridable so tests can point at a local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub remote_config: String,
    pub messaging: String,
    pub storage: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            remote_config: "https://firebaseremoteconfig.googleapis.com".to_string(),
            messaging: "https://fcm.googleapis.com".to_string(),
            storage: "https://firebasestorage.googleapis.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Every endpoint at one base URL.
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            remote_config: base.clone(),
            messaging: base.clone(),
            storage: base,
        }
    }
}

/// Authenticated client for one project.
#[derive(Clone)]
pub struct CloudClient {
    project_id: String,
    token: Option<String>,
    endpoints: Endpoints,
    agent: ureq::Agent,
}

impl std::fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudClient")
            .field("project_id", &self.project_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl CloudClient {
    pub fn new(project_id: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("herald/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            project_id: project_id.into(),
            token,
            endpoints: Endpoints::default(),
            agent,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// `…/v1/projects/<id>/remoteConfig`
    pub fn remote_config_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/remoteConfig",
            self.endpoints.remote_config.trim_end_matches('/'),
            self.project_id
        )
    }

    /// `…/v1/projects/<id>/messages:send`
    pub fn messaging_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoints.messaging.trim_end_matches('/'),
            self.project_id
        )
    }

    /// Request with the bearer token attached when one is configured.
    pub(crate) fn request(&self, method: &str, url: &str) -> ureq::Request {
        let req = self.agent.request(method, url);
        match &self.token {
            Some(token) => req.set("Authorization", &format!("Bearer {token}")),
            None => req,
        }
    }
}

/// First non-empty token from [`TOKEN_ENV_VARS`].
pub fn access_token_from_env() -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_the_v1_layout() {
        let client = CloudClient::new("masjid-app", None, Duration::from_secs(5));
        assert_eq!(
            client.remote_config_url(),
            "https://firebaseremoteconfig.googleapis.com/v1/projects/masjid-app/remoteConfig"
        );
        assert_eq!(
            client.messaging_url(),
            "https://fcm.googleapis.com/v1/projects/masjid-app/messages:send"
        );
    }

    #[test]
    fn endpoints_can_be_redirected() {
        let client = CloudClient::new("p", None, Duration::from_secs(5))
            .with_endpoints(Endpoints::all_at("http://127.0.0.1:9000/"));
        assert_eq!(
            client.remote_config_url(),
            "http://127.0.0.1:9000/v1/projects/p/remoteConfig"
        );
    }

    #[test]
    fn debug_never_prints_the_token() {
        let client = CloudClient::new("p", Some("ya29.secret".into()), Duration::from_secs(5));
        let shown = format!("{client:?}");
        assert!(!shown.contains("ya29"));
        assert!(shown.contains("<redacted>"));
    }
}
