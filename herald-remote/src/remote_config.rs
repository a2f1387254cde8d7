//! Firebase Remote Config REST v1 template store.
//!
//! - `GET  …/remoteConfig` → template body + `ETag` header
//! - `PUT  …/remoteConfig?validateOnly=true` with `If-Match` → validation
//! - `PUT  …/remoteConfig` with `If-Match` → publish
//!
//! A `409`/`412` on publish means the template moved since it was read and
//! maps to [`StoreError::Conflict`].

use serde_json::Value;

use herald_core::{PublishReceipt, StoreError, Template, TemplateStore};

use crate::client::CloudClient;
use crate::error::{from_ureq, RemoteError};

const JSON_CONTENT_TYPE: &str = "application/json; UTF-8";

/// Template store backed by the Remote Config API.
#[derive(Debug, Clone)]
pub struct RemoteConfigStore {
    client: CloudClient,
}

impl RemoteConfigStore {
    pub fn new(client: CloudClient) -> Self {
        Self { client }
    }

    fn put(&self, template: &Template, validate_only: bool) -> Result<ureq::Response, RemoteError> {
        let url = self.client.remote_config_url();
        let body = publish_body(template);
        let mut req = self
            .client
            .request("PUT", &url)
            .set("Content-Type", JSON_CONTENT_TYPE)
            .set("If-Match", template.etag.as_deref().unwrap_or("*"));
        if validate_only {
            req = req.query("validateOnly", "true");
        }
        tracing::debug!(url = %url, validate_only, "PUT remote config template");
        req.send_string(&body.to_string())
            .map_err(|e| from_ureq("PUT", &url, e))
    }

    fn read_err(&self, err: RemoteError) -> StoreError {
        StoreError::Read {
            store: self.describe(),
            message: err.to_string(),
        }
    }

    /// Map a failed PUT onto the store error kinds.
    fn write_err(&self, err: RemoteError, expected: Option<&str>) -> StoreError {
        match err.status() {
            Some(409) | Some(412) => StoreError::Conflict {
                store: self.describe(),
                expected: expected.unwrap_or("*").to_string(),
            },
            Some(400) => StoreError::Validation {
                store: self.describe(),
                message: err.to_string(),
            },
            _ => StoreError::Write {
                store: self.describe(),
                message: err.to_string(),
            },
        }
    }
}

/// Body sent on PUT. The `version` object is server-managed apart from its
/// `description`, so everything else in it is dropped.
pub fn publish_body(template: &Template) -> Value {
    let mut body = serde_json::to_value(template).unwrap_or(Value::Null);
    if let Some(obj) = body.as_object_mut() {
        let description = obj
            .get("version")
            .and_then(|v| v.get("description"))
            .cloned();
        obj.remove("version");
        if let Some(description) = description {
            obj.insert(
                "version".to_string(),
                serde_json::json!({ "description": description }),
            );
        }
    }
    body
}

/// Validation responses carry an etag with a `-0` suffix that publish
/// rejects.
pub fn strip_validation_suffix(etag: &str) -> &str {
    etag.strip_suffix("-0").unwrap_or(etag)
}

fn decode_template(url: &str, response: ureq::Response) -> Result<Template, RemoteError> {
    let etag = response.header("ETag").map(str::to_string);
    let mut template: Template = response.into_json().map_err(|e| RemoteError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    template.etag = etag;
    Ok(template)
}

impl TemplateStore for RemoteConfigStore {
    fn describe(&self) -> String {
        format!("remote-config:{}", self.client.project_id())
    }

    fn get(&self) -> Result<Template, StoreError> {
        let url = self.client.remote_config_url();
        tracing::debug!(url = %url, "GET remote config template");
        let response = self
            .client
            .request("GET", &url)
            .call()
            .map_err(|e| self.read_err(from_ureq("GET", &url, e)))?;
        let template = decode_template(&url, response).map_err(|e| self.read_err(e))?;
        if template.etag.is_none() {
            return Err(StoreError::Read {
                store: self.describe(),
                message: "response had no ETag header".to_string(),
            });
        }
        tracing::info!(
            parameters = template.parameters.len(),
            version = template.version_number().as_deref().unwrap_or("?"),
            "fetched remote config template"
        );
        Ok(template)
    }

    fn validate(&self, template: &Template) -> Result<Template, StoreError> {
        let url = self.client.remote_config_url();
        let response = self
            .put(template, true)
            .map_err(|e| self.write_err(e, template.etag.as_deref()))?;
        let etag = response
            .header("ETag")
            .map(|e| strip_validation_suffix(e).to_string());

        let mut validated = match decode_template(&url, response) {
            Ok(t) => t,
            Err(err) => {
                tracing::debug!(error = %err, "validation body not a template; keeping local copy");
                template.clone()
            }
        };
        validated.etag = etag.or_else(|| template.etag.clone());
        Ok(validated)
    }

    fn publish(&self, template: &Template) -> Result<PublishReceipt, StoreError> {
        let url = self.client.remote_config_url();
        let response = self
            .put(template, false)
            .map_err(|e| self.write_err(e, template.etag.as_deref()))?;
        let published = decode_template(&url, response).map_err(|e| StoreError::Write {
            store: self.describe(),
            message: e.to_string(),
        })?;
        let version_number = published.version_number().unwrap_or_default();
        tracing::info!(version = %version_number, "published remote config template");
        Ok(PublishReceipt { version_number })
    }
}
