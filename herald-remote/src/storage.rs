//! Firebase Storage object download.

use std::io::Read;

use url::Url;

use crate::client::CloudClient;
use crate::error::{from_ureq, RemoteError};

/// Objects larger than this are refused.
pub const MAX_OBJECT_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct StorageClient {
    client: CloudClient,
}

impl StorageClient {
    pub fn new(client: CloudClient) -> Self {
        Self { client }
    }

    /// `…/v0/b/<bucket>/o/<object>?alt=media`, with the object path encoded
    /// as a single segment (`/` → `%2F`).
    pub fn object_url(&self, bucket: &str, object: &str) -> Result<String, RemoteError> {
        let base = self.client.endpoints().storage.trim_end_matches('/');
        let mut url = Url::parse(base).map_err(|e| RemoteError::InvalidUrl {
            url: base.to_string(),
            message: e.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl {
                url: base.to_string(),
                message: "cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(["v0", "b", bucket, "o", object]);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url.to_string())
    }

    /// Download `object` from `bucket`.
    pub fn fetch_object(&self, bucket: &str, object: &str) -> Result<Vec<u8>, RemoteError> {
        let url = self.object_url(bucket, object)?;
        tracing::debug!(url = %url, "downloading storage object");
        let response = self
            .client
            .request("GET", &url)
            .call()
            .map_err(|e| from_ureq("GET", &url, e))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_OBJECT_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| RemoteError::Decode {
                url: url.clone(),
                message: e.to_string(),
            })?;
        if bytes.len() as u64 > MAX_OBJECT_BYTES {
            return Err(RemoteError::Decode {
                url,
                message: format!("object exceeds {MAX_OBJECT_BYTES} bytes"),
            });
        }
        tracing::info!(bucket, object, bytes = bytes.len(), "downloaded storage object");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::Endpoints;

    #[test]
    fn object_path_is_one_encoded_segment() {
        let storage = StorageClient::new(CloudClient::new("p", None, Duration::from_secs(5)));
        let url = storage
            .object_url("masjid.appspot.com", "prayer_times/2026.json")
            .unwrap();
        assert_eq!(
            url,
            "https://firebasestorage.googleapis.com/v0/b/masjid.appspot.com/o/prayer_times%2F2026.json?alt=media"
        );
    }

    #[test]
    fn object_url_respects_endpoint_override() {
        let client = CloudClient::new("p", None, Duration::from_secs(5))
            .with_endpoints(Endpoints::all_at("http://127.0.0.1:8080"));
        let url = StorageClient::new(client).object_url("b", "o.json").unwrap();
        assert_eq!(url, "http://127.0.0.1:8080/v0/b/b/o/o.json?alt=media");
    }
}
