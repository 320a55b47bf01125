//! HTTP blob store upload provider
//!
//! Talks to a simple bearer-token blob service: PUT to store, DELETE to
//! reclaim. Any store exposing that shape (or a thin shim in front of one)
//! works.

use crate::{UploadProvider, UploadedAsset};
use casefile_core::{CasefileError, CasefileResult, GenerationError};
use reqwest::Client;
use serde::Deserialize;

/// Response body of a successful store call.
#[derive(Debug, Deserialize)]
struct StoreResponse {
    url: String,
    id: String,
}

/// UploadProvider backed by an HTTP blob store.
pub struct BlobStoreUploadProvider {
    client: Client,
    base_url: String,
    token: String,
}

impl BlobStoreUploadProvider {
    /// Create a new provider.
    ///
    /// # Arguments
    /// * `base_url` - Store endpoint, e.g. `https://blobs.example.com`
    /// * `token` - Bearer token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn upload_failed(name: &str, reason: impl Into<String>) -> CasefileError {
        CasefileError::Generation(GenerationError::UploadFailed {
            name: name.to_string(),
            reason: reason.into(),
        })
    }
}

#[async_trait::async_trait]
impl UploadProvider for BlobStoreUploadProvider {
    async fn upload(
        &self,
        content: &[u8],
        name: &str,
        folder: &str,
    ) -> CasefileResult<UploadedAsset> {
        let url = format!("{}/{}/{}", self.base_url, folder, name);
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .header("Content-Type", "application/octet-stream")
            .body(content.to_vec())
            .send()
            .await
            .map_err(|e| Self::upload_failed(name, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::upload_failed(
                name,
                format!("store returned {}: {}", status, body),
            ));
        }

        let stored: StoreResponse = response
            .json()
            .await
            .map_err(|e| Self::upload_failed(name, format!("malformed store response: {}", e)))?;

        Ok(UploadedAsset {
            url: stored.url,
            asset_id: stored.id,
        })
    }

    async fn delete(&self, asset_id: &str) -> CasefileResult<()> {
        let url = format!("{}/assets/{}", self.base_url, asset_id);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Self::upload_failed(asset_id, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        // Deleting an already-gone asset is fine; reclamation is idempotent.
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(Self::upload_failed(
                asset_id,
                format!("delete returned {}", status),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BlobStoreUploadProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStoreUploadProvider")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let provider = BlobStoreUploadProvider::new("https://blobs.example.com/", "t");
        assert_eq!(provider.base_url, "https://blobs.example.com");
    }

    #[test]
    fn test_debug_redacts_token() {
        let provider = BlobStoreUploadProvider::new("https://blobs.example.com", "secret-token");
        let debug = format!("{:?}", provider);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-token"));
    }
}
