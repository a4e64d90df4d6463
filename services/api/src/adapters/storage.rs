//! services/api/src/adapters/storage.rs
//!
//! This module contains the object storage adapter, which is the concrete
//! implementation of the `BlobStorageService` port from the `core` crate.
//! It talks to a Supabase-style storage HTTP API with `reqwest`.

use async_trait::async_trait;
use math_mentor_core::ports::{BlobStorageService, PortError, PortResult};
use reqwest::Client;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `BlobStorageService` against the Supabase
/// storage HTTP API. Objects live in a single bucket and are addressed by
/// their key alone.
#[derive(Clone)]
pub struct SupabaseStorageAdapter {
    client: Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl SupabaseStorageAdapter {
    /// Creates a new `SupabaseStorageAdapter`.
    pub fn new(base_url: String, bucket: String, service_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            service_key,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }
}

//=========================================================================================
// `BlobStorageService` Trait Implementation
//=========================================================================================

#[async_trait]
impl BlobStorageService for SupabaseStorageAdapter {
    /// Stores the raw image bytes under `key` in the configured bucket.
    async fn upload(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> PortResult<()> {
        let response = self
            .client
            .post(self.object_url(key))
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| PortError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PortError::Storage(format!(
                "Upload of '{}' failed with {}: {}",
                key, status, text
            )));
        }
        Ok(())
    }

    /// Resolves `key` to its public URL. A HEAD request confirms the object
    /// actually exists, so an unknown key or an unreachable store fails here
    /// instead of surfacing later as a confusing model error.
    async fn resolve_public_url(&self, key: &str) -> PortResult<String> {
        let url = self.public_url(key);

        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| PortError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::Storage(format!(
                "Object '{}' is not publicly readable (status {})",
                key,
                response.status()
            )));
        }
        Ok(url)
    }
}
