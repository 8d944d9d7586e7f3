//! Object storage client
//!
//! Uploads binary files (post images, avatars) to an external bucket and
//! returns the public URL that gets persisted on the record. Keys are
//! deterministic: `<category>/<id-or-timestamp>_<originalfilename>`.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::ProviderConfig;

/// Error types for object storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Provider credentials missing from configuration
    #[error("Object storage is not configured")]
    NotConfigured,

    /// Upload rejected by the storage service
    #[error("Storage upload failed: {0}")]
    UploadFailed(String),

    /// Transport-level failure reaching the storage service
    #[error("Failed to reach object storage: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Object storage operations used by the upload handlers.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload a file under the given key and return its public URL.
    ///
    /// `upsert` controls whether an existing object under the same key is
    /// overwritten (avatars) or the upload is rejected (post images).
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<String, StorageError>;
}

/// HTTP bucket storage client.
pub struct HttpObjectStorage {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
    bucket: String,
}

impl HttpObjectStorage {
    /// Build a client from provider configuration. Uses the service-role
    /// key when present so bucket policies do not block writes; otherwise
    /// falls back to the anon key.
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pencraft/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            api_key: config
                .service_role_key
                .clone()
                .or_else(|| config.anon_key.clone()),
            bucket: config.bucket.clone(),
        })
    }

    fn credentials(&self) -> Result<(&str, &str), StorageError> {
        match (self.base_url.as_deref(), self.api_key.as_deref()) {
            (Some(url), Some(key)) => Ok((url.trim_end_matches('/'), key)),
            _ => Err(StorageError::NotConfigured),
        }
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<String, StorageError> {
        let (base, api_key) = self.credentials()?;

        let response = self
            .client
            .post(format!("{}/storage/v1/object/{}/{}", base, self.bucket, key))
            .bearer_auth(api_key)
            .header("apikey", api_key)
            .header("content-type", content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(data)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(%status, %detail, key, "storage upload rejected");
            return Err(StorageError::UploadFailed(format!("HTTP {}", status)));
        }

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            base, self.bucket, key
        ))
    }
}

/// Build a deterministic storage key: `<prefix>/<timestamp>_<filename>`.
pub fn storage_key(prefix: &str, filename: &str) -> String {
    format!(
        "{}/{}_{}",
        prefix,
        chrono::Utc::now().timestamp_millis(),
        filename
    )
}
