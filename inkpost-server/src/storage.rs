//! Object storage client
//!
//! Uploads go to an external object store over HTTP; the store answers with
//! nothing we need, so the public URL is derived from configuration. When no
//! storage endpoint is configured, uploads fail with a configuration error
//! (writes fail loudly; nothing in the read paths touches storage).

use inkpost_common::config::StorageConfig;
use inkpost_common::{Error, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    config: Option<StorageConfig>,
}

impl StorageClient {
    pub fn new(config: Option<StorageConfig>) -> Self {
        StorageClient {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// PUT an object under `key`, returning its public URL
    pub async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let Some(config) = &self.config else {
            return Err(Error::Config(
                "object storage endpoint not configured".to_string(),
            ));
        };

        let endpoint = config.endpoint.trim_end_matches('/');
        let url = format!("{}/{}", endpoint, key);

        let response = self
            .http
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Internal(format!("storage upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Internal(format!(
                "storage upload failed: HTTP {}",
                response.status()
            )));
        }

        let public_base = config
            .public_base_url
            .as_deref()
            .unwrap_or(&config.endpoint)
            .trim_end_matches('/');
        let public_url = format!("{}/{}", public_base, key);

        info!("Uploaded object: {}", public_url);
        Ok(public_url)
    }
}
