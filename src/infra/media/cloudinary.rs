//! Cloudinary media host client.
//!
//! Implements the [`MediaStore`] trait over Cloudinary's signed upload API.
//! Requests are authenticated by signing the sorted parameter string with
//! the account's API secret (SHA-256 hex digest).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::domain::{AppError, MediaAsset, MediaError, MediaStore};
use crate::infra::config::MediaConfig;

/// Configuration for the Cloudinary HTTP client
#[derive(Debug, Clone)]
pub struct CloudinaryClientConfig {
    /// Overall request timeout, uploads included.
    pub timeout: Duration,
    /// Base URL of the media host API (overridable for tests).
    pub base_url: String,
}

impl Default for CloudinaryClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            base_url: "https://api.cloudinary.com".to_string(),
        }
    }
}

/// Cloudinary upload API client
pub struct CloudinaryClient {
    http_client: Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
}

/// Subset of Cloudinary's upload response we care about.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
    bytes: u64,
    format: Option<String>,
    resource_type: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryClient {
    /// Create a new Cloudinary client with custom configuration
    pub fn new(media: &MediaConfig, config: CloudinaryClientConfig) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Media(MediaError::Connection(e.to_string())))?;
        info!(cloud_name = %media.cloud_name, "Created media host client");
        Ok(Self {
            http_client,
            base_url: config.base_url,
            cloud_name: media.cloud_name.clone(),
            api_key: media.api_key.clone(),
            api_secret: media.api_secret.clone(),
        })
    }

    /// Create a new Cloudinary client with default configuration
    pub fn with_defaults(media: &MediaConfig) -> Result<Self, AppError> {
        Self::new(media, CloudinaryClientConfig::default())
    }

    /// Signs request parameters the way Cloudinary expects: sort the
    /// key/value pairs, join them as a query string, append the API secret,
    /// and hex-encode the SHA-256 digest.
    fn sign_params(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        let to_sign = sorted
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }

    fn upload_url(&self) -> String {
        format!("{}/v1_1/{}/auto/upload", self.base_url, self.cloud_name)
    }

    fn destroy_url(&self) -> String {
        format!("{}/v1_1/{}/image/destroy", self.base_url, self.cloud_name)
    }
}

#[async_trait]
impl MediaStore for CloudinaryClient {
    #[instrument(skip(self), fields(path = %local_path.display()))]
    async fn upload(
        &self,
        local_path: &Path,
        folder: Option<&str>,
    ) -> Result<MediaAsset, AppError> {
        let bytes = tokio::fs::read(local_path).await?;
        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let timestamp = Utc::now().timestamp().to_string();
        let mut signed_params: Vec<(&str, &str)> = vec![("timestamp", &timestamp)];
        if let Some(folder) = folder {
            signed_params.push(("folder", folder));
        }
        let signature = self.sign_params(&signed_params);

        let mut form = Form::new()
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.clone())
            .text("signature", signature)
            .part("file", Part::bytes(bytes).file_name(file_name));
        if let Some(folder) = folder {
            form = form.text("folder", folder.to_string());
        }

        let response = self
            .http_client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, "Media host rejected upload");
            return Err(AppError::Media(MediaError::Api {
                status: status.as_u16(),
                message,
            }));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Media(MediaError::InvalidResponse(e.to_string())))?;

        info!(public_id = %parsed.public_id, bytes = parsed.bytes, "Upload stored on media host");

        Ok(MediaAsset {
            public_id: parsed.public_id,
            url: parsed.secure_url,
            bytes: parsed.bytes,
            format: parsed.format,
            resource_type: parsed.resource_type,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, public_id: &str) -> Result<(), AppError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign_params(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let response = self
            .http_client
            .post(self.destroy_url())
            .form(&[
                ("public_id", public_id),
                ("timestamp", &timestamp),
                ("api_key", &self.api_key),
                ("signature", &signature),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::Media(MediaError::Api {
                status: status.as_u16(),
                message,
            }));
        }

        let parsed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Media(MediaError::InvalidResponse(e.to_string())))?;

        match parsed.result.as_str() {
            "ok" => Ok(()),
            "not found" => Err(AppError::not_found("Asset not found on media host")),
            other => Err(AppError::Media(MediaError::InvalidResponse(format!(
                "unexpected destroy result '{other}'"
            )))),
        }
    }
}

// Small hex helper so we don't pull in a crate for one call site
mod hex {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        let mut hex = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            hex.push(HEX_CHARS[(byte >> 4) as usize] as char);
            hex.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
        }
        hex
    }
}
