//! Application service layer.
//!
//! This module contains the core business logic that orchestrates
//! operations between infrastructure components using trait abstractions.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::{
    AppError, DatabaseClient, HealthData, HealthStatus, MediaAsset, MediaStore, UploadOptions,
};

/// Application service containing core business logic.
///
/// This service orchestrates operations between the database and media
/// store clients, implementing the application's use cases. It holds
/// references to the trait abstractions, enabling dependency injection
/// and testability.
///
/// # Example
///
/// ```ignore
/// let db = Arc::new(PostgresClient::with_defaults(&database_url).await?);
/// let media = Arc::new(CloudinaryClient::with_defaults(&config.media)?);
/// let service = AppService::new(db, media);
///
/// let asset = service.store_upload(&temp_path, &options).await?;
/// ```
pub struct AppService {
    db_client: Arc<dyn DatabaseClient>,
    media_store: Arc<dyn MediaStore>,
    started_at: Instant,
}

impl AppService {
    /// Creates a new `AppService` instance.
    ///
    /// # Arguments
    ///
    /// * `db_client` - Database client for persistence operations.
    /// * `media_store` - Media store client for upload operations.
    #[must_use]
    pub fn new(db_client: Arc<dyn DatabaseClient>, media_store: Arc<dyn MediaStore>) -> Self {
        Self {
            db_client,
            media_store,
            started_at: Instant::now(),
        }
    }

    /// Uploads a local temporary file to the media host, then removes the
    /// temporary file whether or not the upload succeeded.
    ///
    /// This method orchestrates the following workflow:
    /// 1. Validates the upload options
    /// 2. Sends the file to the media host
    /// 3. Deletes the local temporary file (a file that is already gone is
    ///    not an error)
    /// 4. Returns the stored asset, or re-signals the upload failure upward
    ///
    /// There is no retry or backoff; a failed upload is reported as-is.
    ///
    /// # Errors
    ///
    /// Returns an `AppError` if validation fails or the media host rejects
    /// the upload. The temporary file is removed in every case.
    #[instrument(skip(self, options), fields(path = %local_path.display()))]
    pub async fn store_upload(
        &self,
        local_path: &Path,
        options: &UploadOptions,
    ) -> Result<MediaAsset, AppError> {
        let result = self.upload_inner(local_path, options).await;

        remove_temp_file(local_path).await;

        match &result {
            Ok(asset) => info!(public_id = %asset.public_id, "Upload stored"),
            Err(e) => warn!(error = ?e, "Upload failed"),
        }

        result
    }

    async fn upload_inner(
        &self,
        local_path: &Path,
        options: &UploadOptions,
    ) -> Result<MediaAsset, AppError> {
        options.validate().map_err(|e| {
            warn!(error = %e, "Validation failed for upload options");
            AppError::from(e)
        })?;

        self.media_store
            .upload(local_path, options.folder.as_deref())
            .await
    }

    /// Performs a health check on all dependencies.
    ///
    /// Returns the database health status together with process uptime.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> HealthData {
        let db_health = match self.db_client.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = ?e, "Database health check failed");
                HealthStatus::Unhealthy
            }
        };

        HealthData::new(db_health, self.started_at.elapsed().as_secs())
    }
}

/// Deletes the temporary file if it still exists.
///
/// A missing file is fine (the upload client may have consumed it); any
/// other failure is logged and swallowed so it never masks the upload
/// result.
pub(crate) async fn remove_temp_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to remove temporary file");
        }
    }
}
