//! Domain traits defining contracts for external systems.

use std::path::Path;

use async_trait::async_trait;

use super::error::AppError;
use super::types::MediaAsset;

/// Database client trait for persistence operations
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Check database connectivity
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Media store trait for third-party media host operations
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a local file to the media host
    async fn upload(&self, local_path: &Path, folder: Option<&str>)
    -> Result<MediaAsset, AppError>;

    /// Delete an asset from the media host by its public id
    async fn delete(&self, public_id: &str) -> Result<(), AppError> {
        let _ = public_id;
        Err(AppError::Internal(
            "delete not supported by this media store".to_string(),
        ))
    }
}
