//! Mock implementations for testing.
//!
//! These mocks provide in-memory implementations of domain traits
//! that can be configured to simulate various scenarios including
//! success, failure, and edge cases.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{
    AppError, DatabaseClient, DatabaseError, MediaAsset, MediaError, MediaStore,
};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
    /// Simulated latency in milliseconds.
    pub latency_ms: Option<u64>,
}

impl MockConfig {
    /// Creates a config that always succeeds.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Creates a config that always fails.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            latency_ms: None,
        }
    }

    /// Adds simulated latency.
    #[must_use]
    pub fn with_latency(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(ms) = self.latency_ms {
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
        }
    }

    fn error_message(&self) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| "Mock failure".to_string())
    }
}

/// Mock database client for testing.
///
/// Supports configurable failure modes and counts health-check calls.
///
/// # Example
///
/// ```
/// use backend_starter::test_utils::{MockDatabaseClient, mocks::MockConfig};
///
/// // Create a mock that succeeds
/// let mock = MockDatabaseClient::new();
///
/// // Create a mock that fails
/// let failing_mock = MockDatabaseClient::with_config(MockConfig::failure("DB error"));
/// ```
pub struct MockDatabaseClient {
    config: MockConfig,
    call_count: AtomicU64,
}

impl MockDatabaseClient {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            call_count: AtomicU64::new(0),
        }
    }

    /// Creates a mock that fails every operation.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Number of health-check calls made against this mock.
    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn health_check(&self) -> Result<(), AppError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.config.simulate_latency().await;

        if self.config.should_fail {
            return Err(AppError::Database(DatabaseError::Connection(
                self.config.error_message(),
            )));
        }
        Ok(())
    }
}

/// Mock media store for testing.
///
/// Records every uploaded path and deleted public id so tests can assert
/// on the calls that were made, and supports configurable failure modes.
pub struct MockMediaStore {
    config: MockConfig,
    uploads: Arc<Mutex<Vec<PathBuf>>>,
    deletions: Arc<Mutex<Vec<String>>>,
}

impl MockMediaStore {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            uploads: Arc::new(Mutex::new(Vec::new())),
            deletions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a mock that fails every operation.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Paths of all uploads attempted against this mock.
    #[must_use]
    pub fn uploads(&self) -> Vec<PathBuf> {
        self.uploads.lock().unwrap().clone()
    }

    /// Public ids of all deletions attempted against this mock.
    #[must_use]
    pub fn deletions(&self) -> Vec<String> {
        self.deletions.lock().unwrap().clone()
    }
}

impl Default for MockMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(
        &self,
        local_path: &Path,
        folder: Option<&str>,
    ) -> Result<MediaAsset, AppError> {
        self.config.simulate_latency().await;

        if self.config.should_fail {
            return Err(AppError::Media(MediaError::Upload(
                self.config.error_message(),
            )));
        }

        self.uploads.lock().unwrap().push(local_path.to_path_buf());

        let id = uuid::Uuid::new_v4();
        let public_id = match folder {
            Some(folder) => format!("{folder}/{id}"),
            None => id.to_string(),
        };

        let bytes = tokio::fs::metadata(local_path)
            .await
            .map(|meta| meta.len())
            .unwrap_or(0);

        Ok(MediaAsset {
            url: format!("https://media.test/{public_id}"),
            public_id,
            bytes,
            format: Some("png".to_string()),
            resource_type: "image".to_string(),
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), AppError> {
        self.config.simulate_latency().await;

        if self.config.should_fail {
            return Err(AppError::Media(MediaError::Upload(
                self.config.error_message(),
            )));
        }

        self.deletions.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}
