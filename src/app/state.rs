//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::{DatabaseClient, MediaStore};
use crate::infra::observability::PrometheusHandle;

use super::service::AppService;

/// Shared application state for the Axum web server.
///
/// This struct holds thread-safe references to all application services
/// and clients, allowing handlers to access them without knowing their
/// concrete implementations.
///
/// # Thread Safety
///
/// All contained types are wrapped in `Arc` and implement `Send + Sync`,
/// making `AppState` safe to share across async tasks.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
///
/// let db = Arc::new(PostgresClient::with_defaults(&database_url).await?);
/// let media = Arc::new(CloudinaryClient::with_defaults(&config.media)?);
/// let state = AppState::new(db, media);
///
/// // Use with Axum
/// let router = Router::new()
///     .route("/uploads", post(upload_handler))
///     .with_state(Arc::new(state));
/// ```
#[derive(Clone)]
pub struct AppState {
    /// The application service containing business logic.
    pub service: Arc<AppService>,

    /// Database client for persistence operations.
    pub db_client: Arc<dyn DatabaseClient>,

    /// Media store client for upload operations.
    pub media_store: Arc<dyn MediaStore>,

    /// Prometheus handle for rendering GET /metrics, when installed.
    pub metrics: Option<Arc<PrometheusHandle>>,

    /// Directory where incoming uploads are spooled before they are sent
    /// to the media host.
    pub tmp_dir: PathBuf,
}

impl AppState {
    /// Creates a new `AppState` instance with the provided clients.
    ///
    /// This constructor also creates the `AppService` internally,
    /// wiring it to the provided clients.
    ///
    /// # Arguments
    ///
    /// * `db_client` - A thread-safe reference to a database client implementation.
    /// * `media_store` - A thread-safe reference to a media store implementation.
    #[must_use]
    pub fn new(db_client: Arc<dyn DatabaseClient>, media_store: Arc<dyn MediaStore>) -> Self {
        let service = Arc::new(AppService::new(
            Arc::clone(&db_client),
            Arc::clone(&media_store),
        ));

        Self {
            service,
            db_client,
            media_store,
            metrics: None,
            tmp_dir: std::env::temp_dir(),
        }
    }

    /// Attaches a Prometheus handle so the router can serve GET /metrics.
    #[must_use]
    pub fn with_metrics(mut self, handle: Arc<PrometheusHandle>) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Overrides the upload spool directory.
    #[must_use]
    pub fn with_tmp_dir(mut self, tmp_dir: PathBuf) -> Self {
        self.tmp_dir = tmp_dir;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockDatabaseClient, MockMediaStore};

    #[test]
    fn test_app_state_creation() {
        let db = Arc::new(MockDatabaseClient::new());
        let media = Arc::new(MockMediaStore::new());

        let state = AppState::new(db, media);

        // Verify state is created and service is accessible
        assert!(Arc::strong_count(&state.service) >= 1);
        assert!(state.metrics.is_none());
    }

    #[test]
    fn test_app_state_is_clone() {
        let db = Arc::new(MockDatabaseClient::new());
        let media = Arc::new(MockMediaStore::new());

        let state = AppState::new(db, media);
        let cloned = state.clone();

        // Both should point to the same service
        assert!(Arc::ptr_eq(&state.service, &cloned.service));
    }
}
