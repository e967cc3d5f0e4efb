//! HTTP request handlers with OpenAPI documentation.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, warn};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::app::AppState;
use crate::app::service::remove_temp_file;
use crate::domain::{
    ApiResponse, AppError, ErrorBody, ErrorDetail, HealthData, HealthStatus, MediaAsset,
    UploadOptions,
};
use crate::infra::config::runtime_env;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Backend Starter API",
        version = "0.2.0",
        description = "Production-ready Axum backend starter with PostgreSQL, media uploads, and uniform JSON envelopes",
        contact(
            name = "API Support",
            email = "support@example.com"
        ),
        license(
            name = "MIT"
        )
    ),
    paths(
        health_handler,
        liveness_handler,
        readiness_handler,
        upload_handler,
    ),
    components(
        schemas(
            ApiResponse<HealthData>,
            ApiResponse<MediaAsset>,
            HealthData,
            HealthStatus,
            MediaAsset,
            UploadOptions,
            ErrorBody,
            ErrorDetail,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "uploads", description = "Media upload endpoints")
    )
)]
pub struct ApiDoc;

/// Detailed health check
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Health status with uptime and timestamp", body = ApiResponse<HealthData>)
    )
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let health = state.service.health_check().await;
    Json(ApiResponse::ok("Service health", health))
}

/// Kubernetes liveness probe
#[utoipa::path(
    get,
    path = "/api/v1/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Application is alive")
    )
)]
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe
#[utoipa::path(
    get,
    path = "/api/v1/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Application is ready to serve traffic"),
        (status = 503, description = "Application is not ready")
    )
)]
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    let health = state.service.health_check().await;
    match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Upload a file to the media host
///
/// Accepts a multipart form with a required `file` part and an optional
/// `folder` text part. The file is spooled to the configured temp
/// directory, forwarded to the media host, and the spool file is removed
/// whether or not the upload succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    tag = "uploads",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Upload stored on the media host", body = ApiResponse<MediaAsset>),
        (status = 400, description = "Missing file part or invalid options", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody),
        (status = 502, description = "Media host rejected the upload", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut options = UploadOptions::default();
    let mut spooled: Option<std::path::PathBuf> = None;

    if let Err(e) = spool_parts(state.as_ref(), &mut multipart, &mut options, &mut spooled).await {
        // A failure after the file part was spooled must not leave it behind
        if let Some(path) = &spooled {
            remove_temp_file(path).await;
        }
        return Err(e);
    }

    // Raised as operational so the message survives production redaction
    let path = spooled.ok_or_else(|| AppError::bad_request("A `file` part is required"))?;

    metrics::counter!("uploads_total").increment(1);

    let asset = state.service.store_upload(&path, &options).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created("Upload stored", asset)),
    ))
}

/// Walks the multipart fields, spooling the `file` part to the temp
/// directory and capturing the optional `folder` part. Unknown parts are
/// ignored rather than rejected.
async fn spool_parts(
    state: &AppState,
    multipart: &mut Multipart,
    options: &mut UploadOptions,
    spooled: &mut Option<std::path::PathBuf>,
) -> Result<(), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let original_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(format!("Failed to read file part: {e}")))?;

                let path = state.tmp_dir.join(spool_file_name(original_name.as_deref()));
                tokio::fs::write(&path, &bytes).await?;
                *spooled = Some(path);
            }
            Some("folder") => {
                let folder = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(format!("Failed to read folder part: {e}")))?;
                options.folder = Some(folder);
            }
            _ => {}
        }
    }
    Ok(())
}

/// Renders Prometheus metrics for scraping.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serves the OpenAPI document.
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Catch-all for unmatched routes: a 404 in the uniform envelope.
pub async fn fallback_handler() -> AppError {
    AppError::not_found("Resource not found")
}

/// Names a spool file uniquely, keeping the original extension when the
/// client supplied one.
fn spool_file_name(original: Option<&str>) -> String {
    let id = Uuid::new_v4();
    match original.and_then(|name| std::path::Path::new(name).extension()) {
        Some(ext) => format!("upload-{id}.{}", ext.to_string_lossy()),
        None => format!("upload-{id}"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = ?self, status = %status, "Request failed");
        } else {
            warn!(error = %self, status = %status, "Request rejected");
        }

        metrics::counter!("http_errors_total", "type" => self.error_type()).increment(1);

        let body = render_error_body(&self, runtime_env().is_development());
        (status, Json(body)).into_response()
    }
}

/// Shapes an error into the uniform envelope.
///
/// Development mode exposes the full message, detail list, and the
/// error-source chain in `stack`. Any other mode passes operational errors
/// through verbatim but collapses unexpected failures to a generic message
/// with no diagnostics.
pub fn render_error_body(err: &AppError, development: bool) -> ErrorBody {
    let status = err.status_code();

    if development {
        return ErrorBody::new(
            status,
            err.to_string(),
            vec![ErrorDetail {
                r#type: err.error_type().to_string(),
                message: err.to_string(),
            }],
        )
        .with_stack(err.source_chain());
    }

    if err.is_operational() {
        return ErrorBody::new(
            status,
            err.to_string(),
            vec![ErrorDetail {
                r#type: err.error_type().to_string(),
                message: err.to_string(),
            }],
        );
    }

    ErrorBody::new(
        status,
        "Something went wrong",
        vec![ErrorDetail {
            r#type: err.error_type().to_string(),
            message: "Internal server error".to_string(),
        }],
    )
}
