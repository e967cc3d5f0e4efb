use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// The uniform JSON wrapper applied to every successful HTTP response body.
///
/// `success` is derived from the status code and never caller-supplied:
/// it is `true` exactly when `status_code < 400`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub message: String,
    pub data: T,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    /// Creates an envelope, deriving `success` from the status code.
    pub fn new(status_code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status_code,
            message: message.into(),
            data,
            success: status_code < 400,
        }
    }

    /// A 200 envelope.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(200, message, data)
    }

    /// A 201 envelope.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(201, message, data)
    }
}

/// One entry in the `errors` array of an error envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub r#type: String,
    pub message: String,
}

/// The uniform JSON wrapper applied to every error response body.
///
/// `data` is always `null`; `success` is derived from the status code the
/// same way as in [`ApiResponse`], which makes it `false` for every real
/// error. The `stack` field carries the error-source chain and is only
/// ever present in development mode.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub success: bool,
    pub errors: Vec<ErrorDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<String>>,
}

impl ErrorBody {
    /// Creates an error envelope with no diagnostic trace.
    pub fn new(status_code: u16, message: impl Into<String>, errors: Vec<ErrorDetail>) -> Self {
        Self {
            status_code,
            message: message.into(),
            data: None,
            success: status_code < 400,
            errors,
            stack: None,
        }
    }

    /// Attaches the diagnostic trace (development mode only).
    #[must_use]
    pub fn with_stack(mut self, stack: Vec<String>) -> Self {
        self.stack = Some(stack);
        self
    }
}

/// Health check status for services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check payload returned by `GET /api/v1/health`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: HealthStatus,
    pub database: HealthStatus,
    pub uptime_secs: u64,
    pub timestamp: DateTime<Utc>,
}

impl HealthData {
    /// Builds the payload; the overall status follows the database status.
    #[must_use]
    pub fn new(database: HealthStatus, uptime_secs: u64) -> Self {
        let status = match database {
            HealthStatus::Healthy => HealthStatus::Healthy,
            HealthStatus::Unhealthy => HealthStatus::Unhealthy,
        };

        Self {
            status,
            database,
            uptime_secs,
            timestamp: Utc::now(),
        }
    }
}

/// Normalized result of a media upload, as returned by the media host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct MediaAsset {
    /// The media host's identifier for the asset.
    pub public_id: String,
    /// Publicly reachable URL of the stored asset.
    pub url: String,
    /// Size of the stored asset in bytes.
    pub bytes: u64,
    /// File format as detected by the media host, when reported.
    pub format: Option<String>,
    /// Resource class reported by the media host (image, video, raw).
    pub resource_type: String,
}

/// Optional client-supplied metadata accompanying an upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UploadOptions {
    /// Target folder on the media host.
    #[validate(length(min = 1, max = 128))]
    pub folder: Option<String>,
}
