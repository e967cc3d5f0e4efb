//! Domain layer containing core business types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AppError, ConfigError, DatabaseError, MediaError, ValidationError};
pub use traits::{DatabaseClient, MediaStore};
pub use types::{
    ApiResponse, ErrorBody, ErrorDetail, HealthData, HealthStatus, MediaAsset, UploadOptions,
};
