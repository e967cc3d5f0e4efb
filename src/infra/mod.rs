//! Infrastructure layer implementations.

pub mod config;
pub mod database;
pub mod media;
pub mod observability;

pub use config::{AppConfig, MediaConfig, RuntimeEnv, runtime_env, set_runtime_env};
pub use database::{PostgresClient, PostgresConfig};
pub use media::{CloudinaryClient, CloudinaryClientConfig};
