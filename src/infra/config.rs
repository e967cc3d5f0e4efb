//! Environment-driven application configuration.
//!
//! All configuration is read once at startup from environment variables
//! (with `.env` support via `dotenvy` in `main`). Credentials are held in
//! [`SecretString`] so they never appear in `Debug` output or logs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use secrecy::SecretString;

use crate::domain::ConfigError;

/// The runtime mode of the process.
///
/// Controls error-response verbosity: development mode exposes the
/// diagnostic trace, every other mode returns generic messages for
/// unexpected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Development,
    Production,
    Test,
}

impl RuntimeEnv {
    #[must_use]
    pub fn is_development(self) -> bool {
        matches!(self, RuntimeEnv::Development)
    }
}

impl FromStr for RuntimeEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RuntimeEnv::Development),
            "production" | "prod" => Ok(RuntimeEnv::Production),
            "test" => Ok(RuntimeEnv::Test),
            other => Err(ConfigError::InvalidValue {
                key: "APP_ENV".to_string(),
                message: format!("unknown environment '{other}'"),
            }),
        }
    }
}

/// The process-wide runtime mode, published once at startup.
static RUNTIME_ENV: OnceLock<RuntimeEnv> = OnceLock::new();

/// Publishes the runtime mode for the rest of the process.
///
/// Returns `false` if a mode was already published (the first write wins).
pub fn set_runtime_env(env: RuntimeEnv) -> bool {
    RUNTIME_ENV.set(env).is_ok()
}

/// The active runtime mode.
///
/// Defaults to [`RuntimeEnv::Production`] when nothing was published, so
/// diagnostics are never leaked by accident.
#[must_use]
pub fn runtime_env() -> RuntimeEnv {
    RUNTIME_ENV.get().copied().unwrap_or(RuntimeEnv::Production)
}

/// Credentials and addressing for the media host.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: SecretString,
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP listener binds to.
    pub port: u16,
    /// Runtime mode (see [`RuntimeEnv`]).
    pub env: RuntimeEnv,
    /// Postgres connection string.
    pub database_url: String,
    /// Media host credentials.
    pub media: MediaConfig,
    /// Directory for temporary upload spool files.
    pub tmp_dir: PathBuf,
    /// Requests per second for general endpoints.
    pub rate_limit_rps: u32,
    /// Burst size for general endpoints.
    pub rate_limit_burst: u32,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: format!("'{raw}' is not a valid port number"),
            })?,
            Err(_) => 8000,
        };

        let runtime = match env::var("APP_ENV") {
            Ok(raw) => raw.parse()?,
            Err(_) => RuntimeEnv::Production,
        };

        let database_url = require("DATABASE_URL")?;

        let media = MediaConfig {
            cloud_name: require("CLOUDINARY_CLOUD_NAME")?,
            api_key: require("CLOUDINARY_API_KEY")?,
            api_secret: SecretString::from(require("CLOUDINARY_API_SECRET")?),
        };

        let tmp_dir = env::var("TMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir());

        let rate_limit_rps = env_or_default_positive("RATE_LIMIT_RPS", 10)?;
        let rate_limit_burst = env_or_default_positive("RATE_LIMIT_BURST", 20)?;

        Ok(Self {
            port,
            env: runtime,
            database_url,
            media,
            tmp_dir,
            rate_limit_rps,
            rate_limit_burst,
        })
    }
}

fn require(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Reads an optional positive integer. Zero and unparseable values are
/// rejected at startup; the rate limiter quota requires a non-zero rate.
fn env_or_default_positive(key: &str, default: u32) -> Result<u32, ConfigError> {
    match env::var(key) {
        Ok(raw) => parse_positive(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u32, ConfigError> {
    match raw.parse::<u32>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}' is not a positive integer"),
        }),
        Ok(value) => Ok(value),
    }
}
