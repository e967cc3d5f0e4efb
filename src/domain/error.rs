//! Application error types with proper error chaining.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Query execution failed: {0}")]
    Query(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Duplicate record: {0}")]
    Duplicate(String),
    #[error("Pool exhausted: {0}")]
    PoolExhausted(String),
    #[error("Migration failed: {0}")]
    Migration(String),
}

#[derive(Error, Debug, Clone)]
pub enum MediaError {
    #[error("Connection to media host failed: {0}")]
    Connection(String),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Media host returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unexpected media host response: {0}")]
    InvalidResponse(String),
    #[error("Timeout talking to media host: {0}")]
    Timeout(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<&str> for ConfigError {
    fn from(s: &str) -> Self {
        ConfigError::ParseError(s.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Validation failed: {0}")]
    Multiple(String),
}

impl From<&str> for ValidationError {
    fn from(s: &str) -> Self {
        ValidationError::InvalidFormat(s.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// A failure explicitly raised by application logic, carrying the HTTP
    /// status code and user-facing message it should surface with. Unlike
    /// every other variant, its message is passed through verbatim in all
    /// runtime modes.
    #[error("{message}")]
    Operational { status: u16, message: String },
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Creates an operational error with an explicit status code.
    pub fn operational(status: u16, message: impl Into<String>) -> Self {
        AppError::Operational {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for an operational 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::operational(404, message)
    }

    /// Shorthand for an operational 400.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::operational(400, message)
    }

    /// Whether this failure was explicitly raised by application logic
    /// (and may therefore surface its message in any runtime mode).
    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(self, AppError::Operational { .. })
    }

    /// The HTTP status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Operational { status, .. } => *status,
            AppError::Database(db_err) => match db_err {
                DatabaseError::Connection(_) | DatabaseError::PoolExhausted(_) => 503,
                DatabaseError::NotFound(_) => 404,
                DatabaseError::Duplicate(_) => 409,
                _ => 500,
            },
            AppError::Media(media_err) => match media_err {
                MediaError::Connection(_) => 502,
                MediaError::Timeout(_) => 504,
                MediaError::Api { status, .. } if *status == 429 => 429,
                _ => 502,
            },
            AppError::Validation(_) => 400,
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => 500,
        }
    }

    /// A short machine-readable tag for the error, used in the envelope's
    /// `errors` array.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Operational { .. } => "operational_error",
            AppError::Database(_) => "database_error",
            AppError::Media(_) => "media_error",
            AppError::Config(_) => "configuration_error",
            AppError::Validation(_) => "validation_error",
            AppError::Io(_) => "io_error",
            AppError::Serialization(_) => "serialization_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Walks the `source` chain and collects each cause as a string.
    ///
    /// This is the diagnostic trace exposed in development-mode error
    /// responses.
    #[must_use]
    pub fn source_chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            chain.push(err.to_string());
            source = err.source();
        }
        chain
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(ValidationError::Multiple(err.to_string()))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted("Pool timed out".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.code().is_some_and(|code| code == "23505") {
                    return DatabaseError::Duplicate(db_err.message().to_string());
                }
                DatabaseError::Query(db_err.message().to_string())
            }
            _ => DatabaseError::Query(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::from(err))
    }
}

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return MediaError::Timeout(err.to_string());
        }
        if err.is_connect() {
            return MediaError::Connection(err.to_string());
        }
        if let Some(status) = err.status() {
            return MediaError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        MediaError::Upload(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Media(MediaError::from(err))
    }
}
