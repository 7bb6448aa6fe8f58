use thiserror::Error;

/// Reporter error types
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Invalid DSN: {0}")]
    Dsn(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Failure raised by the safe serializer.
///
/// Never escapes [`normalize`](crate::normalize::normalize); the normalizer
/// turns it into a diagnostic message.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("value of type {0} cannot be encoded")]
    Unencodable(&'static str),

    #[error("JSON encoder rejected the value: {0}")]
    Json(#[from] serde_json::Error),
}
