use thiserror::Error;

/// Application-wide error types for the ONE Record server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Outbound HTTP request failed (delivering to a subscriber).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Request payload or parameters are invalid.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The resource already exists or the change conflicts with its state.
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Credentials are valid but do not grant access.
    #[error("{0}")]
    Forbidden(String),

    /// A feature needed by the request is not configured.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Hashing or token signing failed.
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}
