//! Error types for session operations.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Boxed error returned by a storage backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Session-specific errors.
///
/// A missing session is not an error: `load` returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session could not be encoded; nothing was sent to the backend.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The stored value is not a valid session.
    #[error("Deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// A get/setex/del command failed in the backend.
    #[error("Backend error: {0}")]
    Backend(#[source] BackendError),

    /// No connection could be acquired from the pool.
    #[error("Pool error: {0}")]
    Pool(String),

    /// The connection could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Authentication failed while setting up the connection.
    #[error("Connection setup error: {0}")]
    ConnectionSetup(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl SessionError {
    /// Wrap any backend error.
    pub fn backend(err: impl Into<BackendError>) -> Self {
        Self::Backend(err.into())
    }

    /// Whether this error must abort start-up rather than fail one request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectionSetup(_) | Self::Config(_) | Self::InvalidUrl(_))
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for SessionError {
    fn from(err: redis::RedisError) -> Self {
        Self::Backend(Box::new(err))
    }
}

#[cfg(feature = "redis")]
impl From<armature_redis::RedisError> for SessionError {
    fn from(err: armature_redis::RedisError) -> Self {
        use armature_redis::RedisError;

        match err {
            RedisError::Auth(msg) => Self::ConnectionSetup(msg),
            RedisError::Connection(msg) => Self::Connection(msg),
            RedisError::Pool(msg) => Self::Pool(msg),
            RedisError::Config(msg) => Self::Config(msg),
            other => Self::Backend(Box::new(other)),
        }
    }
}
