//! Application error types
//!
//! Top-level error for binaries built on the admin client.

use crate::config::ConfigError;
use crate::telemetry::TracingError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Startup errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    // Gateway errors
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request rejected: {0}")]
    Request(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Tracing(_) | Self::Connection(_) | Self::Request(_) | Self::Internal(_) => 1,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias using `AppError`
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let config = AppError::Config(ConfigError::InvalidValue("APP_ENV", "x".to_string()));
        assert_eq!(config.exit_code(), 2);
        assert_eq!(AppError::Connection("refused".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = AppError::Connection("refused".to_string());
        assert_eq!(err.to_string(), "Connection error: refused");

        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = AppError::from(io);
        assert!(matches!(err, AppError::Internal(_)));
    }
}
