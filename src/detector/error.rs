//! Detector errors
//!
//! Only lifecycle and setup failures surface as [`DetectorError`]. Query
//! failures inside a tick are [`QueryError`](crate::capture::QueryError)s
//! and never leave the polling loop.

use thiserror::Error;

/// Errors that can occur while configuring or running the detector
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Platform error: {0}")]
    PlatformError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to spawn polling thread: {0}")]
    ThreadSpawn(String),
}

/// Result type for detector operations
pub type DetectorResult<T> = Result<T, DetectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DetectorError::PlatformError("no backend".into()).to_string(),
            "Platform error: no backend"
        );
        assert_eq!(
            DetectorError::PermissionDenied("accessibility".into()).to_string(),
            "Permission denied: accessibility"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let err: DetectorError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, DetectorError::IoError(_)));
    }
}
