//! Error Types
//!
//! Errors for the fallible surfaces of the crate: catalog loading, SSE
//! decoding and event loop hand-off. Display writes themselves never
//! surface an error to the streaming source.

use thiserror::Error;

/// Main error type for stream display and settings operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (unreadable catalog, invalid JSON, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Streaming chunk could not be decoded
    #[error("Streaming error: {0}")]
    Stream(String),

    /// A write could not be handed to the host event loop
    #[error("Scheduling error: {0}")]
    Schedule(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Stream(format!("JSON parsing error: {}", err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Config(format!("IO error: {}", err))
    }
}

#[cfg(feature = "python")]
impl From<Error> for pyo3::PyErr {
    fn from(err: Error) -> pyo3::PyErr {
        use pyo3::exceptions::{PyRuntimeError, PyValueError};

        let msg = err.to_string();
        match &err {
            Error::Config(_) => PyValueError::new_err(msg),
            Error::Stream(_) => PyValueError::new_err(msg),
            Error::Schedule(_) => PyRuntimeError::new_err(msg),
        }
    }
}

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            Error::Config("bad file".to_string()).to_string(),
            "Configuration error: bad file"
        );
        assert_eq!(
            Error::Schedule("queue closed".to_string()).to_string(),
            "Scheduling error: queue closed"
        );
    }

    #[test]
    fn test_from_serde_json() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Stream(_)));
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Config(msg) if msg.contains("missing")));
    }
}
