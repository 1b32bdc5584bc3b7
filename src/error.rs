//! # Error Types
//!
//! This module defines the error type used throughout the prensa library.
//!
//! Only [`PrensaError::Io`] is fatal for a document in progress. Everything
//! else either signals a programming-contract violation (rejected before any
//! byte is written) or an unsupported geometry the caller can recover from by
//! rasterizing the offending content.

use thiserror::Error;

/// Main error type for prensa operations
#[derive(Debug, Error)]
pub enum PrensaError {
    /// Sink write or flush failure. The stream is left partially written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value or contract-violating argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transform the device cannot express (free rotation, skew, mirroring)
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// Lifecycle call made out of order
    #[error("Call sequence violation: expected {expected}, found {found}")]
    Sequence {
        expected: &'static str,
        found: &'static str,
    },

    /// Image resampling or conversion failure
    #[error("Image error: {0}")]
    Image(String),
}

/// Alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PrensaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: PrensaError = io.into();
        assert!(matches!(err, PrensaError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: gone");
    }

    #[test]
    fn test_sequence_message() {
        let err = PrensaError::Sequence {
            expected: "page",
            found: "document",
        };
        assert_eq!(
            err.to_string(),
            "Call sequence violation: expected page, found document"
        );
    }
}
