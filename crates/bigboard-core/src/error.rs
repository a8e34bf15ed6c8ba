//! Error types for BigBoard

use thiserror::Error;

/// Core BigBoard errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    // Substrate errors
    #[error("Interest timed out")]
    InterestTimeout,

    #[error("Face closed")]
    FaceClosed,

    #[error("Transport error: {0}")]
    Transport(String),

    // Decoding errors
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BoardError {
    /// Timeouts are the normal end of an enumeration round, not a failure
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, BoardError::InterestTimeout)
    }
}

/// Result type for BigBoard operations
pub type BoardResult<T> = Result<T, BoardError>;
