//! Palaver Common Error Types
//!
//! Centralized error handling for all Palaver components

use std::fmt;

/// Main error type for Palaver operations
#[derive(Debug)]
pub enum PalaverError {
    /// Generic error with message
    Generic(String),
    /// IO-related errors
    Io(std::io::Error),
    /// Serialization/deserialization errors
    Serde(serde_json::Error),
    /// HTTP transport or decoding errors
    Http(String),
    /// Relay protocol errors (rejected task, bad status)
    Relay(String),
    /// Configuration errors
    Config(String),
}

impl fmt::Display for PalaverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PalaverError::Generic(msg) => write!(f, "Palaver error: {}", msg),
            PalaverError::Io(err) => write!(f, "IO error: {}", err),
            PalaverError::Serde(err) => write!(f, "Serialization error: {}", err),
            PalaverError::Http(msg) => write!(f, "HTTP error: {}", msg),
            PalaverError::Relay(msg) => write!(f, "Relay error: {}", msg),
            PalaverError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PalaverError {}

/// Convenience result type for Palaver operations
pub type Result<T> = std::result::Result<T, PalaverError>;

// Implement From traits for common error types
impl From<std::io::Error> for PalaverError {
    fn from(err: std::io::Error) -> Self {
        PalaverError::Io(err)
    }
}

impl From<serde_json::Error> for PalaverError {
    fn from(err: serde_json::Error) -> Self {
        PalaverError::Serde(err)
    }
}

impl From<anyhow::Error> for PalaverError {
    fn from(err: anyhow::Error) -> Self {
        PalaverError::Generic(err.to_string())
    }
}
