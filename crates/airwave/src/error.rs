//! Error types for the airwave engine
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for the airwave engine
#[derive(Error, Debug)]
pub enum AirwaveError {
    #[error("Media error: {0}")]
    Media(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the airwave engine
pub type Result<T> = std::result::Result<T, AirwaveError>;
