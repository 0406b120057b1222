//! Error types for the protocol crate

use thiserror::Error;

/// Protocol error types
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
