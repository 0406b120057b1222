//! Error types for the stream consumer

use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stream read error: {0}")]
    Stream(String),

    /// The server reported a failed turn via an `Error` frame.
    #[error("Turn failed: {0}")]
    Turn(String),

    #[error("Stream ended unexpectedly: {0}")]
    Interrupted(String),

    #[error("Storage error: {0}")]
    Storage(#[from] chatwire_storage::StorageError),
}
