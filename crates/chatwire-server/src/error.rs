//! Error types for the streaming server

use thiserror::Error;

/// Transport channel error types
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport closed by consumer")]
    Closed,
}

/// Errors that end a streamed turn
#[derive(Error, Debug)]
pub enum TurnError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Storage error: {0}")]
    Storage(#[from] chatwire_storage::StorageError),
}
