//! Error types for the agent boundary

use thiserror::Error;

/// Agent boundary error types
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent step failed: {0}")]
    Step(String),

    #[error("Agent event stream ended unexpectedly")]
    Interrupted,
}
