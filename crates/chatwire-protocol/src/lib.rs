//! Chatwire Protocol - Typed frames and wire codec for streamed agent turns.
//!
//! This crate defines the shared vocabulary between the streaming server and
//! the chat client:
//! - `Frame`, the tagged unit of streamed protocol data
//! - the SSE-style wire codec (`encode`, `RecordDecoder`)
//! - `StreamLimits` and the truncation policy applied to oversized payloads
//! - chat message and turn request models exchanged at the HTTP boundary

pub mod chat;
pub mod codec;
pub mod error;
pub mod frame;
pub mod limits;

pub use chat::{ChatMessage, ChatRole, TurnRequest};
pub use codec::{DATA_PREFIX, RECORD_DELIMITER, RecordDecoder, encode};
pub use error::{ProtocolError, Result};
pub use frame::Frame;
pub use limits::{
    StreamLimits, TOKEN_TRUNCATED_MARKER, TOOL_INPUT_TRUNCATED_MARKER,
    TOOL_OUTPUT_TRUNCATED_MARKER, TURN_TRUNCATED_NOTICE, truncate_with_marker,
};
