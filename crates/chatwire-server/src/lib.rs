//! Chatwire Server - Streams agent turns to HTTP consumers.
//!
//! One turn is one producer task: the agent event stream is drained and
//! forwarded through a size-bounding SSE emitter into a backpressured byte
//! channel that feeds the HTTP response body. Concurrent turns get their own
//! channel/emitter pair; nothing is shared.

pub mod api;
pub mod config;
pub mod emitter;
pub mod error;
pub mod state;
pub mod transport;

pub use config::ServerConfig;
pub use emitter::SseEmitter;
pub use error::{TransportError, TurnError};
pub use state::AppState;
pub use transport::{ChannelBody, ChannelWriter, byte_channel};
