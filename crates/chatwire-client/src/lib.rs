//! Chatwire Client - Consumes a streamed agent turn.
//!
//! The consumer side of the pipeline: network bytes are sliced and decoded
//! statefully, reassembled into frames, accumulated into a turn transcript,
//! and handed to a render sink on an adaptive flush schedule. Everything
//! runs on one cooperative event loop; a turn owns its parser, buffer, and
//! timer state, so concurrent chat sessions never share anything.

pub mod buffer;
pub mod decode;
pub mod error;
pub mod parser;
pub mod render;
pub mod session;
pub mod transcript;

pub use buffer::{BufferConfig, FlushBuffer};
pub use decode::{MAX_DECODE_CHUNK, Utf8Decoder};
pub use error::ClientError;
pub use parser::StreamParser;
pub use render::{CollectingSink, RenderSink};
pub use session::{
    CancelHandle, CancelSignal, ChatClient, ClientConfig, Conversation, TurnOutcome, cancel_pair,
    drive_turn,
};
pub use transcript::TurnTranscript;
