//! Chatwire Agent - The tool-calling agent boundary.
//!
//! The streaming core treats the agent as an opaque asynchronous iterator:
//! one call yields a lazy, ordered, single-pass sequence of heterogeneous
//! step events (model tokens, tool starts, tool ends). This crate defines
//! that boundary plus small sources used by tests and the demo binary, and
//! the conversation-history trimming applied before a turn starts.

pub mod error;
pub mod event;
pub mod history;
pub mod source;

pub use error::AgentError;
pub use event::AgentEvent;
pub use history::trim_history;
pub use source::{AgentEventSource, EchoSource, EventStream, ScriptStep, ScriptedSource};
