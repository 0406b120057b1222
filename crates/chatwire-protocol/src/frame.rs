//! Typed frames streamed from the server to the chat client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One typed unit of streamed protocol data.
///
/// Within a turn, frames form a total order: `Connected` is always first and
/// either `Error` or `Done` is last, never both. `ToolEnd` resolves the most
/// recent unmatched `ToolStart`; `Token` frames may interleave between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// Transport is open and the turn is about to start.
    Connected,
    /// Incremental assistant text for the current turn.
    Token { token: String },
    /// A tool invocation began.
    ToolStart { tool: String, input: Value },
    /// A tool invocation finished.
    ToolEnd { tool: String, output: Value },
    /// The turn failed; human-readable reason.
    Error { error: String },
    /// The turn completed successfully.
    Done,
}

impl Frame {
    /// Whether this frame ends the turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Frame::Error { .. } | Frame::Done)
    }

    pub fn token(text: impl Into<String>) -> Self {
        Frame::Token { token: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Frame::Error {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_snake_case_type_tag() {
        let frame = Frame::ToolStart {
            tool: "customer_lookup".to_string(),
            input: json!({"id": 7}),
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "tool_start");
        assert_eq!(value["tool"], "customer_lookup");
        assert_eq!(value["input"]["id"], 7);
    }

    #[test]
    fn payload_free_frames_carry_only_the_tag() {
        assert_eq!(
            serde_json::to_string(&Frame::Connected).unwrap(),
            r#"{"type":"connected"}"#
        );
        assert_eq!(serde_json::to_string(&Frame::Done).unwrap(), r#"{"type":"done"}"#);
    }

    #[test]
    fn only_error_and_done_are_terminal() {
        assert!(Frame::Done.is_terminal());
        assert!(Frame::error("boom").is_terminal());
        assert!(!Frame::Connected.is_terminal());
        assert!(!Frame::token("hi").is_terminal());
    }
}
