//! The accumulated turn transcript: token text plus rendered tool blocks.
//!
//! Owns the single "current tool" slot; overlapping or nested tool spans
//! are not modeled. The transcript enforces the turn ceiling with exactly
//! one truncation notice, no matter how many tokens keep arriving.

use chatwire_protocol::TURN_TRUNCATED_NOTICE;
use serde_json::Value;

/// Space held back for the notice when a token straddles the ceiling.
const NOTICE_RESERVE: usize = 50;

const PROCESSING_PLACEHOLDER: &str = "Processing...";

#[derive(Debug)]
struct OpenTool {
    name: String,
    input: Value,
    block_start: usize,
    block_len: usize,
}

/// Accumulator for one turn's rendered text.
#[derive(Debug)]
pub struct TurnTranscript {
    text: String,
    turn_ceiling: usize,
    truncated: bool,
    open_tool: Option<OpenTool>,
}

impl TurnTranscript {
    pub fn new(turn_ceiling: usize) -> Self {
        Self {
            text: String::new(),
            turn_ceiling,
            truncated: false,
            open_tool: None,
        }
    }

    /// Append incremental token text, honoring the turn ceiling.
    ///
    /// Returns whether the transcript changed; once the ceiling is hit the
    /// notice is appended exactly once and every later token is discarded.
    pub fn push_token(&mut self, token: &str) -> bool {
        if self.truncated {
            return false;
        }

        if self.text.len() >= self.turn_ceiling {
            self.append_notice();
            return true;
        }

        if self.text.len() + token.len() > self.turn_ceiling {
            let remaining = self
                .turn_ceiling
                .saturating_sub(self.text.len())
                .saturating_sub(NOTICE_RESERVE);
            if remaining > 0 {
                let mut cut = remaining.min(token.len());
                while !token.is_char_boundary(cut) {
                    cut -= 1;
                }
                self.text.push_str(&token[..cut]);
            }
            self.append_notice();
            return true;
        }

        self.text.push_str(token);
        true
    }

    /// Append a tool block with a placeholder output and open the slot.
    pub fn start_tool(&mut self, tool: &str, input: &Value) {
        if let Some(open) = self.open_tool.take() {
            tracing::warn!(
                open = %open.name,
                new = tool,
                "Tool started while another is open, abandoning the open block"
            );
        }

        let block = format_tool_block(tool, input, PROCESSING_PLACEHOLDER);
        let block_start = self.text.len();
        let block_len = block.len();
        self.text.push_str(&block);
        self.open_tool = Some(OpenTool {
            name: tool.to_string(),
            input: input.clone(),
            block_start,
            block_len,
        });
    }

    /// Replace the open tool block in place with the real output.
    ///
    /// Tokens that arrived after the placeholder stay where they are; only
    /// the block itself is rewritten.
    pub fn end_tool(&mut self, tool: &str, output: &Value) {
        let Some(open) = self.open_tool.take() else {
            tracing::warn!(tool, "Tool ended with no open block, ignoring");
            return;
        };
        if open.name != tool {
            tracing::warn!(open = %open.name, ended = tool, "Tool end does not match the open block");
        }

        let block = format_tool_block(&open.name, &open.input, &format_tool_payload(output));
        self.text
            .replace_range(open.block_start..open.block_start + open.block_len, &block);
    }

    /// Name of the tool currently awaiting its result, if any.
    pub fn current_tool(&self) -> Option<&str> {
        self.open_tool.as_ref().map(|open| open.name.as_str())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    fn append_notice(&mut self) {
        self.text.push_str(TURN_TRUNCATED_NOTICE);
        self.truncated = true;
    }
}

fn format_tool_block(tool: &str, input: &Value, output: &str) -> String {
    format!(
        "\n--- {tool} ---\ninput:\n{}\noutput:\n{output}\n---\n",
        format_tool_payload(input)
    )
}

/// Strings render as-is; everything else pretty-prints as JSON.
fn format_tool_payload(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tokens_accumulate_in_order() {
        let mut transcript = TurnTranscript::new(75_000);
        transcript.push_token("Hello");
        transcript.push_token(" there");
        assert_eq!(transcript.text(), "Hello there");
    }

    #[test]
    fn tool_end_replaces_the_placeholder_block() {
        let mut transcript = TurnTranscript::new(75_000);
        transcript.push_token("Let me check. ");
        transcript.start_tool("search", &json!({"query": "weather"}));
        assert!(transcript.text().contains(PROCESSING_PLACEHOLDER));
        assert_eq!(transcript.current_tool(), Some("search"));

        transcript.end_tool("search", &json!("sunny"));
        let text = transcript.text();
        assert!(text.contains("sunny"));
        assert!(!text.contains(PROCESSING_PLACEHOLDER));
        assert_eq!(text.matches("--- search ---").count(), 1);
        assert!(transcript.current_tool().is_none());
    }

    #[test]
    fn tokens_between_tool_start_and_end_are_preserved() {
        let mut transcript = TurnTranscript::new(75_000);
        transcript.start_tool("search", &json!("q"));
        transcript.push_token("meanwhile…");
        transcript.end_tool("search", &json!("found"));

        let text = transcript.text();
        assert!(text.contains("found"));
        assert!(text.ends_with("meanwhile…"));
    }

    #[test]
    fn unmatched_tool_end_is_ignored() {
        let mut transcript = TurnTranscript::new(75_000);
        transcript.push_token("hi");
        transcript.end_tool("search", &json!("late"));
        assert_eq!(transcript.text(), "hi");
    }

    #[test]
    fn ceiling_appends_the_notice_exactly_once() {
        let mut transcript = TurnTranscript::new(100);
        transcript.push_token(&"a".repeat(90));
        transcript.push_token(&"b".repeat(50));
        assert!(transcript.is_truncated());

        // Later tokens are discarded without a second notice.
        assert!(!transcript.push_token("more"));
        assert!(!transcript.push_token(&"c".repeat(1000)));
        assert_eq!(
            transcript.text().matches(TURN_TRUNCATED_NOTICE).count(),
            1
        );
        assert!(transcript.text().len() <= 100 + TURN_TRUNCATED_NOTICE.len());
    }

    #[test]
    fn straddling_token_keeps_a_partial_prefix() {
        let mut transcript = TurnTranscript::new(200);
        transcript.push_token(&"a".repeat(100));
        transcript.push_token(&"b".repeat(500));

        let text = transcript.text();
        assert!(text.contains('b'));
        assert!(text.ends_with(TURN_TRUNCATED_NOTICE));
        assert!(text.len() <= 200 + TURN_TRUNCATED_NOTICE.len());
    }

    #[test]
    fn string_tool_payloads_render_raw_and_objects_pretty() {
        assert_eq!(format_tool_payload(&json!("plain")), "plain");
        let pretty = format_tool_payload(&json!({"a": 1}));
        assert!(pretty.contains("\"a\": 1"));
    }
}
