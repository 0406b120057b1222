//! Step events produced while an agent works through a turn.

use serde_json::Value;

/// One step event from the agent workflow.
///
/// Tool spans do not nest: a `ToolEnd` always matches the most recent
/// `ToolStart`, with `Token` events free to interleave between them.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Incremental model text.
    Token(String),
    /// A tool invocation began.
    ToolStart { tool: String, input: Value },
    /// A tool invocation finished.
    ToolEnd { tool: String, output: Value },
}
