//! Conversation-history trimming applied before a turn starts.
//!
//! Token counts are estimated at four characters per token; trimming keeps
//! the most recent messages and re-anchors the history on a user message so
//! the agent never starts from a dangling assistant reply.

use chatwire_protocol::{ChatMessage, ChatRole};

/// Rough token estimate for a message list (4 chars per token).
pub fn estimate_tokens(messages: &[ChatMessage]) -> usize {
    let chars: usize = messages.iter().map(|message| message.content.len()).sum();
    chars.div_ceil(4)
}

/// Keep the newest messages whose combined estimate fits `max_tokens`.
pub fn trim_history(messages: &[ChatMessage], max_tokens: usize) -> Vec<ChatMessage> {
    let mut kept: Vec<ChatMessage> = Vec::new();
    let mut budget = 0usize;

    for message in messages.iter().rev() {
        let cost = message.content.len().div_ceil(4);
        if !kept.is_empty() && budget + cost > max_tokens {
            break;
        }
        budget += cost;
        kept.push(message.clone());
    }
    kept.reverse();

    // Start on a user message.
    let start = kept
        .iter()
        .position(|message| message.role == ChatRole::User)
        .unwrap_or(kept.len());
    if start > 0 {
        tracing::debug!(dropped = start, "Re-anchoring trimmed history on a user message");
    }
    kept.split_off(start)
}
