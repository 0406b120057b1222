//! The agent event source trait and the sources shipped with the workspace.

use std::pin::Pin;

use chatwire_protocol::{ChatMessage, ChatRole};
use futures::{Stream, stream};
use serde_json::Value;

use crate::error::AgentError;
use crate::event::AgentEvent;

/// Lazy, ordered, single-pass sequence of agent step events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<AgentEvent, AgentError>> + Send>>;

/// A tool-calling agent workflow, consumed one event at a time.
///
/// The returned stream is not restartable; the caller owns the timeout and
/// cancellation boundary for the whole drain.
pub trait AgentEventSource: Send + Sync {
    fn run_turn(&self, history: Vec<ChatMessage>, turn_id: &str) -> EventStream;
}

/// One step of a [`ScriptedSource`] script.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Event(AgentEvent),
    Fail(String),
}

impl ScriptStep {
    pub fn token(text: impl Into<String>) -> Self {
        ScriptStep::Event(AgentEvent::Token(text.into()))
    }

    pub fn tool_start(tool: impl Into<String>, input: Value) -> Self {
        ScriptStep::Event(AgentEvent::ToolStart {
            tool: tool.into(),
            input,
        })
    }

    pub fn tool_end(tool: impl Into<String>, output: Value) -> Self {
        ScriptStep::Event(AgentEvent::ToolEnd {
            tool: tool.into(),
            output,
        })
    }
}

/// Agent that replays a fixed script, ignoring the conversation.
///
/// Used by tests and anywhere a deterministic event sequence is needed.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: Vec<ScriptStep>,
}

impl ScriptedSource {
    pub fn new(script: Vec<ScriptStep>) -> Self {
        Self { script }
    }
}

impl AgentEventSource for ScriptedSource {
    fn run_turn(&self, _history: Vec<ChatMessage>, _turn_id: &str) -> EventStream {
        let steps = self.script.clone();
        Box::pin(stream::iter(steps.into_iter().map(|step| match step {
            ScriptStep::Event(event) => Ok(event),
            ScriptStep::Fail(message) => Err(AgentError::Step(message)),
        })))
    }
}

/// Agent that streams back a canned reply about the latest user message.
///
/// Stands in for the real workflow in the demo binary; tokens are yielded
/// lazily, one per word, the way a model delta stream arrives.
#[derive(Debug, Clone, Default)]
pub struct EchoSource;

impl AgentEventSource for EchoSource {
    fn run_turn(&self, history: Vec<ChatMessage>, turn_id: &str) -> EventStream {
        let last_user = history
            .iter()
            .rev()
            .find(|message| message.role == ChatRole::User)
            .map(|message| message.content.clone())
            .unwrap_or_default();
        tracing::debug!(turn_id, "Echo agent starting turn");

        Box::pin(async_stream::stream! {
            yield Ok(AgentEvent::Token("You said:".to_string()));
            for word in last_user.split_whitespace() {
                yield Ok(AgentEvent::Token(format!(" {word}")));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn scripted_source_replays_events_in_order() {
        let source = ScriptedSource::new(vec![
            ScriptStep::token("a"),
            ScriptStep::tool_start("search", json!({"q": 1})),
            ScriptStep::tool_end("search", json!("found")),
            ScriptStep::token("b"),
        ]);

        let events: Vec<_> = source.run_turn(Vec::new(), "turn-1").collect().await;
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], Ok(AgentEvent::Token(ref t)) if t == "a"));
        assert!(matches!(events[1], Ok(AgentEvent::ToolStart { .. })));
        assert!(matches!(events[3], Ok(AgentEvent::Token(ref t)) if t == "b"));
    }

    #[tokio::test]
    async fn scripted_failure_surfaces_as_error_item() {
        let source = ScriptedSource::new(vec![
            ScriptStep::token("partial"),
            ScriptStep::Fail("model unavailable".to_string()),
        ]);

        let events: Vec<_> = source.run_turn(Vec::new(), "turn-1").collect().await;
        assert!(matches!(events[0], Ok(AgentEvent::Token(_))));
        assert!(matches!(events[1], Err(AgentError::Step(ref m)) if m == "model unavailable"));
    }

    #[tokio::test]
    async fn echo_source_tokenizes_the_latest_user_message() {
        let history = vec![
            ChatMessage::user("old question"),
            ChatMessage::assistant("old answer"),
            ChatMessage::user("hello world"),
        ];

        let events: Vec<_> = EchoSource.run_turn(history, "turn-1").collect().await;
        let text: String = events
            .into_iter()
            .map(|event| match event.unwrap() {
                AgentEvent::Token(token) => token,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(text, "You said: hello world");
    }
}
