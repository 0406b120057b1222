//! One streamed turn, end to end: HTTP request, cooperative consume loop,
//! optimistic conversation updates, and exactly-once persistence on `Done`.
//!
//! The consume loop is a single `tokio::select!` over three suspension
//! points: the next network chunk, the pending flush timer, and the
//! cancellation signal. Tearing down clears the timer and drops the reader;
//! nothing touches session state afterwards.

use std::pin::pin;

use bytes::Bytes;
use chatwire_protocol::{ChatMessage, ChatRole, Frame, TurnRequest};
use chatwire_storage::{MessageStore, StoredMessage};
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::buffer::{BufferConfig, FlushBuffer};
use crate::error::ClientError;
use crate::parser::StreamParser;
use crate::render::RenderSink;
use crate::transcript::TurnTranscript;

/// Client-side turn tuning.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Ceiling for the accumulated turn transcript, in bytes.
    pub turn_ceiling: usize,
    pub buffer: BufferConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            turn_ceiling: 75_000,
            buffer: BufferConfig::default(),
        }
    }
}

/// How a consumed turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Completed { final_text: String },
    Cancelled,
}

/// The locally visible conversation, including optimistic entries.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn remove(&mut self, index: usize) -> ChatMessage {
        self.messages.remove(index)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Create a linked cancel handle/signal pair for one turn.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Held by the enclosing UI operation; cancelling tears the turn down.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Watched by the consume loop.
#[derive(Debug)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    async fn cancelled(&mut self) {
        if *self.rx.borrow() {
            return;
        }
        while self.rx.changed().await.is_ok() {
            if *self.rx.borrow() {
                return;
            }
        }
        // Handle dropped without cancelling: never resolves.
        futures::future::pending::<()>().await
    }
}

/// Consume a turn's byte stream and drive the render sink.
///
/// Generic over the byte source so tests can replay any chunking; the HTTP
/// path hands in `reqwest`'s body stream.
pub async fn drive_turn<B, E, S>(
    byte_stream: B,
    sink: &mut S,
    config: &ClientConfig,
    mut cancel: CancelSignal,
) -> Result<TurnOutcome, ClientError>
where
    B: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
    S: RenderSink,
{
    let mut stream = pin!(byte_stream);
    let mut parser = StreamParser::new();
    let mut transcript = TurnTranscript::new(config.turn_ceiling);
    let mut buffer = FlushBuffer::new(config.buffer.clone());
    let mut flush_deadline: Option<Instant> = None;

    loop {
        let deadline = flush_deadline.unwrap_or_else(Instant::now);
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Turn torn down mid-stream");
                return Ok(TurnOutcome::Cancelled);
            }
            _ = tokio::time::sleep_until(deadline), if flush_deadline.is_some() => {
                flush_deadline = None;
                if let Some(text) = buffer.take() {
                    sink.render(&text);
                }
            }
            chunk = stream.next() => {
                let Some(chunk) = chunk else {
                    return Err(ClientError::Interrupted(
                        "stream ended before a terminal frame".to_string(),
                    ));
                };
                let chunk = chunk.map_err(|err| ClientError::Stream(err.to_string()))?;

                for frame in parser.feed(&chunk) {
                    match frame {
                        Frame::Connected => tracing::debug!("Stream connected"),
                        Frame::Token { token } => {
                            if transcript.push_token(&token) {
                                let delay = buffer.stage(transcript.text());
                                flush_deadline = Some(Instant::now() + delay);
                            }
                        }
                        // Tool frames are rare discrete state changes; they
                        // bypass the timer and render right away.
                        Frame::ToolStart { tool, input } => {
                            transcript.start_tool(&tool, &input);
                            buffer.clear();
                            flush_deadline = None;
                            sink.render(transcript.text());
                        }
                        Frame::ToolEnd { tool, output } => {
                            transcript.end_tool(&tool, &output);
                            buffer.clear();
                            flush_deadline = None;
                            sink.render(transcript.text());
                        }
                        Frame::Error { error } => return Err(ClientError::Turn(error)),
                        Frame::Done => {
                            buffer.clear();
                            sink.render(transcript.text());
                            return Ok(TurnOutcome::Completed {
                                final_text: transcript.text().to_string(),
                            });
                        }
                    }
                }
            }
        }
    }
}

/// HTTP client for the streaming chat endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    config: ClientConfig,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            config: ClientConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Send a user message and consume the streamed turn.
    ///
    /// The user message is appended to the conversation optimistically and
    /// removed again if the turn fails, so the UI never implies a failed
    /// message was durably recorded. The assistant text is persisted exactly
    /// once, only on the `Done` path.
    pub async fn send_message<S: RenderSink>(
        &self,
        conversation: &mut Conversation,
        chat_id: &str,
        new_message: &str,
        store: &dyn MessageStore,
        sink: &mut S,
        cancel: CancelSignal,
    ) -> Result<TurnOutcome, ClientError> {
        let request = TurnRequest::new(conversation.messages().to_vec(), new_message, chat_id);

        conversation.push(ChatMessage::user(new_message));
        let optimistic = conversation.len() - 1;

        match self.run_request(&request, sink, cancel).await {
            Ok(TurnOutcome::Completed { final_text }) => {
                store
                    .append_message(
                        chat_id,
                        StoredMessage::new(ChatRole::Assistant, final_text.clone()),
                    )
                    .await?;
                conversation.push(ChatMessage::assistant(final_text.clone()));
                sink.clear();
                Ok(TurnOutcome::Completed { final_text })
            }
            Ok(TurnOutcome::Cancelled) => Ok(TurnOutcome::Cancelled),
            Err(err) => {
                conversation.remove(optimistic);
                Err(err)
            }
        }
    }

    async fn run_request<S: RenderSink>(
        &self,
        request: &TurnRequest,
        sink: &mut S,
        cancel: CancelSignal,
    ) -> Result<TurnOutcome, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/chat/stream", self.base_url))
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .header(reqwest::header::PRAGMA, "no-cache")
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        drive_turn(response.bytes_stream(), sink, &self.config, cancel).await
    }
}
