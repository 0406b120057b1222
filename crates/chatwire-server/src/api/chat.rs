//! The streaming chat route: one request, one agent turn, one SSE stream.

use std::time::Duration;

use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chatwire_agent::{AgentEvent, trim_history};
use chatwire_protocol::{ChatMessage, ChatRole, Frame, TurnRequest};
use chatwire_storage::StoredMessage;
use futures::StreamExt;
use serde::Serialize;

use crate::api::ApiResponse;
use crate::emitter::SseEmitter;
use crate::error::TurnError;
use crate::state::AppState;
use crate::transport::byte_channel;

// POST /api/chat/stream
pub async fn stream_turn(
    State(state): State<AppState>,
    Json(request): Json<TurnRequest>,
) -> Response {
    if let Err(err) = request.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(err.to_string())),
        )
            .into_response();
    }

    let turn_id = uuid::Uuid::new_v4().to_string();
    let (writer, body) = byte_channel(&state.config.limits);
    let emitter = SseEmitter::new(writer, state.config.limits.clone());

    tracing::debug!(turn_id, chat_id = %request.chat_id, "Starting streamed turn");
    tokio::spawn(run_turn(state, request, turn_id, emitter));

    // Headers keep intermediaries from buffering the byte stream whole.
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache, no-transform"),
            (header::CONNECTION, "keep-alive"),
            (header::HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Body::from_stream(body),
    )
        .into_response()
}

/// Drive one turn to completion. `close()` runs on every exit path: success,
/// agent error, timeout, and transport failure alike.
async fn run_turn(state: AppState, request: TurnRequest, turn_id: String, mut emitter: SseEmitter) {
    let timeout = Duration::from_secs(state.config.turn_timeout_secs);
    let outcome =
        tokio::time::timeout(timeout, drive_turn(&state, &request, &turn_id, &mut emitter)).await;

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(TurnError::Transport(err))) => {
            tracing::warn!(turn_id, error = %err, "Transport failed mid-turn");
        }
        Ok(Err(err)) => {
            tracing::warn!(turn_id, error = %err, "Turn failed");
            if let Err(write_err) = emitter.emit(&Frame::error(err.to_string())).await {
                tracing::warn!(turn_id, error = %write_err, "Could not deliver error frame");
            }
        }
        Err(_) => {
            tracing::warn!(turn_id, timeout_secs = timeout.as_secs(), "Turn timed out");
            let message = format!("Turn timed out after {} seconds", timeout.as_secs());
            if let Err(write_err) = emitter.emit(&Frame::error(message)).await {
                tracing::warn!(turn_id, error = %write_err, "Could not deliver timeout frame");
            }
        }
    }

    emitter.close().await;
}

async fn drive_turn(
    state: &AppState,
    request: &TurnRequest,
    turn_id: &str,
    emitter: &mut SseEmitter,
) -> Result<(), TurnError> {
    emitter.connect().await?;

    state
        .store
        .append_message(
            &request.chat_id,
            StoredMessage::new(ChatRole::User, request.new_message.clone()),
        )
        .await?;

    let mut history = trim_history(&request.messages, state.config.history_max_tokens);
    history.push(ChatMessage::user(request.new_message.clone()));

    // Forward one event at a time; the agent stream is never pre-buffered.
    let mut events = state.agent.run_turn(history, turn_id);
    while let Some(event) = events.next().await {
        let frame = match event {
            Ok(AgentEvent::Token(token)) => {
                if token.is_empty() {
                    continue;
                }
                Frame::Token { token }
            }
            Ok(AgentEvent::ToolStart { tool, input }) => Frame::ToolStart { tool, input },
            Ok(AgentEvent::ToolEnd { tool, output }) => Frame::ToolEnd { tool, output },
            Err(err) => return Err(TurnError::Agent(err.to_string())),
        };
        emitter.emit(&frame).await?;
    }

    emitter.emit(&Frame::Done).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct MessageView {
    pub role: ChatRole,
    pub content: String,
    pub created_at: i64,
}

// GET /api/chats/{chat_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Json<ApiResponse<Vec<MessageView>>> {
    match state.store.messages(&chat_id).await {
        Ok(messages) => Json(ApiResponse::ok(
            messages
                .into_iter()
                .map(|message| MessageView {
                    role: message.role,
                    content: message.content,
                    created_at: message.created_at,
                })
                .collect(),
        )),
        Err(err) => Json(ApiResponse::error(format!(
            "Failed to list messages: {}",
            err
        ))),
    }
}
