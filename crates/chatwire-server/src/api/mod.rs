//! HTTP API surface: the streaming chat route plus health and history reads.

pub mod chat;
mod response;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;
pub use response::ApiResponse;

#[derive(serde::Serialize)]
struct Health {
    status: String,
}

async fn health() -> axum::Json<Health> {
    axum::Json(Health {
        status: "chatwire is working!".to_string(),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat/stream", post(chat::stream_turn))
        .route("/api/chats/{chat_id}/messages", get(chat::list_messages))
        .with_state(state)
}
