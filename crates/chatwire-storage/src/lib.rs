//! Chatwire Storage - The message persistence boundary.
//!
//! The streaming pipeline only needs two things from storage: append a
//! message to a chat and read a chat back. The schema behind that interface
//! belongs to the hosting application; this crate ships the trait plus an
//! in-memory implementation used by tests and the demo server.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chatwire_protocol::ChatRole;
use thiserror::Error;
use tokio::sync::RwLock;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// A persisted chat message
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub role: ChatRole,
    pub content: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

impl StoredMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Message persistence keyed by chat id.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append_message(&self, chat_id: &str, message: StoredMessage) -> Result<()>;
    async fn messages(&self, chat_id: &str) -> Result<Vec<StoredMessage>>;
}

/// In-memory store for tests and the demo server.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    chats: Arc<RwLock<HashMap<String, Vec<StoredMessage>>>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append_message(&self, chat_id: &str, message: StoredMessage) -> Result<()> {
        let mut chats = self.chats.write().await;
        chats.entry(chat_id.to_string()).or_default().push(message);
        Ok(())
    }

    async fn messages(&self, chat_id: &str) -> Result<Vec<StoredMessage>> {
        let chats = self.chats.read().await;
        Ok(chats.get(chat_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appended_messages_come_back_in_order() {
        let store = MemoryMessageStore::new();
        store
            .append_message("chat-1", StoredMessage::new(ChatRole::User, "hi"))
            .await
            .unwrap();
        store
            .append_message("chat-1", StoredMessage::new(ChatRole::Assistant, "hello"))
            .await
            .unwrap();

        let messages = store.messages("chat-1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn chats_are_isolated() {
        let store = MemoryMessageStore::new();
        store
            .append_message("chat-1", StoredMessage::new(ChatRole::User, "hi"))
            .await
            .unwrap();

        assert!(store.messages("chat-2").await.unwrap().is_empty());
    }
}
