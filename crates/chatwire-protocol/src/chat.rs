//! Chat message and turn request models exchanged at the HTTP boundary.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Single message of the visible conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request body of `POST /api/chat/stream`: prior history, the new user
/// message, and the chat identifier the turn belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub new_message: String,
    pub chat_id: String,
}

impl TurnRequest {
    pub fn new(
        messages: Vec<ChatMessage>,
        new_message: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            messages,
            new_message: new_message.into(),
            chat_id: chat_id.into(),
        }
    }

    /// A turn needs a non-empty message and a chat to attach it to.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.new_message.trim().is_empty() {
            return Err(ProtocolError::InvalidRequest(
                "newMessage must not be empty".to_string(),
            ));
        }
        if self.chat_id.trim().is_empty() {
            return Err(ProtocolError::InvalidRequest(
                "chatId must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_field_names() {
        let request = TurnRequest::new(vec![ChatMessage::user("hi")], "follow up", "chat-1");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["newMessage"], "follow up");
        assert_eq!(value["chatId"], "chat-1");
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn missing_history_defaults_to_empty() {
        let request: TurnRequest =
            serde_json::from_str(r#"{"newMessage":"hi","chatId":"chat-1"}"#).unwrap();
        assert!(request.messages.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn blank_message_or_chat_id_is_rejected() {
        let request = TurnRequest::new(Vec::new(), "  ", "chat-1");
        assert!(request.validate().is_err());

        let request = TurnRequest::new(Vec::new(), "hi", "");
        assert!(request.validate().is_err());
    }
}
