//! # Chat Socket Events
//!
//! Events exchanged over the `/chat` WebSocket. Every frame is a JSON text
//! message shaped as `{"event": "<name>", "data": {...}}`.
//!
//! | Direction | Event | Payload |
//! |---|---|---|
//! | client → server | `join:conversation` | [`ConversationRef`] |
//! | client → server | `leave:conversation` | [`ConversationRef`] |
//! | client → server | `send:message` | [`SendMessagePayload`] |
//! | server → client | `joined:conversation` | [`MembershipPayload`] |
//! | server → client | `left:conversation` | [`MembershipPayload`] |
//! | server → client | `message:saved` | [`MessageSavedPayload`] |
//! | server → client | `ai:typing` | [`TypingPayload`] |
//! | server → client | `ai:response:stream` | [`StreamChunkPayload`] |
//! | server → client | `ai:response:complete` | [`ResponseCompletePayload`] |
//! | server → client | `error` | [`ErrorPayload`] |

use serde::{Deserialize, Serialize};

// region: --- Client Events

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "join:conversation")]
    JoinConversation(ConversationRef),
    #[serde(rename = "leave:conversation")]
    LeaveConversation(ConversationRef),
    #[serde(rename = "send:message")]
    SendMessage(SendMessagePayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRef {
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub conversation_id: String,
    pub message: String,
}

// endregion: --- Client Events

// region: --- Server Events

/// Events the server emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "joined:conversation")]
    JoinedConversation(MembershipPayload),
    #[serde(rename = "left:conversation")]
    LeftConversation(MembershipPayload),
    #[serde(rename = "message:saved")]
    MessageSaved(MessageSavedPayload),
    #[serde(rename = "ai:typing")]
    AiTyping(TypingPayload),
    #[serde(rename = "ai:response:stream")]
    AiResponseStream(StreamChunkPayload),
    #[serde(rename = "ai:response:complete")]
    AiResponseComplete(ResponseCompletePayload),
    #[serde(rename = "error")]
    Error(ErrorPayload),
}

impl ServerEvent {
    /// Wire name of the event, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::JoinedConversation(_) => "joined:conversation",
            ServerEvent::LeftConversation(_) => "left:conversation",
            ServerEvent::MessageSaved(_) => "message:saved",
            ServerEvent::AiTyping(_) => "ai:typing",
            ServerEvent::AiResponseStream(_) => "ai:response:stream",
            ServerEvent::AiResponseComplete(_) => "ai:response:complete",
            ServerEvent::Error(_) => "error",
        }
    }

    pub fn typing(conversation_id: &str, is_typing: bool) -> Self {
        ServerEvent::AiTyping(TypingPayload {
            conversation_id: conversation_id.to_string(),
            is_typing,
        })
    }

    pub fn error(message: impl Into<String>, details: Option<String>) -> Self {
        ServerEvent::Error(ErrorPayload {
            message: message.into(),
            details,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPayload {
    pub conversation_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSavedPayload {
    pub conversation_id: String,
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub conversation_id: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChunkPayload {
    pub conversation_id: String,
    pub chunk: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCompletePayload {
    pub conversation_id: String,
    pub message_id: String,
    pub content: String,
    /// Milliseconds
    pub processing_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// endregion: --- Server Events
