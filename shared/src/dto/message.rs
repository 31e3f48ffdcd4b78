//! # Message Data Transfer Objects
//!
//! Request and response structures for message history, REST sends and the
//! blocking chat endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pagination::Pagination;

/// Request body carrying user text (`POST .../messages` and `POST .../chat`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessageRequest {
    pub content: String,
}

/// Generation metadata attached to assistant messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadataResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<i64>,
}

/// Message as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    /// `user` or `assistant`
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadataResponse>,
    pub created_at: DateTime<Utc>,
}

/// Response to a REST send: the stored user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub user_message: MessageResponse,
    pub conversation_id: String,
}

/// Page of messages, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListResponse {
    pub messages: Vec<MessageResponse>,
    pub pagination: Pagination,
}

/// Result of one blocking chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReplyResponse {
    pub user_message_id: String,
    pub assistant_message_id: String,
    pub content: String,
    /// Wall-clock duration of the turn in milliseconds
    pub processing_time: i64,
}

/// Health of the text generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiHealthResponse {
    /// `ok` or `error`
    pub status: String,
    pub model: String,
    pub configured: bool,
}
