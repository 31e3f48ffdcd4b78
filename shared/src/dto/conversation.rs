//! # Conversation Data Transfer Objects
//!
//! Request and response structures for the conversation endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pagination::Pagination;

/// Request to create a conversation. A dated default title is used when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateConversationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Request to rename a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTitleRequest {
    pub title: String,
}

/// Query string for `GET /conversations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListConversationsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// `active` or `archived`
    pub status: Option<String>,
}

/// Conversation as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: String,
    pub title: String,
    pub message_count: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Page of conversations, most recently updated first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationResponse>,
    pub pagination: Pagination,
}

/// Conversation counts by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStatsResponse {
    pub total_active: i64,
    pub total_archived: i64,
    pub total: i64,
}
