use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

// region: --- Limits
pub const TITLE_MAX_CHARS: usize = 200;
/// Upper bound for any stored message (assistant replies included).
pub const STORED_CONTENT_MAX_CHARS: usize = 10_000;
/// Upper bound for text typed by a user.
pub const USER_CONTENT_MAX_CHARS: usize = 5_000;
pub const PAGE_LIMIT_MAX: i64 = 100;
// endregion: --- Limits

// region: --- ConversationStatus
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Active,
    Archived,
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationStatus::Active => write!(f, "active"),
            ConversationStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for ConversationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ConversationStatus::Active),
            "archived" => Ok(ConversationStatus::Archived),
            _ => Err(format!("Invalid conversation status: {}", s)),
        }
    }
}

impl TryFrom<String> for ConversationStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
// endregion: --- ConversationStatus

// region: --- MessageRole
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            _ => Err(format!("Invalid message role: {}", s)),
        }
    }
}

impl TryFrom<String> for MessageRole {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
// endregion: --- MessageRole

/// Conversation metadata. `message_count` is maintained by the message store.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub message_count: i64,
    #[sqlx(try_from = "String")]
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Generation details recorded on assistant messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub model: Option<String>,
    pub tokens_used: Option<i64>,
    pub processing_time_ms: Option<i64>,
}

/// A stored message. Immutable once written; only deletion is allowed.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    #[sqlx(try_from = "String")]
    pub role: MessageRole,
    pub content: String,
    pub metadata: Option<Json<MessageMetadata>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn metadata(&self) -> Option<&MessageMetadata> {
        self.metadata.as_ref().map(|m| &m.0)
    }
}

/// One page of a list query (1-based).
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationStats {
    pub total_active: i64,
    pub total_archived: i64,
}

impl ConversationStats {
    pub fn total(&self) -> i64 {
        self.total_active + self.total_archived
    }
}

/// A 1-based page request clamped into range: page at least 1, limit in
/// `1..=PAGE_LIMIT_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
}

impl PageWindow {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, PAGE_LIMIT_MAX),
        }
    }

    /// Rows to skip. Saturates for absurd page numbers, which just read past the end.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// User-typed text: 1 to `USER_CONTENT_MAX_CHARS` characters, not whitespace-only.
pub fn validate_user_content(content: &str) -> crate::Result<()> {
    lib_utils::validate_not_empty(content, "Message").map_err(crate::AppError::InvalidInput)?;
    lib_utils::validate_char_range(content, 1, USER_CONTENT_MAX_CHARS, "Message")
        .map_err(crate::AppError::InvalidInput)
}
