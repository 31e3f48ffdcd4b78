//! # Model Layer
//!
//! Persistent entities and the stores that own them.

pub mod store;

pub use store::models::{
    validate_user_content, Conversation, ConversationStats, ConversationStatus, Message, MessageMetadata,
    MessageRole, Page,
};
pub use store::{ConversationStore, MessageStore};
