//! # Chat Module
//!
//! Real-time chat with the AI assistant.
//!
//! - [`service`]: one chat turn, blocking or streamed
//! - [`gateway`]: the socket protocol (join, leave, send)
//! - [`sessions`]: which conversation each connection is attached to
//! - [`locks`]: one turn per conversation at a time

pub mod gateway;
pub mod locks;
pub mod service;
pub mod sessions;

pub use gateway::ChatGateway;
pub use locks::ConversationLocks;
pub use service::{ChatService, ChatStream, ProcessMessageResult, StreamingEvent};
pub use sessions::{SessionRegistry, SessionState};

#[cfg(test)]
mod tests;
