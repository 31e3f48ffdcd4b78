//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures used for communication between
//! the clients and the backend, over REST and over the chat WebSocket.
//!
//! ## Module Organization
//!
//! - [`conversation`] - Conversation CRUD and statistics
//! - [`message`] - Message listing, sending and blocking chat replies
//! - [`pagination`] - Pagination metadata returned by list endpoints
//! - [`socket`] - Client and server events of the chat channel
//!
//! ## Serialization Format
//!
//! - **Field naming**: camelCase (`#[serde(rename_all = "camelCase")]`)
//! - **Optional fields**: Omitted when `None` using `#[serde(skip_serializing_if = "Option::is_none")]`
//! - **Enums**: Serialize to lowercase strings
//!
//! ## Example JSON Communication
//!
//! ```text
//! POST /api/conversations
//! Content-Type: application/json
//!
//! { "title": "Debate" }
//! ```
//!
//! ```text
//! HTTP/1.1 201 Created
//! Content-Type: application/json
//!
//! {
//!   "id": "5f0c8a6e-3b7e-4a51-9d55-0b8f3f1f4e2a",
//!   "title": "Debate",
//!   "messageCount": 0,
//!   "status": "active",
//!   "createdAt": "2025-01-01T12:00:00Z",
//!   "updatedAt": "2025-01-01T12:00:00Z"
//! }
//! ```

pub mod conversation;
pub mod message;
pub mod pagination;
pub mod socket;

pub use conversation::*;
pub use message::*;
pub use pagination::*;
pub use socket::*;
