//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between chat clients and the backend.
//! All DTOs use JSON serialization via `serde`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects for API communication
//!   - **[`dto::conversation`]**: Conversation management DTOs
//!   - **[`dto::message`]**: Message history and chat reply DTOs
//!   - **[`dto::pagination`]**: Pagination envelope shared by list endpoints
//!   - **[`dto::socket`]**: WebSocket events exchanged on the `/chat` channel
//!
//! ## Wire Format
//!
//! Unlike Rust field naming, the wire format is **camelCase**
//! (`messageCount`, `conversationId`, `hasNextPage`), since the consumers are
//! browser clients.
//!
//! ## Usage in Backend
//!
//! ```rust,ignore
//! use shared::dto::conversation::{CreateConversationRequest, ConversationResponse};
//! use axum::Json;
//!
//! async fn create(Json(request): Json<CreateConversationRequest>) -> Json<ConversationResponse> {
//!     # todo!()
//! }
//! ```

pub mod dto;

pub use dto::*;
