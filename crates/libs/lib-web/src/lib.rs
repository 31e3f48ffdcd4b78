//! # Web Library
//!
//! HTTP and WebSocket surface of ChatterBox: REST handlers, the `/chat`
//! socket gateway, middleware, and server startup.

pub mod chat;
pub mod handlers;
pub mod middleware;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use server::{build_state, create_router, init_tracing, start_server, AppState};
