//! # Core Library
//!
//! Core models, database stores, configuration, and error handling for the application.

pub mod config;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::store::{DbPool, create_pool, migrate};
