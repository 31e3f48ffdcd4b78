//! # Utilities Library
//!
//! Shared utility functions for environment variables, time formatting, and input validation.

pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use envs::{get_env_list, get_env_or, get_env_parse_or};
pub use time::format_short_date_time;
pub use validation::{validate_not_empty, validate_char_range};
