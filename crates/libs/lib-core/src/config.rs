//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! ## Variables
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | `sqlite:data/chatterbox.db` |
//! | `GEMINI_API_KEY` | (required by the generation client) |
//! | `GEMINI_MODEL` | `gemini-2.0-flash` |
//! | `AI_HISTORY_WINDOW` | `50` |
//! | `AI_SYSTEM_PROMPT` | built-in persona |
//! | `HOST` / `PORT` | `127.0.0.1` / `3000` |
//! | `API_PREFIX` | `api` |
//! | `CORS_ORIGIN` | `http://localhost:5173` (comma-separated) |
//! | `WS_CORS_ORIGIN` | `http://localhost:5173` (comma-separated) |
//! | `LOG_LEVEL` | `info` |
//!
//! ```rust,no_run
//! use lib_core::Config;
//!
//! let config = Config::from_env().expect("invalid environment");
//! config.validate().expect("invalid configuration");
//! println!("listening on {}", config.bind_address());
//! ```

use lib_utils::envs::{get_env_list, get_env_or, get_env_parse_or};

/// Placeholder value shipped in `.env.example`; treated as "not configured".
pub const PLACEHOLDER_API_KEY: &str = "your_gemini_api_key_here";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_HISTORY_WINDOW: i64 = 50;
const DEFAULT_ORIGIN: &str = "http://localhost:5173";

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// API key for the Gemini generation backend
    ///
    /// May be empty here; the generation client refuses to start without it.
    pub gemini_api_key: String,

    /// Gemini model name (e.g. "gemini-2.0-flash")
    pub gemini_model: String,

    /// Optional override for the built-in persona
    pub system_prompt: Option<String>,

    /// Number of most recent messages replayed to the generator.
    /// Valid range: 1-100
    pub history_window: i64,

    pub host: String,
    pub port: u16,

    /// Path prefix of the REST API, without slashes
    pub api_prefix: String,

    /// Allowed CORS origins for the REST API
    pub cors_origins: Vec<String>,

    /// Allowed `Origin` values for WebSocket upgrades
    pub ws_cors_origins: Vec<String>,

    /// trace | debug | info | warn | error
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = get_env_or("DATABASE_URL", "sqlite:data/chatterbox.db");

        let gemini_api_key = get_env_or("GEMINI_API_KEY", "").trim().to_string();
        let gemini_model = get_env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL);

        let system_prompt = std::env::var("AI_SYSTEM_PROMPT")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let history_window = get_env_parse_or("AI_HISTORY_WINDOW", DEFAULT_HISTORY_WINDOW)
            .map_err(|_| "AI_HISTORY_WINDOW must be a valid number".to_string())?;

        let host = get_env_or("HOST", "127.0.0.1");
        let port = get_env_parse_or("PORT", 3000u16)
            .map_err(|_| "PORT must be a valid port number".to_string())?;

        let api_prefix = get_env_or("API_PREFIX", "api").trim_matches('/').to_string();

        Ok(Self {
            database_url,
            gemini_api_key,
            gemini_model,
            system_prompt,
            history_window,
            host,
            port,
            api_prefix,
            cors_origins: get_env_list("CORS_ORIGIN", DEFAULT_ORIGIN),
            ws_cors_origins: get_env_list("WS_CORS_ORIGIN", DEFAULT_ORIGIN),
            log_level: get_env_or("LOG_LEVEL", "info").to_lowercase(),
        })
    }

    /// Validate configuration values against business rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.trim().is_empty() {
            return Err("DATABASE_URL cannot be empty".to_string());
        }

        if self.gemini_model.trim().is_empty() {
            return Err("GEMINI_MODEL cannot be empty".to_string());
        }

        if self.history_window < 1 || self.history_window > 100 {
            return Err("AI_HISTORY_WINDOW must be between 1 and 100".to_string());
        }

        if self.api_prefix.is_empty() {
            return Err("API_PREFIX cannot be empty".to_string());
        }

        Ok(())
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            gemini_api_key: String::new(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            system_prompt: None,
            history_window: DEFAULT_HISTORY_WINDOW,
            host: "127.0.0.1".to_string(),
            port: 3000,
            api_prefix: "api".to_string(),
            cors_origins: vec![DEFAULT_ORIGIN.to_string()],
            ws_cors_origins: vec![DEFAULT_ORIGIN.to_string()],
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_history_window_out_of_range() {
        let config = Config { history_window: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = Config { history_window: 101, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_address() {
        let config = Config { port: 8080, ..Default::default() };
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}
