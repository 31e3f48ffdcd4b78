//! # Server Setup
//!
//! Builds the application state, registers routes and middleware, and
//! starts the HTTP server.

// region: --- Imports
use axum::extract::FromRef;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use lib_ai::{AiService, GeminiClient};
use lib_core::model::store::{ConversationRepository, MessageRepository};
use lib_core::model::{ConversationStore, MessageStore};
use lib_core::{create_pool, migrate, Config, DbPool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::chat::{ChatGateway, ChatService};
use crate::handlers;
use crate::middleware::{log_requests, stamp_req, RequestStamp};
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub conversations: Arc<dyn ConversationStore>,
    pub messages: Arc<dyn MessageStore>,
    pub chat: ChatService,
    pub gateway: Arc<ChatGateway>,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ConversationStore> {
    fn from_ref(state: &AppState) -> Self {
        state.conversations.clone()
    }
}

impl FromRef<AppState> for Arc<dyn MessageStore> {
    fn from_ref(state: &AppState) -> Self {
        state.messages.clone()
    }
}

impl FromRef<AppState> for ChatService {
    fn from_ref(state: &AppState) -> Self {
        state.chat.clone()
    }
}

impl FromRef<AppState> for Arc<ChatGateway> {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}
// endregion: --- AppState

// region: --- Tracing
/// Install the global fmt subscriber. `log_level` is one of
/// trace | debug | info | warn | error; anything else means info.
pub fn init_tracing(log_level: &str) {
    let filter = match log_level {
        "trace" => tracing_subscriber::EnvFilter::new("trace"),
        "debug" => tracing_subscriber::EnvFilter::new("debug"),
        "warn" => tracing_subscriber::EnvFilter::new("warn"),
        "error" => tracing_subscriber::EnvFilter::new("error"),
        _ => tracing_subscriber::EnvFilter::new("info"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .finish();

    // A second call (e.g. from tests) keeps the first subscriber.
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Global tracing subscriber already set");
    }
}
// endregion: --- Tracing

// region: --- Server Setup
/// Initialize and start the HTTP server.
///
/// # Errors
///
/// - The SQLite directory cannot be created
/// - Database connection or migrations fail
/// - The Gemini API key is missing (the server refuses to start)
/// - The listener cannot bind
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    info!("CHATTERBOX BACKEND STARTING");
    info!(log_level = %config.log_level, model = %config.gemini_model, "Configuration loaded");

    ensure_sqlite_dir(&config.database_url)?;

    info!("Connecting to database...");
    let db = create_pool(&config.database_url).await?;

    info!("Running database migrations...");
    migrate(&db).await?;
    info!("Migrations complete");

    let generator = Arc::new(GeminiClient::from_config(&config)?);
    let state = build_state(db, config, generator);

    let bind_address = state.config.bind_address();
    let api_prefix = state.config.api_prefix.clone();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("SERVER READY: http://{}", bind_address);
    log_server_info(&api_prefix);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Wire stores, the AI service and the chat gateway together.
pub fn build_state(db: DbPool, config: Config, generator: Arc<dyn lib_ai::TextGenerator>) -> AppState {
    let conversations: Arc<dyn ConversationStore> = Arc::new(ConversationRepository::new(db.clone()));
    let messages: Arc<dyn MessageStore> = Arc::new(MessageRepository::new(db.clone()));

    let ai = AiService::new(generator, config.system_prompt.clone());
    let chat = ChatService::new(messages.clone(), ai, config.history_window);
    let gateway = Arc::new(ChatGateway::new(chat.clone()));

    AppState {
        db,
        config: Arc::new(config),
        conversations,
        messages,
        chat,
        gateway,
    }
}

/// Create the parent directory of a file-backed SQLite database.
fn ensure_sqlite_dir(database_url: &str) -> anyhow::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let db_path = db_path.trim_start_matches("//");
    if db_path.contains(":memory:") {
        return Ok(());
    }

    let db_path = db_path.split('?').next().unwrap_or(db_path);
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!("Created database directory: {:?}", parent);
        }
    }
    Ok(())
}

/// Create the main application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([crate::middleware::mw_req_stamp::REQUEST_ID_HEADER]);

    info!("[ROUTE SETUP] Registering HTTP routes...");
    let api = Router::new()
        .route(
            "/conversations",
            post(handlers::conversations::create_conversation).get(handlers::conversations::list_conversations),
        )
        .route("/conversations/stats", get(handlers::conversations::conversation_stats))
        .route(
            "/conversations/{id}",
            get(handlers::conversations::get_conversation).delete(handlers::conversations::delete_conversation),
        )
        .route("/conversations/{id}/title", patch(handlers::conversations::update_title))
        .route("/conversations/{id}/archive", patch(handlers::conversations::archive_conversation))
        .route(
            "/conversations/{id}/messages",
            post(handlers::messages::send_message).get(handlers::messages::list_messages),
        )
        .route("/conversations/{id}/messages/last", get(handlers::messages::last_message))
        .route(
            "/conversations/{id}/messages/{message_id}",
            delete(handlers::messages::delete_message),
        )
        .route("/conversations/{id}/chat", post(handlers::chat::chat_reply))
        .route("/health/ai", get(handlers::chat::ai_health));

    let api_prefix = format!("/{}", state.config.api_prefix);

    Router::new()
        .nest(&api_prefix, api)
        .route("/chat", get(handlers::websocket::chat_websocket))
        .route("/health", get(|| async { "OK" }))
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            (StatusCode::NOT_FOUND, "Route not found")
        })
        .with_state(state)
        .layer(axum::middleware::from_fn(log_requests))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::error!(error = ?error, latency_ms = latency.as_millis() as u64, "[HTTP FAILURE]");
                    },
                ),
        )
        // Outermost: the stamp must exist before the span and the logs read it.
        .layer(axum::middleware::from_fn(stamp_req))
        .layer(cors)
}

fn log_server_info(api_prefix: &str) {
    info!(" CONVERSATIONS:");
    info!("   • POST   /{}/conversations", api_prefix);
    info!("   • GET    /{}/conversations?page=1&limit=20&status=active", api_prefix);
    info!("   • GET    /{}/conversations/stats", api_prefix);
    info!("   • GET    /{}/conversations/{{id}}", api_prefix);
    info!("   • PATCH  /{}/conversations/{{id}}/title", api_prefix);
    info!("   • PATCH  /{}/conversations/{{id}}/archive", api_prefix);
    info!("   • DELETE /{}/conversations/{{id}}", api_prefix);
    info!(" MESSAGES:");
    info!("   • POST   /{}/conversations/{{id}}/messages", api_prefix);
    info!("   • GET    /{}/conversations/{{id}}/messages?page=1&limit=50", api_prefix);
    info!("   • GET    /{}/conversations/{{id}}/messages/last", api_prefix);
    info!("   • DELETE /{}/conversations/{{id}}/messages/{{messageId}}", api_prefix);
    info!(" CHAT:");
    info!("   • POST   /{}/conversations/{{id}}/chat", api_prefix);
    info!("   • WS     /chat (join:conversation, leave:conversation, send:message)");
    info!(" HEALTH:");
    info!("   • GET    /health");
    info!("   • GET    /{}/health/ai", api_prefix);
}
// endregion: --- Server Setup

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_sqlite_dir_ignores_memory_databases() {
        assert!(ensure_sqlite_dir("sqlite::memory:").is_ok());
        assert!(ensure_sqlite_dir("postgres://localhost/db").is_ok());
    }
}
