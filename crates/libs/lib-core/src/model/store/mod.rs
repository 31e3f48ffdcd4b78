//! # Database Store
//!
//! SQLite connection pool, embedded migrations, and the conversation/message stores.

// region: --- Modules
pub mod models;
pub mod traits;
pub mod conversation_repository;
pub mod message_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use traits::{ConversationStore, MessageStore};
pub use conversation_repository::ConversationRepository;
pub use message_repository::MessageRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Create a new SQLite connection pool.
///
/// `sqlite::memory:` yields a single long-lived connection, since every
/// connection to an in-memory database sees its own empty database.
pub async fn create_pool(database_url: &str) -> crate::Result<DbPool> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };

    Ok(pool)
}

/// Run all embedded migrations from `lib-core/migrations/`.
pub async fn migrate(pool: &DbPool) -> crate::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
// endregion: --- Types and Functions
