//! # Backend Service
//!
//! Thin entry point: load `.env`, validate configuration, hand over to lib-web.

use lib_core::Config;
use lib_web::{init_tracing, start_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    init_tracing(&config.log_level);
    tracing::info!(bind = %config.bind_address(), "Starting ChatterBox backend");

    start_server(config).await
}
