//! CLI subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use tiendita_server::config::{ConfigError, TienditaConfig};
use tiendita_server::db;

/// Load configuration and open the database it points at.
async fn connect() -> Result<(TienditaConfig, sqlx::SqlitePool), ConnectError> {
    let config = TienditaConfig::from_env()?;
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    Ok((config, pool))
}

/// Failure to reach the configured database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}
