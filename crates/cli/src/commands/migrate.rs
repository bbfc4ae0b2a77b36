//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! tiendita migrate
//! ```
//!
//! # Environment Variables
//!
//! - `TIENDITA_DATABASE_URL` - `SQLite` URL (default `sqlite://tiendita.db`)
//!
//! The server applies the same migrations at startup; this command exists to
//! prepare a database ahead of time.

use thiserror::Error;

use super::ConnectError;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let (_, pool) = super::connect().await?;

    tracing::info!("Running migrations...");
    tiendita_server::db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
