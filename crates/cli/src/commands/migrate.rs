//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! ts-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded at build time.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use terminal_shop_server::config::{ConfigError, ShopConfig};

/// Errors that can occur while talking to the database.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Neither database variable is set.
    #[error("Missing environment variable: SHOP_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect to the configured shop database.
///
/// # Errors
///
/// Returns an error if no database is configured or it cannot be reached.
pub async fn connect() -> Result<PgPool, MigrationError> {
    let config = ShopConfig::from_env()?;
    let database_url = config
        .database_url
        .ok_or(MigrationError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to shop database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}

/// Run the shop database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running shop migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Shop migrations complete!");
    Ok(())
}
