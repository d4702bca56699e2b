//! Catalog and identity storage.
//!
//! # Database: `terminal_shop`
//!
//! ## Tables
//!
//! - `users` - One row per public key, with the display name it first logged in with
//! - `products` - Items listed for sale
//!
//! Carts are never persisted; see [`crate::cart`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p terminal-shop-cli -- migrate
//! ```
//!
//! # Implementations
//!
//! The session engine only sees the [`CatalogRepository`] and
//! [`IdentityRepository`] traits. [`products`] and [`users`] implement them on
//! `PostgreSQL`; [`memory`] keeps everything in process for local runs and tests.

pub mod memory;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use terminal_shop_core::{CatalogItem, Identity, LoginCredential, NewCatalogItem};

pub use memory::{MemoryCatalog, MemoryIdentities};
pub use products::PgCatalogRepository;
pub use users::PgIdentityRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unknown seller key).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Items available for sale.
///
/// Implementations must be safe to share across sessions; every session
/// holds the same instance.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Lists every item, in the store's natural order.
    async fn list(&self) -> Result<Vec<CatalogItem>, RepositoryError>;

    /// Stores a new item and returns it with its assigned ID.
    async fn insert(&self, item: NewCatalogItem) -> Result<CatalogItem, RepositoryError>;

    /// Finds the item with exactly this ID and name.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(item))`: both ID and name match
    /// - `Ok(None)`: no such item (including IDs that are not numeric)
    /// - `Err(_)`: the store could not be queried
    async fn find(&self, id: &str, name: &str) -> Result<Option<CatalogItem>, RepositoryError>;
}

/// Users known by public key.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Records a login and returns the canonical identity for the key.
    ///
    /// The first login with a key creates the identity using the credential's
    /// user name; later logins only refresh `last_seen_at` and keep the
    /// stored name.
    async fn resolve(&self, credential: &LoginCredential) -> Result<Identity, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique or foreign key violation to `Conflict`.
fn map_constraint_error(e: sqlx::Error, context: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(context.to_owned());
    }
    RepositoryError::Database(e)
}
