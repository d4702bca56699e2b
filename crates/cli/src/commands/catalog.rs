//! Catalog inspection.
//!
//! # Usage
//!
//! ```bash
//! ts-cli catalog list
//! ```

use terminal_shop_server::db::{CatalogRepository, PgCatalogRepository, RepositoryError};
use terminal_shop_server::shell::render;
use thiserror::Error;

use super::migrate::{self, MigrationError};

/// Errors that can occur while reading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Could not connect.
    #[error(transparent)]
    Connect(#[from] MigrationError),

    /// The query failed.
    #[error("Catalog error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Print the catalog in the same table the shell shows.
///
/// # Errors
///
/// Returns an error if the database is unreachable or holds invalid rows.
pub async fn list() -> Result<(), CatalogError> {
    let pool = migrate::connect().await?;
    let items = PgCatalogRepository::new(pool).list().await?;

    tracing::info!("Found {} catalog items", items.len());

    #[allow(clippy::print_stdout)]
    {
        print!("{}", render::catalog_table(&items));
    }
    Ok(())
}
