//! Application state shared across sessions.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cart::CartStore;
use crate::config::ShopConfig;
use crate::db::{
    CatalogRepository, IdentityRepository, MemoryCatalog, MemoryIdentities, PgCatalogRepository,
    PgIdentityRepository,
};

/// Application state shared across all sessions.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// stores every session works against.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ShopConfig,
    catalog: Arc<dyn CatalogRepository>,
    identities: Arc<dyn IdentityRepository>,
    carts: CartStore,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create state backed by `PostgreSQL`.
    #[must_use]
    pub fn with_pool(config: ShopConfig, pool: PgPool) -> Self {
        Self::build(
            config,
            Arc::new(PgCatalogRepository::new(pool.clone())),
            Arc::new(PgIdentityRepository::new(pool.clone())),
            Some(pool),
        )
    }

    /// Create state that keeps the catalog and users in memory.
    #[must_use]
    pub fn in_memory(config: ShopConfig) -> Self {
        Self::build(
            config,
            Arc::new(MemoryCatalog::new()),
            Arc::new(MemoryIdentities::new()),
            None,
        )
    }

    /// Create state around arbitrary store implementations.
    #[must_use]
    pub fn with_stores(
        config: ShopConfig,
        catalog: Arc<dyn CatalogRepository>,
        identities: Arc<dyn IdentityRepository>,
    ) -> Self {
        Self::build(config, catalog, identities, None)
    }

    fn build(
        config: ShopConfig,
        catalog: Arc<dyn CatalogRepository>,
        identities: Arc<dyn IdentityRepository>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                identities,
                carts: CartStore::new(),
                pool,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.inner.config
    }

    /// Get the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogRepository {
        self.inner.catalog.as_ref()
    }

    /// Get the identity store.
    #[must_use]
    pub fn identities(&self) -> &dyn IdentityRepository {
        self.inner.identities.as_ref()
    }

    /// Get the process-wide cart store.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }

    /// Get the database pool, if the server runs against `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
