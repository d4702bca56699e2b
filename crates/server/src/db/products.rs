//! Product repository for `PostgreSQL`.

use async_trait::async_trait;
use sqlx::PgPool;

use terminal_shop_core::{
    CatalogItem, DisplayName, Fingerprint, NewCatalogItem, Price, ProductId,
};

use super::{CatalogRepository, RepositoryError, map_constraint_error};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Price,
    seller_name: String,
    seller_key: String,
}

impl TryFrom<ProductRow> for CatalogItem {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let seller_name = DisplayName::parse(&row.seller_name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid seller name in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            price: row.price,
            seller_name,
            seller_fingerprint: Fingerprint::from(row.seller_key),
        })
    }
}

/// Catalog stored in the `products` table.
#[derive(Debug, Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn list(&self) -> Result<Vec<CatalogItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, seller_name, seller_key
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CatalogItem::try_from).collect()
    }

    async fn insert(&self, item: NewCatalogItem) -> Result<CatalogItem, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO products (name, price, seller_name, seller_key)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&item.name)
        .bind(item.price)
        .bind(item.seller_name.as_str())
        .bind(item.seller_fingerprint.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "seller is not a registered user"))?;

        tracing::debug!(product_id = %id, "Product inserted");
        Ok(item.with_id(id))
    }

    async fn find(&self, id: &str, name: &str) -> Result<Option<CatalogItem>, RepositoryError> {
        let Ok(id) = id.parse::<ProductId>() else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, seller_name, seller_key
            FROM products
            WHERE id = $1 AND name = $2
            ",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CatalogItem::try_from).transpose()
    }
}
