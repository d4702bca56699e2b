//! User repository for `PostgreSQL`.
//!
//! Users are keyed by public key. Resolution is a single upsert so that two
//! sessions logging in with a new key at the same time cannot both insert it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use terminal_shop_core::{DisplayName, Fingerprint, Identity, LoginCredential};

use super::{IdentityRepository, RepositoryError, map_constraint_error};

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    username: String,
    pub_key: String,
    key_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for Identity {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let display_name = DisplayName::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            display_name,
            fingerprint: Fingerprint::from(row.pub_key),
            key_algorithm: row.key_type,
            first_seen_at: row.created_at,
            last_seen_at: row.updated_at,
        })
    }
}

/// Identities stored in the `users` table.
#[derive(Debug, Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepository for PgIdentityRepository {
    async fn resolve(&self, credential: &LoginCredential) -> Result<Identity, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (username, pub_key, key_type)
            VALUES ($1, $2, $3)
            ON CONFLICT (pub_key) DO UPDATE SET updated_at = now()
            RETURNING username, pub_key, key_type,
                      created_at, updated_at
            ",
        )
        .bind(&credential.username)
        .bind(credential.fingerprint.as_str())
        .bind(&credential.key_algorithm)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "public key is already registered"))?;

        Identity::try_from(row)
    }
}
