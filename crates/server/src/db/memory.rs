//! In-process repositories.
//!
//! Used when no database is configured and by tests. Contents live as long as
//! the process.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use terminal_shop_core::{
    CatalogItem, DisplayName, Fingerprint, Identity, LoginCredential, NewCatalogItem, ProductId,
};

use super::{CatalogRepository, IdentityRepository, RepositoryError};

/// Catalog held in memory, with sequence-generated IDs starting at 1.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    items: RwLock<Vec<CatalogItem>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalog {
    async fn list(&self) -> Result<Vec<CatalogItem>, RepositoryError> {
        Ok(self.items.read().await.clone())
    }

    async fn insert(&self, item: NewCatalogItem) -> Result<CatalogItem, RepositoryError> {
        let mut items = self.items.write().await;
        let next = i32::try_from(items.len())
            .ok()
            .and_then(|len| len.checked_add(1))
            .ok_or_else(|| RepositoryError::Conflict("catalog is full".to_owned()))?;

        let item = item.with_id(ProductId::new(next));
        items.push(item.clone());
        Ok(item)
    }

    async fn find(&self, id: &str, name: &str) -> Result<Option<CatalogItem>, RepositoryError> {
        let Ok(id) = id.parse::<ProductId>() else {
            return Ok(None);
        };

        Ok(self
            .items
            .read()
            .await
            .iter()
            .find(|item| item.id == id && item.name == name)
            .cloned())
    }
}

/// Identities held in memory, keyed by public key.
#[derive(Debug, Default)]
pub struct MemoryIdentities {
    by_key: Mutex<HashMap<Fingerprint, Identity>>,
}

impl MemoryIdentities {
    /// Create an empty identity store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityRepository for MemoryIdentities {
    async fn resolve(&self, credential: &LoginCredential) -> Result<Identity, RepositoryError> {
        let now = Utc::now();
        let mut by_key = self.by_key.lock().await;

        if let Some(existing) = by_key.get_mut(&credential.fingerprint) {
            existing.last_seen_at = now;
            return Ok(existing.clone());
        }

        let display_name = DisplayName::parse(&credential.username)
            .map_err(|e| RepositoryError::Conflict(e.to_string()))?;
        let identity = Identity {
            display_name,
            fingerprint: credential.fingerprint.clone(),
            key_algorithm: credential.key_algorithm.clone(),
            first_seen_at: now,
            last_seen_at: now,
        };
        by_key.insert(credential.fingerprint.clone(), identity.clone());
        Ok(identity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use terminal_shop_core::Price;

    use super::*;

    fn credential(username: &str, key: &str) -> LoginCredential {
        LoginCredential {
            username: username.to_owned(),
            key_algorithm: "ssh-ed25519".to_owned(),
            fingerprint: Fingerprint::new(key),
        }
    }

    fn listing(name: &str) -> NewCatalogItem {
        NewCatalogItem {
            name: name.to_owned(),
            price: Price::parse("3").unwrap(),
            seller_name: DisplayName::parse("sam").unwrap(),
            seller_fingerprint: Fingerprint::new("SAMKEY"),
        }
    }

    #[tokio::test]
    async fn test_catalog_assigns_sequential_ids() {
        let catalog = MemoryCatalog::new();
        let first = catalog.insert(listing("mug")).await.unwrap();
        let second = catalog.insert(listing("lamp")).await.unwrap();

        assert_eq!(first.id, ProductId::new(1));
        assert_eq!(second.id, ProductId::new(2));

        let names: Vec<_> = catalog
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, ["mug", "lamp"]);
    }

    #[tokio::test]
    async fn test_catalog_find_requires_id_and_name() {
        let catalog = MemoryCatalog::new();
        catalog.insert(listing("mug")).await.unwrap();

        assert!(catalog.find("1", "mug").await.unwrap().is_some());
        assert!(catalog.find("1", "Mug").await.unwrap().is_none());
        assert!(catalog.find("2", "mug").await.unwrap().is_none());
        assert!(catalog.find("one", "mug").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identity_first_login_creates() {
        let identities = MemoryIdentities::new();
        let identity = identities.resolve(&credential("ada", "K1")).await.unwrap();

        assert_eq!(identity.display_name.as_str(), "ada");
        assert_eq!(identity.fingerprint, Fingerprint::new("K1"));
        assert_eq!(identity.first_seen_at, identity.last_seen_at);
    }

    #[tokio::test]
    async fn test_identity_repeat_login_keeps_name_and_refreshes_last_seen() {
        let identities = MemoryIdentities::new();
        let first = identities.resolve(&credential("ada", "K1")).await.unwrap();
        let again = identities
            .resolve(&credential("someone-else", "K1"))
            .await
            .unwrap();

        assert_eq!(again.display_name.as_str(), "ada");
        assert_eq!(again.first_seen_at, first.first_seen_at);
        assert!(again.last_seen_at >= first.last_seen_at);
    }

    #[tokio::test]
    async fn test_identity_rejects_invalid_new_name() {
        let identities = MemoryIdentities::new();
        let err = identities.resolve(&credential("", "K2")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
