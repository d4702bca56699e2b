//! Catalog and identity stores on `PostgreSQL`.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied (`ts-cli migrate`)
//! - `TEST_DATABASE_URL` pointing at it
//!
//! Run with: cargo test -p terminal-shop-integration-tests -- --ignored

use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use terminal_shop_core::{DisplayName, Fingerprint, NewCatalogItem, Price};
use terminal_shop_integration_tests::credential;
use terminal_shop_server::db::{
    CatalogRepository, IdentityRepository, PgCatalogRepository, PgIdentityRepository,
    RepositoryError, create_pool,
};

async fn pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database")
}

/// A key no other test run will have used.
fn unique_key() -> String {
    format!("AAAATEST{}", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_first_login_creates_identity_and_later_logins_keep_name() {
    let users = PgIdentityRepository::new(pool().await);
    let key = unique_key();

    let first = users
        .resolve(&credential("ada", &key))
        .await
        .expect("first login");
    assert_eq!(first.display_name.as_str(), "ada");
    assert_eq!(first.key_algorithm, "ssh-ed25519");

    let second = users
        .resolve(&credential("someone-else", &key))
        .await
        .expect("second login");
    assert_eq!(second.display_name.as_str(), "ada");
    assert_eq!(second.first_seen_at, first.first_seen_at);
    assert!(second.last_seen_at >= first.last_seen_at);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_insert_list_and_find() {
    let pool = pool().await;
    let users = PgIdentityRepository::new(pool.clone());
    let catalog = PgCatalogRepository::new(pool);
    let key = unique_key();

    users
        .resolve(&credential("seller", &key))
        .await
        .expect("seller login");

    let name = format!("lamp-{}", Uuid::new_v4().simple());
    let item = catalog
        .insert(NewCatalogItem {
            name: name.clone(),
            price: Price::parse("12.5").expect("price"),
            seller_name: DisplayName::parse("seller").expect("name"),
            seller_fingerprint: Fingerprint::new(key.clone()),
        })
        .await
        .expect("insert");
    assert_eq!(item.price.to_string(), "$12.50");

    let listed = catalog.list().await.expect("list");
    assert!(listed.iter().any(|i| i.id == item.id && i.name == name));
    assert!(listed.windows(2).all(|w| w[0].id < w[1].id));

    let found = catalog
        .find(&item.id.to_string(), &name)
        .await
        .expect("find");
    assert_eq!(found.map(|i| i.id), Some(item.id));

    let wrong_name = catalog
        .find(&item.id.to_string(), "not-this")
        .await
        .expect("find");
    assert!(wrong_name.is_none());

    let not_numeric = catalog.find("abc", &name).await.expect("find");
    assert!(not_numeric.is_none());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_insert_for_unknown_seller_is_conflict() {
    let catalog = PgCatalogRepository::new(pool().await);

    let err = catalog
        .insert(NewCatalogItem {
            name: "orphan".to_string(),
            price: Price::parse("1").expect("price"),
            seller_name: DisplayName::parse("ghost").expect("name"),
            seller_fingerprint: Fingerprint::new(unique_key()),
        })
        .await
        .expect_err("seller does not exist");

    assert!(matches!(err, RepositoryError::Conflict(_)));
}
