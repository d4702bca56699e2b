//! Full shell sessions against in-memory stores.
//!
//! Each test logs in through the same path the SSH transport uses and
//! checks the exact text written back to the terminal.

use std::sync::Arc;

use async_trait::async_trait;

use terminal_shop_core::{CatalogItem, NewCatalogItem};
use terminal_shop_integration_tests::{credential, memory_state, run_script, state_with_catalog};
use terminal_shop_server::db::{CatalogRepository, RepositoryError};
use terminal_shop_server::shell::SessionEnd;
use terminal_shop_server::shell::render;

const SAM_KEY: &str = "AAAAC3NzaC1lZDI1NTE5AAAAISAMSAMSAMSAM";
const BEA_KEY: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIBEABEABEABEA";

/// Catalog whose every call fails.
struct UnavailableCatalog;

#[async_trait]
impl CatalogRepository for UnavailableCatalog {
    async fn list(&self) -> Result<Vec<CatalogItem>, RepositoryError> {
        Err(RepositoryError::DataCorruption(
            "products table unavailable".to_string(),
        ))
    }

    async fn insert(&self, _item: NewCatalogItem) -> Result<CatalogItem, RepositoryError> {
        Err(RepositoryError::Conflict("seller key unknown".to_string()))
    }

    async fn find(&self, _id: &str, _name: &str) -> Result<Option<CatalogItem>, RepositoryError> {
        Err(RepositoryError::DataCorruption(
            "products table unavailable".to_string(),
        ))
    }
}

#[tokio::test]
async fn test_help_then_exit_transcript() {
    let state = memory_state();
    let (end, term) = run_script(&state, &credential("sam", SAM_KEY), ["/help", "/exit"]).await;

    assert_eq!(end, SessionEnd::Exited);
    assert!(term.is_closed());
    assert_eq!(
        term.output(),
        format!("\nSAM > {}\nSAM > Exit successful\n", render::help())
    );
}

#[tokio::test]
async fn test_plain_text_and_blank_lines_only_reprompt() {
    let state = memory_state();
    let (end, term) = run_script(
        &state,
        &credential("sam", SAM_KEY),
        ["hello there", "", "  /help", "/exit"],
    )
    .await;

    assert_eq!(end, SessionEnd::Exited);
    assert_eq!(
        term.output(),
        "\nSAM > \nSAM > \nSAM > \nSAM > Exit successful\n"
    );
}

#[tokio::test]
async fn test_lines_after_exit_are_not_read() {
    let state = memory_state();
    let (end, term) = run_script(
        &state,
        &credential("sam", SAM_KEY),
        ["/exit", "/sell -name=lamp -price=3"],
    )
    .await;

    assert_eq!(end, SessionEnd::Exited);
    assert_eq!(term.unread(), 1);
    assert!(state.catalog().list().await.expect("list").is_empty());
}

#[tokio::test]
async fn test_unknown_command_shows_help() {
    let state = memory_state();
    let (_, term) = run_script(&state, &credential("sam", SAM_KEY), ["/buy 1"]).await;

    assert!(term.output().contains(render::help()));
}

#[tokio::test]
async fn test_sell_lists_under_session_identity() {
    let state = memory_state();
    let (_, term) = run_script(
        &state,
        &credential("sam", SAM_KEY),
        ["/sell -name=lamp -price=12.5", "/products", "/exit"],
    )
    .await;

    let output = term.output();
    assert!(output.contains(render::SELL_OK));
    assert!(output.contains("| 1    | lamp           | $12.50   | sam        |"));

    let items = state.catalog().list().await.expect("list");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].seller_fingerprint.as_str(), SAM_KEY);
}

#[tokio::test]
async fn test_empty_catalog_prints_frame() {
    let state = memory_state();
    let (_, term) = run_script(&state, &credential("sam", SAM_KEY), ["/products"]).await;

    assert!(term.output().contains(&render::catalog_table(&[])));
}

#[tokio::test]
async fn test_bad_price_reports_and_keeps_session() {
    let state = memory_state();
    let (end, term) = run_script(
        &state,
        &credential("sam", SAM_KEY),
        ["/sell -name=lamp -price=abc", "/sell -name=lamp -price=-3", "/exit"],
    )
    .await;

    assert_eq!(end, SessionEnd::Exited);
    let output = term.output();
    assert!(output.contains("error converting price: invalid price \"abc\""));
    assert!(output.contains("error converting price: price cannot be negative"));
    assert!(state.catalog().list().await.expect("list").is_empty());
}

#[tokio::test]
async fn test_malformed_sell_shows_help() {
    let state = memory_state();
    let (_, term) = run_script(&state, &credential("sam", SAM_KEY), ["/sell -name=lamp"]).await;

    assert!(term.output().contains(render::help()));
    assert!(state.catalog().list().await.expect("list").is_empty());
}

#[tokio::test]
async fn test_add_files_entry_in_seller_cart() {
    let state = memory_state();
    let sam = credential("sam", SAM_KEY);
    let bea = credential("bea", BEA_KEY);

    run_script(&state, &sam, ["/sell -name=lamp -price=3", "/exit"]).await;

    let (_, term) = run_script(&state, &bea, ["/add -id=1 -name=lamp", "/cart", "/exit"]).await;
    let output = term.output();
    assert!(output.contains(render::ADD_OK));
    assert!(output.contains(render::NO_CART));

    let (_, term) = run_script(&state, &sam, ["/cart", "/exit"]).await;
    let output = term.output();
    assert!(output.contains(&format!("\"seller_key\": \"{SAM_KEY}\"")));
    assert!(output.contains("\"product_id\": 1"));
    assert!(output.contains("\"product_name\": \"lamp\""));
    assert!(output.contains("\"buyer\": \"bea\""));
}

#[tokio::test]
async fn test_add_requires_matching_id_and_name() {
    let state = memory_state();
    let sam = credential("sam", SAM_KEY);

    let (_, term) = run_script(
        &state,
        &sam,
        [
            "/sell -name=lamp -price=3",
            "/add -id=1 -name=mug",
            "/add -id=x -name=lamp",
            "/cart",
        ],
    )
    .await;

    let output = term.output();
    assert!(output.contains("product not found: id=1 name=mug"));
    assert!(output.contains("product not found: id=x name=lamp"));
    assert!(output.contains(render::NO_CART));
    assert!(state.carts().is_empty());
}

#[tokio::test]
async fn test_invalid_username_is_rejected() {
    let state = memory_state();

    let (end, term) = run_script(&state, &credential("", SAM_KEY), ["/help"]).await;
    assert_eq!(end, SessionEnd::Rejected);
    assert_eq!(term.output(), "login failed: username cannot be empty\n");
    assert_eq!(term.unread(), 1);

    let (end, term) = run_script(&state, &credential("sam\u{7}", SAM_KEY), ["/help"]).await;
    assert_eq!(end, SessionEnd::Rejected);
    assert_eq!(
        term.output(),
        "login failed: username cannot contain control characters\n"
    );
}

#[tokio::test]
async fn test_returning_key_keeps_first_name() {
    let state = memory_state();

    run_script(&state, &credential("sam", SAM_KEY), ["/exit"]).await;
    let (_, term) = run_script(&state, &credential("samuel", SAM_KEY), ["/exit"]).await;

    assert!(term.output().starts_with("\nSAM > "));
}

#[tokio::test]
async fn test_store_failures_are_shown_verbatim() {
    let state = state_with_catalog(Arc::new(UnavailableCatalog));
    let (end, term) = run_script(
        &state,
        &credential("sam", SAM_KEY),
        [
            "/products",
            "/sell -name=lamp -price=3",
            "/add -id=1 -name=lamp",
            "/exit",
        ],
    )
    .await;

    assert_eq!(end, SessionEnd::Exited);
    let output = term.output();
    assert_eq!(
        output.matches("data corruption: products table unavailable").count(),
        2
    );
    assert!(output.contains("constraint violation: seller key unknown"));
    assert!(state.carts().is_empty());
}

#[tokio::test]
async fn test_disconnect_without_exit() {
    let state = memory_state();
    let (end, term) = run_script(&state, &credential("sam", SAM_KEY), ["/cart"]).await;

    assert_eq!(end, SessionEnd::Disconnected);
    assert!(!term.is_closed());
    assert!(term.output().contains(render::NO_CART));
}
