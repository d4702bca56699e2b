//! Integration tests for Terminal Shop.
//!
//! # Running Tests
//!
//! ```bash
//! # Session-level tests (no external services)
//! cargo test -p terminal-shop-integration-tests
//!
//! # Include PostgreSQL store tests
//! TEST_DATABASE_URL=postgres://localhost/terminal_shop_test \
//!     cargo test -p terminal-shop-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `session_flow` - Full shell sessions against in-memory stores
//! - `cart_concurrency` - Many sessions adding to one cart at once
//! - `postgres_stores` - Catalog and identity stores on `PostgreSQL`
//!
//! Sessions are driven through [`ScriptedTerminal`], which replays a fixed
//! list of input lines and records everything the shell writes.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;

use terminal_shop_core::{Fingerprint, LoginCredential};
use terminal_shop_server::config::ShopConfig;
use terminal_shop_server::db::{CatalogRepository, MemoryIdentities};
use terminal_shop_server::shell::{SessionEnd, Terminal, TransportError, run_session};
use terminal_shop_server::state::AppState;

/// A terminal that replays `lines` and then reports a closed connection.
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    input: VecDeque<String>,
    output: String,
    closed: bool,
}

impl ScriptedTerminal {
    /// Create a terminal that will deliver `lines` in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: String::new(),
            closed: false,
        }
    }

    /// Everything written so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Whether the shell closed the terminal.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Lines the shell never read.
    #[must_use]
    pub fn unread(&self) -> usize {
        self.input.len()
    }
}

#[async_trait]
impl Terminal for ScriptedTerminal {
    async fn read_line(&mut self) -> Result<String, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.input.pop_front().ok_or(TransportError::Closed)
    }

    async fn write(&mut self, text: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.output.push_str(text);
        Ok(())
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

/// Configuration with every variable unset.
///
/// # Panics
///
/// Panics if the defaults fail to load, which would be a bug.
#[must_use]
pub fn test_config() -> ShopConfig {
    ShopConfig::from_lookup(|_| None).expect("default configuration loads")
}

/// State with in-memory catalog and identities.
#[must_use]
pub fn memory_state() -> AppState {
    AppState::in_memory(test_config())
}

/// State with in-memory identities and the given catalog.
#[must_use]
pub fn state_with_catalog(catalog: Arc<dyn CatalogRepository>) -> AppState {
    AppState::with_stores(test_config(), catalog, Arc::new(MemoryIdentities::new()))
}

/// An ed25519 login as `username` with key material `key`.
#[must_use]
pub fn credential(username: &str, key: &str) -> LoginCredential {
    LoginCredential {
        username: username.to_owned(),
        key_algorithm: "ssh-ed25519".to_owned(),
        fingerprint: Fingerprint::new(key),
    }
}

/// Run one full session and return how it ended with the terminal.
pub async fn run_script<I, S>(
    state: &AppState,
    credential: &LoginCredential,
    lines: I,
) -> (SessionEnd, ScriptedTerminal)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut terminal = ScriptedTerminal::new(lines);
    let end = run_session(&mut terminal, credential, state).await;
    (end, terminal)
}
