//! Process-wide cart store.
//!
//! Carts are keyed by the seller's public key: adding an item files the entry
//! under whoever listed it, and a user viewing "their" cart sees the entries
//! other users placed against their listings. The store is append-only and
//! lives exactly as long as the process.

use std::sync::Arc;

use dashmap::DashMap;

use terminal_shop_core::{CartEntry, Fingerprint};

/// What a cart lookup found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartView {
    /// Nothing was ever added under this key.
    Missing,
    /// The key exists but holds no entries.
    Empty,
    /// Entries in the order they were added.
    Entries(Vec<CartEntry>),
}

/// Shared, append-only mapping from seller key to cart entries.
///
/// Cloning is cheap and yields a handle to the same store. Appends and reads
/// for one key are serialised by the map's shard locks, so concurrent
/// sessions never lose updates or observe a half-written list.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    carts: Arc<DashMap<Fingerprint, Vec<CartEntry>>>,
}

impl CartStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` to the cart of its seller and return the new length.
    pub fn add(&self, entry: CartEntry) -> usize {
        let mut cart = self.carts.entry(entry.seller_key.clone()).or_default();
        cart.push(entry);
        cart.len()
    }

    /// Copy out the cart stored under `key`.
    #[must_use]
    pub fn view(&self, key: &Fingerprint) -> CartView {
        match self.carts.get(key) {
            None => CartView::Missing,
            Some(cart) if cart.is_empty() => CartView::Empty,
            Some(cart) => CartView::Entries(cart.clone()),
        }
    }

    /// Number of entries stored under `key`.
    #[must_use]
    pub fn len(&self, key: &Fingerprint) -> usize {
        self.carts.get(key).map_or(0, |cart| cart.len())
    }

    /// Whether no cart has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }
}
