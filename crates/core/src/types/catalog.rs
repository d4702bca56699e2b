//! Catalog item types.

use serde::{Deserialize, Serialize};

use super::{DisplayName, Fingerprint, Price, ProductId};

/// An item listed for sale.
///
/// Items are created by sellers and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Store-assigned ID.
    pub id: ProductId,
    /// Item name as typed by the seller.
    pub name: String,
    /// Asking price.
    pub price: Price,
    /// Seller's display name at the time of listing.
    pub seller_name: DisplayName,
    /// Seller's public key material.
    pub seller_fingerprint: Fingerprint,
}

/// Data required to list a new item.
///
/// The seller fields always come from the authenticated session, never from
/// command text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogItem {
    /// Item name.
    pub name: String,
    /// Asking price.
    pub price: Price,
    /// Seller's display name.
    pub seller_name: DisplayName,
    /// Seller's public key material.
    pub seller_fingerprint: Fingerprint,
}

impl NewCatalogItem {
    /// Attach a store-assigned ID, producing the stored item.
    #[must_use]
    pub fn with_id(self, id: ProductId) -> CatalogItem {
        CatalogItem {
            id,
            name: self.name,
            price: self.price,
            seller_name: self.seller_name,
            seller_fingerprint: self.seller_fingerprint,
        }
    }
}
