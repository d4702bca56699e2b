//! Cart entry type.

use serde::{Deserialize, Serialize};

use super::{CatalogItem, DisplayName, Fingerprint, ProductId};

/// One selection placed in a seller's cart.
///
/// Entries are denormalised copies of the catalog item at the time it was
/// added, so later catalog changes never rewrite them. Field order is the
/// order entries are rendered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Public key material of the seller whose cart holds this entry.
    pub seller_key: Fingerprint,
    /// Catalog ID of the selected item.
    pub product_id: ProductId,
    /// Catalog name of the selected item.
    pub product_name: String,
    /// Display name of the user who added the item.
    pub buyer: DisplayName,
}

impl CartEntry {
    /// Build an entry for `item` added by `buyer`.
    #[must_use]
    pub fn for_item(item: &CatalogItem, buyer: DisplayName) -> Self {
        Self {
            seller_key: item.seller_fingerprint.clone(),
            product_id: item.id,
            product_name: item.name.clone(),
            buyer,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Price;

    #[test]
    fn test_entry_copies_seller_from_item() {
        let item = CatalogItem {
            id: ProductId::new(3),
            name: "lamp".to_owned(),
            price: Price::parse("4.20").unwrap(),
            seller_name: DisplayName::parse("sam").unwrap(),
            seller_fingerprint: Fingerprint::new("SELLERKEY"),
        };

        let entry = CartEntry::for_item(&item, DisplayName::parse("bea").unwrap());

        assert_eq!(entry.seller_key, Fingerprint::new("SELLERKEY"));
        assert_eq!(entry.product_id, ProductId::new(3));
        assert_eq!(entry.product_name, "lamp");
        assert_eq!(entry.buyer.as_str(), "bea");
    }

    #[test]
    fn test_entry_serializes_in_field_order() {
        let entry = CartEntry {
            seller_key: Fingerprint::new("K"),
            product_id: ProductId::new(1),
            product_name: "mug".to_owned(),
            buyer: DisplayName::parse("al").unwrap(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"seller_key":"K","product_id":1,"product_name":"mug","buyer":"al"}"#
        );
    }
}
