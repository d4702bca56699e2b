//! Text rendered back to the terminal.

use serde::Serialize;
use serde::ser::Error as _;
use serde_json::ser::PrettyFormatter;

use terminal_shop_core::{CartEntry, CatalogItem, DisplayName};

pub const SELL_OK: &str = "Product has been added successfully";
pub const ADD_OK: &str = "Item added to cart successfully";
pub const NO_CART: &str = "No cart found for this user";
pub const EMPTY_CART: &str = "No item found in cart";
pub const FAREWELL: &str = "Exit successful\n";

const TABLE_BORDER: &str = "+------+----------------+----------+------------+\n";
const TABLE_HEADER: &str = "|  ID  |      Name      |  Price   |  Username  |\n";

/// Command reference shown for `/help` and for unknown commands.
#[must_use]
pub const fn help() -> &'static str {
    "
Hello and welcome to the terminal shop! Please use one of the following commands:
1. /products: Show the lists of products available
2. /sell -name=<product-name> -price=<product-price>: To post a product for sale
3. /exit: To leave the application
4. /help: To display this message
5. /add -id=<product-id> -name=<product-name>: Add an item to cart
6. /cart: Lists all the items in cart
"
}

/// The shell prompt for `name`.
#[must_use]
pub fn prompt(name: &DisplayName) -> String {
    format!("\n{} > ", name.prompt_label())
}

/// Bordered, fixed-width catalog table in the order given.
///
/// Values wider than their column push the right border out rather than
/// being truncated.
#[must_use]
pub fn catalog_table(items: &[CatalogItem]) -> String {
    let mut out = String::with_capacity(TABLE_BORDER.len() * (items.len() + 4));
    out.push_str(TABLE_BORDER);
    out.push_str(TABLE_HEADER);
    out.push_str(TABLE_BORDER);

    for item in items {
        out.push_str(&format!(
            "| {:<4} | {:<14} | {:<8} | {:<10} |\n",
            item.id.to_string(),
            item.name,
            item.price.to_string(),
            item.seller_name.as_str(),
        ));
    }

    out.push_str(TABLE_BORDER);
    out
}

/// Cart entries as indented JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn cart_entries(entries: &[CartEntry]) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    entries.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(serde_json::Error::custom)
}
