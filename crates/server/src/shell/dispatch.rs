//! Command execution.
//!
//! The dispatcher holds a borrowed view of everything a command may touch:
//! the catalog, the shared cart store and the identity of the session it
//! runs for. Seller and buyer fields are always taken from that identity.

use terminal_shop_core::{CartEntry, Identity, NewCatalogItem, Price};

use super::command::Command;
use super::render;
use crate::cart::{CartStore, CartView};
use crate::db::CatalogRepository;
use crate::error::{Result, ShellError};

/// Outcome of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to write.
    Silent,
    /// Write this text and keep prompting.
    Text(String),
    /// Write this text, then end the session.
    Exit(String),
}

/// Executes commands on behalf of one authenticated session.
pub struct Dispatcher<'a> {
    catalog: &'a dyn CatalogRepository,
    carts: &'a CartStore,
    identity: &'a Identity,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher for `identity`.
    #[must_use]
    pub const fn new(
        catalog: &'a dyn CatalogRepository,
        carts: &'a CartStore,
        identity: &'a Identity,
    ) -> Self {
        Self {
            catalog,
            carts,
            identity,
        }
    }

    /// Execute `command`.
    ///
    /// # Errors
    ///
    /// Returns a [`ShellError`] to be written to the terminal when a store
    /// call fails or the command refers to a missing item. The session keeps
    /// running after any of these.
    pub async fn dispatch(&self, command: Command) -> Result<Reply> {
        match command {
            Command::NoOp => Ok(Reply::Silent),
            Command::Help | Command::Unrecognized => Ok(Reply::Text(render::help().to_owned())),
            Command::ListCatalog => self.list_catalog().await,
            Command::Sell { name, price } => self.sell(name, price).await,
            Command::AddToCart { item_id, item_name } => {
                self.add_to_cart(&item_id, &item_name).await
            }
            Command::ViewCart => self.view_cart(),
            Command::Exit => Ok(Reply::Exit(render::FAREWELL.to_owned())),
        }
    }

    async fn list_catalog(&self) -> Result<Reply> {
        let items = self.catalog.list().await?;
        Ok(Reply::Text(render::catalog_table(&items)))
    }

    async fn sell(&self, name: String, price: Price) -> Result<Reply> {
        let item = self
            .catalog
            .insert(NewCatalogItem {
                name,
                price,
                seller_name: self.identity.display_name.clone(),
                seller_fingerprint: self.identity.fingerprint.clone(),
            })
            .await?;

        tracing::info!(
            product_id = %item.id,
            product = %item.name,
            price = %item.price,
            "Product listed"
        );
        Ok(Reply::Text(render::SELL_OK.to_owned()))
    }

    async fn add_to_cart(&self, item_id: &str, item_name: &str) -> Result<Reply> {
        let item = self
            .catalog
            .find(item_id, item_name)
            .await?
            .ok_or_else(|| ShellError::ProductNotFound {
                id: item_id.to_owned(),
                name: item_name.to_owned(),
            })?;

        let entry = CartEntry::for_item(&item, self.identity.display_name.clone());
        let len = self.carts.add(entry);

        tracing::info!(
            product_id = %item.id,
            seller = %item.seller_fingerprint.short(),
            cart_len = len,
            "Item added to cart"
        );
        Ok(Reply::Text(render::ADD_OK.to_owned()))
    }

    fn view_cart(&self) -> Result<Reply> {
        let text = match self.carts.view(&self.identity.fingerprint) {
            CartView::Missing => render::NO_CART.to_owned(),
            CartView::Empty => render::EMPTY_CART.to_owned(),
            CartView::Entries(entries) => render::cart_entries(&entries)?,
        };
        Ok(Reply::Text(text))
    }
}
