//! Core types for Terminal Shop.
//!
//! This module provides type-safe wrappers for the marketplace domain.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod identity;
pub mod price;

pub use cart::CartEntry;
pub use catalog::{CatalogItem, NewCatalogItem};
pub use id::*;
pub use identity::{DisplayName, DisplayNameError, Fingerprint, Identity, LoginCredential};
pub use price::{Price, PriceError};
