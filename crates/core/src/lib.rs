//! Terminal Shop Core - Shared types library.
//!
//! This crate provides common types used across all Terminal Shop components:
//! - `server` - SSH shell server running the marketplace sessions
//! - `cli` - Command-line tools for migrations and operator tasks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no
//! network code. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, identities, catalog items and cart entries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
