//! Terminal Shop server library.
//!
//! An SSH-served marketplace shell: users connect with any public key, list
//! items for sale, browse the catalog and add items to carts. This crate
//! provides the server as a library, allowing the session engine to be tested
//! without a network.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod shell;
pub mod ssh;
pub mod state;
