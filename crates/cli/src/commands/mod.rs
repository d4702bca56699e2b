//! CLI subcommands.

pub mod catalog;
pub mod known_host;
pub mod migrate;
