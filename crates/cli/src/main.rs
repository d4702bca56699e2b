//! Terminal Shop CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Run shop database migrations
//! ts-cli migrate
//!
//! # Print the catalog
//! ts-cli catalog list
//!
//! # Show the host key recorded for a server
//! ts-cli known-host localhost:2323
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `catalog list` - Print every listed item
//! - `known-host` - Look up a server in `~/.ssh/known_hosts`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ts-cli")]
#[command(author, version, about = "Terminal Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Show the host key recorded for a server
    KnownHost {
        /// Server as `host:port`
        target: String,

        /// Read this file instead of `~/.ssh/known_hosts`
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List every item for sale
    List,
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list().await?,
        },
        Commands::KnownHost { target, file } => commands::known_host::show(&target, file)?,
    }
    Ok(())
}
