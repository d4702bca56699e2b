//! Terminal Shop - SSH marketplace shell.
//!
//! This binary serves the shop over SSH on port 2323.
//!
//! # Architecture
//!
//! - russh for the SSH transport, one task per shell session
//! - `PostgreSQL` for users and the catalog (in-memory when no database is set)
//! - Carts live in process memory only
//! - Optional axum health endpoint for orchestrators

#![cfg_attr(not(test), forbid(unsafe_code))]

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terminal_shop_server::config::ShopConfig;
use terminal_shop_server::state::AppState;
use terminal_shop_server::{db, health, ssh};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ShopConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ShopConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "terminal_shop_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p terminal-shop-cli -- migrate
    let state = match config.database_url.clone() {
        Some(url) => {
            let pool = db::create_pool(&url)
                .await
                .expect("Failed to create database pool");
            tracing::info!("Database pool created");
            AppState::with_pool(config, pool)
        }
        None => {
            tracing::warn!("No database configured; catalog and users are kept in memory");
            AppState::in_memory(config)
        }
    };

    if let Some(addr) = state.config().health_addr() {
        let app = health::router(state.clone());
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind health address");
        tracing::info!("health endpoint listening on {}", addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Health server failed");
            }
        });
    }

    tokio::select! {
        result = ssh::run(state) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "SSH server failed");
                std::process::exit(1);
            }
        }
        () = shutdown_signal() => {}
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, shutting down");
}
