//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; when neither is set the server keeps everything in memory)
//! - `SHOP_HOST` - Bind address (default: 0.0.0.0)
//! - `SHOP_PORT` - SSH listen port (default: 2323)
//! - `SHOP_HOST_KEY_PATH` - `OpenSSH` private host key (default: `ssh_host_ed25519_key`)
//! - `SHOP_INACTIVITY_TIMEOUT_SECS` - Idle session timeout (default: 3600)
//! - `SHOP_HEALTH_PORT` - Port for the HTTP health endpoint (disabled if unset)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Fraction of errors sent to Sentry (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the SSH server to
    pub host: IpAddr,
    /// SSH port to listen on
    pub port: u16,
    /// Path of the SSH host private key
    pub host_key_path: PathBuf,
    /// Idle time after which a connection is dropped
    pub inactivity_timeout: Duration,
    /// Port for the HTTP health endpoint
    pub health_port: Option<u16>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let database_url = env.database_url("SHOP_DATABASE_URL");
        let host = env.parse_or("SHOP_HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port = env.parse_or("SHOP_PORT", 2323_u16)?;
        let host_key_path = env
            .optional("SHOP_HOST_KEY_PATH")
            .map_or_else(|| PathBuf::from("ssh_host_ed25519_key"), PathBuf::from);
        let inactivity_timeout =
            Duration::from_secs(env.parse_or("SHOP_INACTIVITY_TIMEOUT_SECS", 3600_u64)?);
        let health_port = env.parse_optional::<u16>("SHOP_HEALTH_PORT")?;

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env.parse_or("SENTRY_SAMPLE_RATE", 1.0_f32)?;
        if !(0.0..=1.0).contains(&sentry_sample_rate) {
            return Err(ConfigError::InvalidEnvVar(
                "SENTRY_SAMPLE_RATE".to_string(),
                format!("must be between 0.0 and 1.0 (got {sentry_sample_rate})"),
            ));
        }

        Ok(Self {
            database_url,
            host,
            port,
            host_key_path,
            inactivity_timeout,
            health_port,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
        })
    }

    /// Returns the socket address for the SSH listener.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the socket address for the health listener, if enabled.
    #[must_use]
    pub fn health_addr(&self) -> Option<SocketAddr> {
        self.health_port.map(|port| SocketAddr::new(self.host, port))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Option<SecretString> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
    }

    /// Parse a variable, using `default` when it is unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parse_optional(key)?.unwrap_or(default))
    }

    /// Parse a variable if it is set.
    fn parse_optional<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|value| {
                value
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }
}
