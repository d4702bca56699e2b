//! Host key lookup in `~/.ssh/known_hosts`.
//!
//! Prints the key a client has recorded for a shop server, which is what an
//! operator needs when checking a deployment's host key.
//!
//! # Usage
//!
//! ```bash
//! ts-cli known-host localhost:2323
//! ts-cli known-host shop.example.com:2323 --file ./known_hosts
//! ```

use std::path::{Path, PathBuf};

use russh_keys::PublicKeyBase64;
use thiserror::Error;

/// Errors that can occur during host key lookup.
#[derive(Debug, Error)]
pub enum KnownHostError {
    /// The target was not `host:port`.
    #[error("Invalid host and port: {0}. Expected e.g. localhost:2323")]
    InvalidTarget(String),

    /// No home directory to find `.ssh/known_hosts` in.
    #[error("Unable to determine home directory")]
    NoHomeDir,

    /// The file could not be read or parsed.
    #[error("Unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: russh_keys::Error,
    },

    /// No entry matched.
    #[error("No host key recorded for {host}:{port}")]
    NotFound { host: String, port: u16 },
}

/// A recorded host key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostKey {
    pub algorithm: String,
    pub key: String,
}

/// Look up and print the key recorded for `target`.
///
/// # Errors
///
/// Returns an error if the target is malformed, the file cannot be read,
/// or no entry matches.
pub fn show(target: &str, file: Option<PathBuf>) -> Result<(), KnownHostError> {
    let (host, port) = parse_target(target)?;
    let path = match file {
        Some(path) => path,
        None => default_path()?,
    };

    let key = lookup(&path, &host, port)?;

    #[allow(clippy::print_stdout)]
    {
        println!("Algorithm: {}", key.algorithm);
        println!("Public key: {}", key.key);
    }
    Ok(())
}

fn default_path() -> Result<PathBuf, KnownHostError> {
    dirs::home_dir()
        .map(|home| home.join(".ssh").join("known_hosts"))
        .ok_or(KnownHostError::NoHomeDir)
}

/// First key in `path` recorded for `host` on `port`.
///
/// Port 22 matches bare host entries, any other port matches `[host]:port`.
/// Hashed entries are matched too.
fn lookup(path: &Path, host: &str, port: u16) -> Result<HostKey, KnownHostError> {
    let keys = russh_keys::known_host_keys_path(host, port, path).map_err(|source| {
        KnownHostError::Read {
            path: path.to_owned(),
            source,
        }
    })?;

    keys.into_iter()
        .next()
        .map(|(_, key)| HostKey {
            algorithm: key.name().to_owned(),
            key: key.public_key_base64(),
        })
        .ok_or_else(|| KnownHostError::NotFound {
            host: host.to_owned(),
            port,
        })
}

/// Split `host:port`, accepting `[v6addr]:port`.
fn parse_target(target: &str) -> Result<(String, u16), KnownHostError> {
    let invalid = || KnownHostError::InvalidTarget(target.to_owned());

    let (host, port) = target.rsplit_once(':').ok_or_else(invalid)?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse().map_err(|_| invalid())?;

    Ok((host.to_owned(), port))
}
