//! The per-connection read-eval-print loop.
//!
//! [`run_session`] is transport-agnostic: it talks to a [`Terminal`] and the
//! shared [`AppState`]. The SSH layer supplies a terminal backed by a channel;
//! tests supply a scripted one.

use async_trait::async_trait;
use thiserror::Error;

use terminal_shop_core::{DisplayName, Identity, LoginCredential};

use super::command;
use super::dispatch::{Dispatcher, Reply};
use super::render;
use crate::error::ShellError;
use crate::state::AppState;

/// Reasons a terminal stops delivering input.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The client closed the channel.
    #[error("connection closed")]
    Closed,

    /// The client signalled end of input.
    #[error("end of input")]
    EndOfInput,

    /// The client pressed Ctrl-C.
    #[error("interrupted")]
    Interrupted,

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Io(String),
}

/// A line-oriented, bidirectional text stream.
#[async_trait]
pub trait Terminal: Send {
    /// Read the next line, without its terminator.
    async fn read_line(&mut self) -> Result<String, TransportError>;

    /// Write `text` as-is.
    async fn write(&mut self, text: &str) -> Result<(), TransportError>;

    /// Close the stream. Called once, after the farewell on `/exit`.
    async fn close(&mut self);
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The login could not be resolved to an identity.
    Rejected,
    /// The user ran `/exit`.
    Exited,
    /// Input stopped or output failed.
    Disconnected,
}

/// Resolve `credential`, then run the command loop until exit or disconnect.
pub async fn run_session<T>(
    term: &mut T,
    credential: &LoginCredential,
    state: &AppState,
) -> SessionEnd
where
    T: Terminal + ?Sized,
{
    let identity = match login(credential, state).await {
        Ok(identity) => identity,
        Err(e) => {
            e.report();
            // The client is being turned away; a failed write changes nothing.
            let _ = term.write(&format!("{e}\n")).await;
            return SessionEnd::Rejected;
        }
    };

    tracing::info!(
        user = %identity.display_name,
        key = %identity.fingerprint.short(),
        "Session started"
    );

    let dispatcher = Dispatcher::new(state.catalog(), state.carts(), &identity);
    let prompt = render::prompt(&identity.display_name);

    if term.write(&prompt).await.is_err() {
        return SessionEnd::Disconnected;
    }

    loop {
        let line = match term.read_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::info!(reason = %e, "Session input ended");
                return SessionEnd::Disconnected;
            }
        };

        let outcome = match command::parse(&line) {
            Ok(command) => dispatcher.dispatch(command).await,
            Err(e) => Err(ShellError::from(e)),
        };

        let output = match outcome {
            Ok(Reply::Silent) => None,
            Ok(Reply::Text(text)) => Some(text),
            Ok(Reply::Exit(farewell)) => {
                let _ = term.write(&farewell).await;
                term.close().await;
                tracing::info!("Session exited");
                return SessionEnd::Exited;
            }
            Err(e) => {
                e.report();
                Some(e.to_string())
            }
        };

        if let Some(text) = output
            && term.write(&text).await.is_err()
        {
            return SessionEnd::Disconnected;
        }
        if term.write(&prompt).await.is_err() {
            return SessionEnd::Disconnected;
        }
    }
}

async fn login(credential: &LoginCredential, state: &AppState) -> Result<Identity, ShellError> {
    DisplayName::parse(&credential.username)?;
    state
        .identities()
        .resolve(credential)
        .await
        .map_err(ShellError::Identity)
}
