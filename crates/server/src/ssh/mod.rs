//! SSH transport.
//!
//! Every connection authenticates with a public key; any key is accepted and
//! becomes the user's identity. A session channel that requests a shell gets
//! its own task running [`run_session`] against an [`SshTerminal`].

pub mod terminal;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use russh::server::{Auth, Msg, Server, Session};
use russh::{Channel, ChannelId, MethodSet, Pty};
use russh_keys::PublicKeyBase64;
use russh_keys::key::PublicKey;
use thiserror::Error;
use tokio::sync::mpsc::{self, Sender};
use tracing::Instrument;
use uuid::Uuid;

use terminal_shop_core::{Fingerprint, LoginCredential};

use crate::config::ShopConfig;
use crate::shell::run_session;
use crate::state::AppState;

pub use terminal::{Forward, INPUT_QUEUE, SshTerminal, forward_input};

/// Errors from the SSH layer.
#[derive(Debug, Error)]
pub enum SshError {
    /// The host key could not be loaded.
    #[error("failed to load host key {path}: {source}")]
    HostKey {
        path: PathBuf,
        #[source]
        source: russh_keys::Error,
    },

    /// Protocol-level failure on a connection.
    #[error("ssh error: {0}")]
    Protocol(#[from] russh::Error),

    /// The listener failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the russh server configuration from `config`.
///
/// # Errors
///
/// Returns [`SshError::HostKey`] if the host key file cannot be read.
pub fn build_config(config: &ShopConfig) -> Result<russh::server::Config, SshError> {
    let host_key = russh_keys::load_secret_key(&config.host_key_path, None).map_err(|source| {
        SshError::HostKey {
            path: config.host_key_path.clone(),
            source,
        }
    })?;

    Ok(russh::server::Config {
        inactivity_timeout: Some(config.inactivity_timeout),
        methods: MethodSet::PUBLICKEY,
        keys: vec![host_key],
        ..Default::default()
    })
}

/// Serve SSH on the configured address until the listener fails.
///
/// # Errors
///
/// Returns an error if the host key cannot be loaded or the listener fails.
pub async fn run(state: AppState) -> Result<(), SshError> {
    let config = Arc::new(build_config(state.config())?);
    let addr = state.config().socket_addr();

    tracing::info!("terminal shop listening on {}", addr);

    let mut server = ShopServer::new(state);
    server.run_on_address(config, addr).await?;
    Ok(())
}

/// Hands out one [`ShellHandler`] per connection.
#[derive(Clone)]
pub struct ShopServer {
    state: AppState,
}

impl ShopServer {
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl Server for ShopServer {
    type Handler = ShellHandler;

    fn new_client(&mut self, peer: Option<SocketAddr>) -> ShellHandler {
        let session_id = Uuid::new_v4();
        tracing::debug!(%session_id, ?peer, "Connection accepted");
        ShellHandler {
            state: self.state.clone(),
            peer,
            session_id,
            credential: None,
            channel: None,
            pty: false,
            input: None,
        }
    }
}

/// Per-connection handler.
pub struct ShellHandler {
    state: AppState,
    peer: Option<SocketAddr>,
    session_id: Uuid,
    credential: Option<LoginCredential>,
    channel: Option<ChannelId>,
    pty: bool,
    input: Option<Sender<Vec<u8>>>,
}

impl ShellHandler {
    fn is_shell_channel(&self, channel: ChannelId) -> bool {
        self.channel == Some(channel)
    }
}

#[async_trait]
impl russh::server::Handler for ShellHandler {
    type Error = SshError;

    async fn auth_publickey(
        &mut self,
        user: &str,
        public_key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        let credential = LoginCredential {
            username: user.to_owned(),
            key_algorithm: public_key.name().to_owned(),
            fingerprint: Fingerprint::new(public_key.public_key_base64()),
        };
        tracing::debug!(
            session_id = %self.session_id,
            user,
            key = %credential.fingerprint.short(),
            "Public key accepted"
        );
        self.credential = Some(credential);
        Ok(Auth::Accept)
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        if self.channel.is_some() {
            return Ok(false);
        }
        self.channel = Some(channel.id());
        Ok(true)
    }

    #[allow(clippy::too_many_arguments)]
    async fn pty_request(
        &mut self,
        channel: ChannelId,
        _term: &str,
        _col_width: u32,
        _row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.is_shell_channel(channel) {
            self.pty = true;
            session.channel_success(channel);
        }
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        let Some(credential) = self.credential.clone() else {
            session.channel_failure(channel);
            return Ok(());
        };
        if !self.is_shell_channel(channel) || self.input.is_some() {
            session.channel_failure(channel);
            return Ok(());
        }
        session.channel_success(channel);

        let (tx, rx) = mpsc::channel(INPUT_QUEUE);
        self.input = Some(tx);

        let mut terminal = SshTerminal::new(session.handle(), channel, rx, self.pty);
        let state = self.state.clone();
        let span = tracing::info_span!(
            "session",
            session_id = %self.session_id,
            peer = ?self.peer,
            user = %credential.username,
        );

        tokio::spawn(
            async move {
                let end = run_session(&mut terminal, &credential, &state).await;
                tracing::info!(?end, "Session finished");
                terminal.shutdown().await;
            }
            .instrument(span),
        );
        Ok(())
    }

    async fn data(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if !self.is_shell_channel(channel) {
            return Ok(());
        }
        let Some(input) = &self.input else {
            return Ok(());
        };
        match forward_input(input, data) {
            Forward::Queued => {}
            Forward::Overflow => {
                tracing::warn!(
                    session_id = %self.session_id,
                    "Client is sending faster than the session reads; disconnecting"
                );
                // Dropping the sender ends the session once the queue drains.
                self.input = None;
            }
            Forward::Closed => self.input = None,
        }
        Ok(())
    }

    async fn channel_eof(
        &mut self,
        channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.is_shell_channel(channel) {
            self.input = None;
        }
        Ok(())
    }

    async fn channel_close(
        &mut self,
        channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.is_shell_channel(channel) {
            self.input = None;
            self.channel = None;
        }
        Ok(())
    }
}
