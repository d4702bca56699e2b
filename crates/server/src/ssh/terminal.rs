//! [`Terminal`] over an SSH session channel.

use std::collections::VecDeque;

use async_trait::async_trait;
use russh::server::Handle;
use russh::{ChannelId, CryptoVec};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{Receiver, Sender};

use crate::shell::line::{LineEditor, LineEvent, to_crlf};
use crate::shell::{Terminal, TransportError};

/// Input chunks queued per session before the client is cut off.
pub const INPUT_QUEUE: usize = 64;

/// What happened to a chunk handed to [`forward_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forward {
    /// The session task will read it.
    Queued,
    /// The session is not keeping up; the client should be disconnected.
    Overflow,
    /// The session task has ended.
    Closed,
}

/// Queue `data` for the session task without waiting.
pub fn forward_input(input: &Sender<Vec<u8>>, data: &[u8]) -> Forward {
    match input.try_send(data.to_vec()) {
        Ok(()) => Forward::Queued,
        Err(TrySendError::Full(_)) => Forward::Overflow,
        Err(TrySendError::Closed(_)) => Forward::Closed,
    }
}

/// Turns raw input chunks into lines and echo bytes.
#[derive(Debug)]
pub struct InputDecoder {
    editor: LineEditor,
    pending: VecDeque<u8>,
    echo: bool,
}

impl InputDecoder {
    /// `echo` should be set when the client allocated a pty.
    #[must_use]
    pub fn new(echo: bool) -> Self {
        Self {
            editor: LineEditor::new(),
            pending: VecDeque::new(),
            echo,
        }
    }

    /// Append a chunk received from the client.
    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend(chunk);
    }

    /// Consume pending bytes up to the next completed line or end of input.
    ///
    /// Echo for the consumed bytes is appended to `echo`. Returns `None` once
    /// every pending byte is used without completing a line.
    pub fn next_line(&mut self, echo: &mut Vec<u8>) -> Option<Result<String, TransportError>> {
        while let Some(byte) = self.pending.pop_front() {
            let feed = self.editor.feed(byte);
            if self.echo {
                echo.extend_from_slice(&feed.echo);
            }
            match feed.event {
                Some(LineEvent::Line(line)) => return Some(Ok(line)),
                Some(LineEvent::Eof) => return Some(Err(TransportError::EndOfInput)),
                Some(LineEvent::Interrupt) => return Some(Err(TransportError::Interrupted)),
                None => {}
            }
        }
        None
    }
}

/// A shell channel driven from a spawned session task.
///
/// Input arrives from the connection handler as raw byte chunks; output goes
/// out through the session [`Handle`].
pub struct SshTerminal {
    handle: Handle,
    channel: ChannelId,
    input: Receiver<Vec<u8>>,
    decoder: InputDecoder,
    closed: bool,
}

impl SshTerminal {
    /// Wrap `channel`. `echo` should be set when the client allocated a pty.
    #[must_use]
    pub fn new(handle: Handle, channel: ChannelId, input: Receiver<Vec<u8>>, echo: bool) -> Self {
        Self {
            handle,
            channel,
            input,
            decoder: InputDecoder::new(echo),
            closed: false,
        }
    }

    /// Send exit status, EOF and close. Does nothing after the first call.
    pub async fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        // The client may already be gone; there is nobody left to tell.
        let _ = self.handle.exit_status_request(self.channel, 0).await;
        let _ = self.handle.eof(self.channel).await;
        let _ = self.handle.close(self.channel).await;
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.handle
            .data(self.channel, CryptoVec::from_slice(bytes))
            .await
            .map_err(|_| TransportError::Closed)
    }
}

#[async_trait]
impl Terminal for SshTerminal {
    async fn read_line(&mut self) -> Result<String, TransportError> {
        loop {
            let mut echo = Vec::new();
            let event = self.decoder.next_line(&mut echo);
            if !echo.is_empty() {
                self.send(&echo).await?;
            }
            if let Some(result) = event {
                return result;
            }

            match self.input.recv().await {
                Some(chunk) => self.decoder.push(&chunk),
                None => return Err(TransportError::Closed),
            }
        }
    }

    async fn write(&mut self, text: &str) -> Result<(), TransportError> {
        self.send(&to_crlf(text)).await
    }

    async fn close(&mut self) {
        self.shutdown().await;
    }
}
