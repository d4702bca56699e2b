//! Unified error handling with Sentry integration.
//!
//! Everything a session reports back to its terminal is a [`ShellError`].
//! The `Display` text is exactly what the user sees; [`ShellError::report`]
//! additionally logs server-side failures and captures them to Sentry.

use thiserror::Error;

use terminal_shop_core::DisplayNameError;

use crate::db::RepositoryError;
use crate::shell::command::ParseError;

/// Session-level error type.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The login could not be turned into an identity.
    #[error("login failed: {0}")]
    Identity(#[source] RepositoryError),

    /// The SSH user name is not an acceptable display name.
    #[error("login failed: {0}")]
    InvalidUsername(#[from] DisplayNameError),

    /// The catalog store failed; its message is shown verbatim.
    #[error(transparent)]
    Catalog(#[from] RepositoryError),

    /// Command arguments were malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// `/add` named an item that does not exist.
    #[error("product not found: id={id} name={name}")]
    ProductNotFound {
        /// ID as typed.
        id: String,
        /// Name as typed.
        name: String,
    },

    /// Output could not be rendered.
    #[error("unable to render response: {0}")]
    Render(#[from] serde_json::Error),
}

impl ShellError {
    /// Whether this failure originates on the server rather than in user input.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        matches!(self, Self::Identity(_) | Self::Catalog(_) | Self::Render(_))
    }

    /// Log the error and, for server-side failures, capture it to Sentry.
    pub fn report(&self) {
        if self.is_server_side() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Session error"
            );
        } else {
            tracing::debug!(error = %self, "Rejected input");
        }
    }
}

/// Result type alias for `ShellError`.
pub type Result<T> = std::result::Result<T, ShellError>;
