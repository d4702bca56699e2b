//! Identity types for SSH-authenticated users.
//!
//! A user is identified by the public key they log in with. The SSH user name
//! becomes their display name the first time the key is seen; later logins
//! with the same key keep the original name.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`DisplayName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayNameError {
    /// The input string is empty.
    #[error("username cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains control characters.
    #[error("username cannot contain control characters")]
    ControlCharacter,
}

/// The name a user is shown as in prompts and listings.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - No control characters
///
/// Names are case-sensitive; the prompt shows them uppercased but identity
/// comparison never folds case.
///
/// ## Examples
///
/// ```
/// use terminal_shop_core::DisplayName;
///
/// let name = DisplayName::parse("alice").unwrap();
/// assert_eq!(name.prompt_label(), "ALICE");
///
/// assert!(DisplayName::parse("").is_err());
/// assert!(DisplayName::parse("bad\u{1b}[2J").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Maximum length of a display name, in characters.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `DisplayName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 64 characters, or
    /// contains control characters.
    pub fn parse(s: &str) -> Result<Self, DisplayNameError> {
        if s.is_empty() {
            return Err(DisplayNameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_control) {
            return Err(DisplayNameError::ControlCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the uppercased form used in the shell prompt.
    #[must_use]
    pub fn prompt_label(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Public key material identifying a user.
///
/// This is the base64 key blob from the `authorized_keys` line
/// (`<algorithm> <blob>`), which is stable for the lifetime of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Create a fingerprint from base64 key material.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the fingerprint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log lines.
    #[must_use]
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(16)
            .map_or(self.0.len(), |(idx, _)| idx);
        self.0.get(..end).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Fingerprint {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// What the transport learned about a connecting user.
///
/// The user name is raw and unvalidated; identity resolution decides whether
/// it is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredential {
    /// User name sent by the SSH client.
    pub username: String,
    /// Key algorithm, e.g. `ssh-ed25519`.
    pub key_algorithm: String,
    /// Public key material.
    pub fingerprint: Fingerprint,
}

/// A resolved identity, as stored by the identity repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Canonical display name (the name first used with this key).
    pub display_name: DisplayName,
    /// Public key material.
    pub fingerprint: Fingerprint,
    /// Key algorithm, e.g. `ssh-ed25519`.
    pub key_algorithm: String,
    /// First successful login.
    pub first_seen_at: DateTime<Utc>,
    /// Most recent successful login.
    pub last_seen_at: DateTime<Utc>,
}
