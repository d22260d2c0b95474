//! The authenticated session and its credential.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::User;

/// Opaque bearer credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for headers and query strings.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// State of the real-time connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No live link.
    #[default]
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Link established; actions may be emitted.
    Connected,
}

/// An authenticated user together with the credential used for both REST
/// calls and the real-time handshake. One per running client.
#[derive(Debug, Clone)]
pub struct Session {
    /// The logged-in account.
    pub user: User,
    /// Bearer credential.
    pub token: AuthToken,
}

impl Session {
    /// Creates a session for an already validated user.
    #[must_use]
    pub const fn new(user: User, token: AuthToken) -> Self {
        Self { user, token }
    }
}
