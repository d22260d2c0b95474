//! Client error types with numeric codes and user-facing messages.
//!
//! [`ClientError`] is the central error type of the crate. Each variant
//! maps to a numeric code and to a human-readable message suitable for an
//! inline alert or a toast. Nothing in the client panics on these paths.

use crate::domain::{DealId, DealStatus, DocumentId, Role};

/// Local validation failure. Never reaches the network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Chat message was empty or whitespace only.
    #[error("message is empty")]
    EmptyMessage,

    /// Price was not a finite positive number.
    #[error("invalid price: {0}")]
    InvalidPrice(f64),

    /// A buyer offered a price not strictly below the current one.
    #[error("buyer offer {offered} must be lower than current price {current}")]
    OfferNotLower {
        /// Offered price.
        offered: f64,
        /// Current deal price.
        current: f64,
    },

    /// A seller asked a price not strictly above the current one.
    #[error("seller ask {asked} must be higher than current price {current}")]
    AskNotHigher {
        /// Asked price.
        asked: f64,
        /// Current deal price.
        current: f64,
    },

    /// The deal is completed or cancelled.
    #[error("deal is {}", .0.as_str())]
    DealClosed(DealStatus),

    /// The requested status change is not allowed.
    #[error("cannot move deal from {} to {} as {}", .from.as_str(), .to.as_str(), .role.as_str())]
    StatusTransition {
        /// Current status.
        from: DealStatus,
        /// Requested status.
        to: DealStatus,
        /// Acting role.
        role: Role,
    },

    /// The document is not part of the active room.
    #[error("unknown document {0}")]
    UnknownDocument(DocumentId),

    /// Only the uploader or an admin may delete a document.
    #[error("document {0} may only be deleted by its uploader or an admin")]
    DeleteForbidden(DocumentId),
}

impl ValidationError {
    /// Human-readable text for the inline alert next to the control.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyMessage => "Please enter a message".to_string(),
            Self::InvalidPrice(_) => "Please enter a valid price".to_string(),
            Self::OfferNotLower { .. } => "As a buyer, you should offer a lower price".to_string(),
            Self::AskNotHigher { .. } => "As a seller, you should offer a higher price".to_string(),
            Self::DealClosed(status) => format!("This deal is {}", status.as_str()),
            Self::StatusTransition { .. } => "This status change is not allowed".to_string(),
            Self::UnknownDocument(_) => "Document not found".to_string(),
            Self::DeleteForbidden(_) => "You can only delete documents you uploaded".to_string(),
        }
    }
}

/// Client-side error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category                |
/// |-----------|-------------------------|
/// | 1000–1999 | Validation              |
/// | 2000–2999 | Room / session state    |
/// | 3000–3999 | Transport and HTTP      |
/// | 4000–4999 | Configuration / storage |
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Local validation rejected an action.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No room is active.
    #[error("no active room")]
    NoActiveRoom,

    /// The active room has no snapshot yet.
    #[error("room {0} is still loading")]
    RoomNotLoaded(DealId),

    /// One of the snapshot fetches failed; the room cannot be entered.
    #[error("failed to load room {deal_id}: {reason}")]
    RoomLoad {
        /// Room being loaded.
        deal_id: DealId,
        /// Underlying failure.
        reason: String,
    },

    /// The real-time connection is not established.
    #[error("not connected")]
    NotConnected,

    /// The server refused the credential.
    #[error("authentication rejected")]
    AuthRejected,

    /// Transport-level failure on the real-time channel.
    #[error("transport error: {0}")]
    Transport(String),

    /// A REST call returned a non-success status.
    #[error("http {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, if any.
        message: String,
    },

    /// A REST call failed before a response arrived.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A payload could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The room service task has stopped.
    #[error("client session closed")]
    SessionClosed,

    /// No credential is stored.
    #[error("no stored credential")]
    MissingCredential,

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Local storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ClientError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::NoActiveRoom => 2001,
            Self::RoomNotLoaded(_) => 2002,
            Self::RoomLoad { .. } => 2003,
            Self::SessionClosed => 2004,
            Self::NotConnected => 3001,
            Self::AuthRejected => 3002,
            Self::Transport(_) => 3003,
            Self::Http { .. } => 3004,
            Self::Request(_) => 3005,
            Self::Codec(_) => 3006,
            Self::MissingCredential => 4001,
            Self::Config(_) => 4002,
            Self::Storage(_) => 4003,
        }
    }

    /// Returns `true` for failures that must not tear down the room view.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NotConnected | Self::Transport(_) | Self::Request(_)
        )
    }

    /// Human-readable text for alerts and toasts.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(v) => v.user_message(),
            Self::NoActiveRoom | Self::RoomNotLoaded(_) => "Open a deal room first".to_string(),
            Self::RoomLoad { .. } => "Error loading deal room".to_string(),
            Self::NotConnected | Self::Transport(_) => {
                "Connection lost. Changes will resume after reconnecting".to_string()
            }
            Self::AuthRejected | Self::MissingCredential => "Please log in again".to_string(),
            Self::Http { message, .. } if !message.is_empty() => message.clone(),
            Self::Http { .. } | Self::Request(_) | Self::Codec(_) => {
                "An error occurred".to_string()
            }
            Self::SessionClosed => "Session ended".to_string(),
            Self::Config(_) | Self::Storage(_) => "Client is misconfigured".to_string(),
        }
    }
}
