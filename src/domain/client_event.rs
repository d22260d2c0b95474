//! Events the client publishes to its UI observers.

use serde::Serialize;

use super::{ConnectionState, DealId, Notification};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Informational toast.
    Info,
    /// Something did not happen but the room keeps working.
    Warning,
    /// A failure the user must act on.
    Error,
}

/// Something the UI may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientEvent {
    /// The real-time connection changed state.
    ConnectionChanged {
        /// New state.
        state: ConnectionState,
    },
    /// A room snapshot was installed and the room is ready to render.
    RoomLoaded {
        /// Loaded room.
        deal_id: DealId,
    },
    /// A room could not be loaded; the UI should navigate back.
    RoomLoadFailed {
        /// Room that failed.
        deal_id: DealId,
        /// Human-readable reason.
        message: String,
    },
    /// The active room was left and its state cleared.
    RoomLeft {
        /// Room that was left.
        deal_id: DealId,
    },
    /// A notification arrived.
    NotificationReceived(Notification),
    /// A non-blocking notice to show as a toast.
    Notice {
        /// Severity.
        level: NoticeLevel,
        /// Human-readable text.
        message: String,
    },
}

impl ClientEvent {
    /// Builds a warning notice.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Builds an error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
