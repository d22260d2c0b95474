//! Type-safe identifiers for server-issued entities.
//!
//! The marketplace API issues opaque string ids (`"_id"` fields). Wrapping
//! them in newtypes keeps a deal id from being confused with a message or
//! document id when routing events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares a transparent string newtype with the usual conversions.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a server-issued id.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the raw id.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id! {
    /// Identifier of a deal, and therefore of its real-time room.
    ///
    /// Used as the routing key for every room-scoped event and as the
    /// subscription target of [`crate::room::RoomSubscription`].
    DealId
}

string_id! {
    /// Identifier of a user account.
    UserId
}

string_id! {
    /// Identifier of a chat message.
    MessageId
}

string_id! {
    /// Identifier of an uploaded deal document.
    DocumentId
}

string_id! {
    /// Identifier of a notification.
    NotificationId
}
