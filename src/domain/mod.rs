//! Domain layer: entity types, identifiers, and the client event system.
//!
//! This module contains the client-side model of the marketplace: deals,
//! messages, documents, notifications, the authenticated session, the
//! events the server pushes, and the bus the client uses to announce
//! lifecycle changes to its observers.

pub mod client_event;
pub mod deal;
pub mod deal_id;
pub mod document;
pub mod event_bus;
pub mod message;
pub mod notification;
pub mod server_event;
pub mod session;
pub mod user;

pub use client_event::{ClientEvent, NoticeLevel};
pub use deal::{Deal, DealStatus, PriceHistoryEntry};
pub use deal_id::{DealId, DocumentId, MessageId, NotificationId, UserId};
pub use document::{AccessControl, Document};
pub use event_bus::EventBus;
pub use message::Message;
pub use notification::{Notification, NotificationFeed, NotificationKind};
pub use server_event::ServerEvent;
pub use session::{AuthToken, ConnectionState, Session};
pub use user::{Participant, Role, User};
