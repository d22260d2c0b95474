//! # dealroom-client
//!
//! Real-time session manager for marketplace deal rooms.
//!
//! A deal room is the shared view of one deal: its chat, documents, price
//! negotiation and status. This crate keeps one authenticated WebSocket
//! connection per session, keeps at most one room active, reconciles the
//! REST snapshot of that room with the events the server pushes, and
//! validates outbound actions before they leave the client.
//!
//! ## Architecture
//!
//! ```text
//! Front end (CLI, UI)
//!     │
//!     ├── RoomHandle / RoomGuard (service/)
//!     │
//!     ├── RoomService actor (service/)
//!     │     ├── ConnectionManager ── Connector (ws/)
//!     │     ├── RoomSubscription, EventRouter, RoomStore (room/)
//!     │     ├── OutboundGateway + typing debounce (room/)
//!     │     └── EventBus (domain/)
//!     │
//!     └── DealApi REST client (api/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod room;
pub mod service;
pub mod ws;
