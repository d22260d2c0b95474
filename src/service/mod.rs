//! Service layer: the room session actor.
//!
//! [`RoomService`] owns the connection, subscription, store and gateway
//! in one task and publishes a [`RoomView`] plus lifecycle events through
//! the [`super::domain::EventBus`].

pub mod room_service;

pub use room_service::{RoomGuard, RoomHandle, RoomService, RoomView};
