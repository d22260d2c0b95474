//! Room layer: subscription, reconciliation store, event routing and
//! outbound validation for the active deal room.
//!
//! All types here are plain state owned by the room service task; none of
//! them lock or spawn.

pub mod gateway;
pub mod router;
pub mod store;
pub mod subscription;
pub mod typing;

pub use gateway::{
    OutboundGateway, validate_document_delete, validate_message, validate_price,
    validate_status_change,
};
pub use router::{EventRouter, Routed};
pub use store::{Applied, RoomSnapshot, RoomState, RoomStore, TypingState};
pub use subscription::{JoinTicket, RoomMembership, RoomSubscription, SubscriptionState};
pub use typing::TypingDebouncer;
