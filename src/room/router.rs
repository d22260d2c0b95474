//! Event router: demultiplexes inbound server events.
//!
//! Room-scoped events are checked against the subscription by their own
//! deal id before they reach the store, so late events from a room the
//! user already left never bleed into the next one. Events are handled one
//! at a time in receipt order.

use crate::domain::{NotificationFeed, ServerEvent, UserId};
use crate::ws::ClientAction;

use super::store::{Applied, RoomStore};
use super::subscription::RoomSubscription;

/// What the router did with one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// Applied to the active room.
    Applied,
    /// Held by the store until the snapshot arrives.
    Buffered,
    /// For a room this client is not in; dropped.
    Dropped,
    /// Added to the notification feed.
    Notification,
}

/// Routes inbound events to store slices and decides follow-up actions.
#[derive(Debug, Clone)]
pub struct EventRouter {
    current_user: UserId,
}

impl EventRouter {
    /// Creates a router acting for `current_user`.
    #[must_use]
    pub const fn new(current_user: UserId) -> Self {
        Self { current_user }
    }

    /// Routes one event. Returns the outcome and an optional action to emit
    /// (a read receipt for messages from the other party).
    pub fn route(
        &self,
        event: &ServerEvent,
        subscription: &mut RoomSubscription,
        store: &mut RoomStore,
        feed: &mut NotificationFeed,
    ) -> (Routed, Option<ClientAction>) {
        if let ServerEvent::NotificationReceived(notification) = event {
            feed.push(notification.clone());
            return (Routed::Notification, None);
        }

        let Some(deal_id) = event.deal_id() else {
            return (Routed::Dropped, None);
        };
        if !subscription.matches(deal_id) {
            tracing::debug!(%deal_id, event = event.event_name(), "dropping event for inactive room");
            return (Routed::Dropped, None);
        }
        if subscription.adopt(deal_id) {
            tracing::debug!(%deal_id, "membership adopted from first event");
        }

        let routed = match store.apply(event) {
            Applied::Applied => Routed::Applied,
            Applied::Buffered => Routed::Buffered,
            Applied::Ignored => Routed::Dropped,
        };

        let follow_up = match event {
            ServerEvent::MessageCreated(message)
                if routed != Routed::Dropped && message.sender.id != self.current_user =>
            {
                Some(ClientAction::MarkRead {
                    message_id: message.id.clone(),
                })
            }
            _ => None,
        };

        (routed, follow_up)
    }
}
