//! Room subscription state machine.
//!
//! Tracks the one deal room this client is a member of and provides the
//! deal-id filter the event router applies before touching any state.
//!
//! ```text
//! Unsubscribed ──join──▶ Joining ──first event / snapshot──▶ Joined
//!      ▲                    │                                  │
//!      └────────leave───────┴──────────────leave───────────────┘
//! ```
//!
//! The join is optimistic: no acknowledgment is awaited, and `Joining`
//! already accepts events for its deal id.

use chrono::{DateTime, Utc};

use crate::domain::DealId;

/// An active room membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMembership {
    /// Room joined.
    pub deal_id: DealId,
    /// When the join request was issued.
    pub joined_at: DateTime<Utc>,
}

/// Membership phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubscriptionState {
    /// No room.
    #[default]
    Unsubscribed,
    /// Join requested; nothing received yet.
    Joining(RoomMembership),
    /// Join confirmed by a snapshot or by an event for the room.
    Joined(RoomMembership),
}

/// Result of a [`RoomSubscription::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTicket {
    /// Epoch of the new membership. Asynchronous results tagged with an
    /// older epoch are stale.
    pub epoch: u64,
    /// Room that was implicitly left, if any.
    pub left: Option<DealId>,
}

/// Enforces one active deal room per client.
#[derive(Debug, Default)]
pub struct RoomSubscription {
    state: SubscriptionState,
    epoch: u64,
}

impl RoomSubscription {
    /// Creates an unsubscribed tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts joining `deal_id`, leaving any other room first.
    ///
    /// Joining the room that is already active still starts a new epoch,
    /// so a re-entered room never reuses results from the previous visit.
    pub fn join(&mut self, deal_id: DealId) -> JoinTicket {
        let left = self.active().cloned();
        self.epoch = self.epoch.wrapping_add(1);
        self.state = SubscriptionState::Joining(RoomMembership {
            deal_id,
            joined_at: Utc::now(),
        });
        JoinTicket {
            epoch: self.epoch,
            left,
        }
    }

    /// Confirms the pending join for `deal_id`. Returns `true` on the
    /// `Joining → Joined` transition.
    pub fn adopt(&mut self, deal_id: &DealId) -> bool {
        match std::mem::take(&mut self.state) {
            SubscriptionState::Joining(m) if &m.deal_id == deal_id => {
                self.state = SubscriptionState::Joined(m);
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Leaves `deal_id` if it is the active room. Idempotent: returns
    /// `false` when that room is not active.
    pub fn leave(&mut self, deal_id: &DealId) -> bool {
        if self.matches(deal_id) {
            self.state = SubscriptionState::Unsubscribed;
            self.epoch = self.epoch.wrapping_add(1);
            true
        } else {
            false
        }
    }

    /// Returns `true` if events for `deal_id` belong to the active room.
    #[must_use]
    pub fn matches(&self, deal_id: &DealId) -> bool {
        self.active() == Some(deal_id)
    }

    /// Returns `true` if `epoch` is the live membership of `deal_id`.
    #[must_use]
    pub fn is_current(&self, deal_id: &DealId, epoch: u64) -> bool {
        self.epoch == epoch && self.matches(deal_id)
    }

    /// The active room, joining or joined.
    #[must_use]
    pub fn active(&self) -> Option<&DealId> {
        match &self.state {
            SubscriptionState::Unsubscribed => None,
            SubscriptionState::Joining(m) | SubscriptionState::Joined(m) => Some(&m.deal_id),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> &SubscriptionState {
        &self.state
    }

    /// Current epoch.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let sub = RoomSubscription::new();
        assert!(!sub.matches(&DealId::new("d1")));
        assert_eq!(sub.active(), None);
    }

    #[test]
    fn joining_accepts_events_before_adoption() {
        let mut sub = RoomSubscription::new();
        sub.join(DealId::new("d1"));
        assert!(matches!(sub.state(), SubscriptionState::Joining(_)));
        assert!(sub.matches(&DealId::new("d1")));
        assert!(sub.adopt(&DealId::new("d1")));
        assert!(matches!(sub.state(), SubscriptionState::Joined(_)));
        assert!(!sub.adopt(&DealId::new("d1")));
    }

    #[test]
    fn switching_rooms_leaves_the_old_one() {
        let mut sub = RoomSubscription::new();
        let first = sub.join(DealId::new("a"));
        let second = sub.join(DealId::new("b"));
        assert_eq!(second.left, Some(DealId::new("a")));
        assert!(!sub.matches(&DealId::new("a")));
        assert!(!sub.is_current(&DealId::new("a"), first.epoch));
        assert!(sub.is_current(&DealId::new("b"), second.epoch));
    }

    #[test]
    fn leave_is_idempotent() {
        let mut sub = RoomSubscription::new();
        sub.join(DealId::new("a"));
        assert!(sub.leave(&DealId::new("a")));
        assert!(!sub.leave(&DealId::new("a")));
        assert_eq!(sub.state(), &SubscriptionState::Unsubscribed);
    }

    #[test]
    fn leave_of_other_room_keeps_membership() {
        let mut sub = RoomSubscription::new();
        sub.join(DealId::new("b"));
        assert!(!sub.leave(&DealId::new("a")));
        assert!(sub.matches(&DealId::new("b")));
    }

    #[test]
    fn reentry_gets_a_fresh_epoch() {
        let mut sub = RoomSubscription::new();
        let a1 = sub.join(DealId::new("a"));
        sub.join(DealId::new("b"));
        let a2 = sub.join(DealId::new("a"));
        assert!(!sub.is_current(&DealId::new("a"), a1.epoch));
        assert!(sub.is_current(&DealId::new("a"), a2.epoch));
    }
}
