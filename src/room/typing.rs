//! Typing indicator debounce.
//!
//! The first keystroke of an idle period emits `typing_start`; further
//! keystrokes only push the deadline out. `typing_stop` is emitted once,
//! when the deadline passes or when a message is sent.

use std::time::Duration;

use tokio::time::Instant;

use crate::domain::DealId;
use crate::ws::ClientAction;

/// Idle-timer debouncer for typing notifications.
#[derive(Debug, Clone)]
pub struct TypingDebouncer {
    idle: Duration,
    active: Option<(DealId, Instant)>,
}

impl TypingDebouncer {
    /// Creates a debouncer with the given idle period.
    #[must_use]
    pub const fn new(idle: Duration) -> Self {
        Self { idle, active: None }
    }

    /// Records a keystroke in `deal_id` at `now`.
    ///
    /// Returns `typing_start` only when no typing period is open. A period
    /// whose deadline already passed is closed first, so a late keystroke
    /// yields `typing_stop` followed by a fresh `typing_start`. A keystroke
    /// in a different room closes the old period silently; the old room was
    /// already left.
    pub fn keystroke(&mut self, deal_id: &DealId, now: Instant) -> Vec<ClientAction> {
        let mut actions: Vec<ClientAction> = self.poll(now).into_iter().collect();
        let deadline = now + self.idle;
        match self.active.as_mut() {
            Some((active, until)) if active == deal_id => *until = deadline,
            _ => {
                self.active = Some((deal_id.clone(), deadline));
                actions.push(ClientAction::TypingStart {
                    deal_id: deal_id.clone(),
                });
            }
        }
        actions
    }

    /// Emits `typing_stop` if the idle deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<ClientAction> {
        match &self.active {
            Some((_, until)) if now >= *until => self.stop(),
            _ => None,
        }
    }

    /// Closes the typing period immediately, e.g. because a message was
    /// sent. Returns `typing_stop` if a period was open.
    pub fn stop(&mut self) -> Option<ClientAction> {
        self.active
            .take()
            .map(|(deal_id, _)| ClientAction::TypingStop { deal_id })
    }

    /// Drops any open period without emitting anything.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// When the open period expires, if one is open.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.active.as_ref().map(|(_, until)| *until)
    }
}
