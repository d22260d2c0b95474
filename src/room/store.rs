//! Local reconciliation store for the active room.
//!
//! The store holds the UI-visible state of exactly one deal room. It is
//! written only by the initial snapshot load and by the event router.
//! Events that reach the store before the snapshot are buffered and
//! replayed, in receipt order, once the snapshot is installed.

use serde::Serialize;

use crate::domain::{
    Deal, DealId, Document, Message, Participant, PriceHistoryEntry, Role, ServerEvent, User,
    UserId,
};

/// The four REST resources that make up a room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    /// The deal record.
    pub deal: Deal,
    /// Chat history, oldest first.
    pub messages: Vec<Message>,
    /// Shared documents.
    pub documents: Vec<Document>,
    /// Price history, newest first.
    pub price_history: Vec<PriceHistoryEntry>,
}

/// Who is currently typing in the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypingState {
    /// Typing user's id.
    pub user_id: UserId,
    /// Typing user's display name.
    pub name: String,
}

impl From<&Participant> for TypingState {
    fn from(p: &Participant) -> Self {
        Self {
            user_id: p.id.clone(),
            name: p.name.clone(),
        }
    }
}

/// Reconciled view of one room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomState {
    /// Latest server-issued deal.
    pub deal: Deal,
    /// Messages in server order.
    pub messages: Vec<Message>,
    /// Documents in arrival order.
    pub documents: Vec<Document>,
    /// Price history, newest first.
    pub price_history: Vec<PriceHistoryEntry>,
    /// Typing indicator.
    pub typing: Option<TypingState>,
}

impl RoomState {
    /// Percentage change of the current price against the oldest recorded
    /// price. `None` until at least two entries exist.
    #[must_use]
    pub fn price_change_percent(&self) -> Option<f64> {
        if self.price_history.len() < 2 {
            return None;
        }
        let initial = self.price_history.last()?.price;
        if initial == 0.0 {
            return None;
        }
        Some((self.deal.price - initial) / initial * 100.0)
    }

    /// Documents `user` may see, given their side in the deal.
    #[must_use]
    pub fn visible_documents(&self, user: &User) -> Vec<&Document> {
        let role: Role = self.deal.acting_role(user);
        self.documents
            .iter()
            .filter(|d| d.visible_to(user, role))
            .collect()
    }

    fn from_snapshot(snapshot: RoomSnapshot) -> Self {
        Self {
            deal: snapshot.deal,
            messages: snapshot.messages,
            documents: snapshot.documents,
            price_history: snapshot.price_history,
            typing: None,
        }
    }

    /// Applies a room event. `replay` marks events buffered before the
    /// snapshot, which may already be reflected in it.
    fn apply(&mut self, event: &ServerEvent, replay: bool) {
        match event {
            ServerEvent::MessageCreated(message) => {
                if !self.messages.iter().any(|m| m.id == message.id) {
                    self.messages.push(message.clone());
                }
            }
            ServerEvent::TypingStarted { user, .. } => {
                self.typing = Some(TypingState::from(user));
            }
            ServerEvent::TypingStopped { .. } => {
                self.typing = None;
            }
            ServerEvent::PriceUpdated { deal, price_update } => {
                self.deal = deal.clone();
                if !(replay && self.price_history.contains(price_update)) {
                    self.price_history.insert(0, price_update.clone());
                }
            }
            ServerEvent::DealStatusUpdated(deal) => {
                self.deal = deal.clone();
            }
            ServerEvent::DocumentAdded(document) => {
                if !self.documents.iter().any(|d| d.id == document.id) {
                    self.documents.push(document.clone());
                }
            }
            ServerEvent::DocumentRemoved { document_id, .. } => {
                self.documents.retain(|d| &d.id != document_id);
            }
            ServerEvent::NotificationReceived(_) => {}
        }
    }
}

/// What the store did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Mutated the room state.
    Applied,
    /// Held until the snapshot arrives.
    Buffered,
    /// Not for this room; state untouched.
    Ignored,
}

/// Single source of truth for the active room.
#[derive(Debug, Default)]
pub struct RoomStore {
    deal_id: Option<DealId>,
    state: Option<RoomState>,
    pending: Vec<ServerEvent>,
}

impl RoomStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets the store at `deal_id`, discarding everything held for any
    /// previous room.
    pub fn open(&mut self, deal_id: DealId) {
        self.clear();
        self.deal_id = Some(deal_id);
    }

    /// Drops all state, buffered events included.
    pub fn clear(&mut self) {
        self.deal_id = None;
        self.state = None;
        self.pending.clear();
    }

    /// Installs the snapshot for the targeted room and replays buffered
    /// events in order. Returns the number of replayed events, or `None`
    /// if the snapshot belongs to another room.
    pub fn install(&mut self, deal_id: &DealId, snapshot: RoomSnapshot) -> Option<usize> {
        if self.deal_id.as_ref() != Some(deal_id) {
            return None;
        }
        let mut state = RoomState::from_snapshot(snapshot);
        let pending = std::mem::take(&mut self.pending);
        for event in &pending {
            state.apply(event, true);
        }
        self.state = Some(state);
        Some(pending.len())
    }

    /// Applies an event addressed to the targeted room.
    pub fn apply(&mut self, event: &ServerEvent) -> Applied {
        let Some(target) = self.deal_id.as_ref() else {
            return Applied::Ignored;
        };
        if event.deal_id() != Some(target) {
            return Applied::Ignored;
        }
        match self.state.as_mut() {
            Some(state) => {
                state.apply(event, false);
                Applied::Applied
            }
            None => {
                self.pending.push(event.clone());
                Applied::Buffered
            }
        }
    }

    /// Targeted room, if any.
    #[must_use]
    pub fn deal_id(&self) -> Option<&DealId> {
        self.deal_id.as_ref()
    }

    /// Reconciled state, once loaded.
    #[must_use]
    pub fn state(&self) -> Option<&RoomState> {
        self.state.as_ref()
    }

    /// Returns `true` once the snapshot is installed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state.is_some()
    }

    /// Number of events waiting for the snapshot.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::{AccessControl, DealStatus, DocumentId, MessageId};

    pub(crate) fn participant(id: &str, role: Role) -> Participant {
        Participant {
            id: UserId::new(id),
            name: id.to_uppercase(),
            role: Some(role),
        }
    }

    pub(crate) fn deal(id: &str, price: f64) -> Deal {
        Deal {
            id: DealId::new(id),
            title: "Warehouse".to_string(),
            description: "Industrial unit".to_string(),
            price,
            status: DealStatus::Pending,
            buyer: participant("buyer", Role::Buyer),
            seller: Some(participant("seller", Role::Seller)),
        }
    }

    pub(crate) fn message(id: &str, deal_id: &str, sender: &str) -> Message {
        Message {
            id: MessageId::new(id),
            deal_id: DealId::new(deal_id),
            sender: participant(sender, Role::Buyer),
            content: format!("message {id}"),
            created_at: Utc::now(),
            read: false,
        }
    }

    pub(crate) fn snapshot(deal_id: &str, price: f64) -> RoomSnapshot {
        RoomSnapshot {
            deal: deal(deal_id, price),
            messages: Vec::new(),
            documents: Vec::new(),
            price_history: Vec::new(),
        }
    }

    pub(crate) fn price_event(deal_id: &str, price: f64, secs: i64) -> ServerEvent {
        ServerEvent::PriceUpdated {
            deal: deal(deal_id, price),
            price_update: PriceHistoryEntry {
                price,
                user: participant("buyer", Role::Buyer),
                timestamp: Utc.timestamp_opt(1_700_000_000 + secs, 0).single().unwrap_or_default(),
            },
        }
    }

    pub(crate) fn document(id: &str, deal_id: &str) -> Document {
        Document {
            id: DocumentId::new(id),
            deal_id: DealId::new(deal_id),
            uploaded_by: UserId::new("seller"),
            access_control: AccessControl::All,
            file_type: "application/pdf".to_string(),
            original_name: format!("{id}.pdf"),
        }
    }

    fn loaded(deal_id: &str, price: f64) -> RoomStore {
        let mut store = RoomStore::new();
        store.open(DealId::new(deal_id));
        let _ = store.install(&DealId::new(deal_id), snapshot(deal_id, price));
        store
    }

    #[test]
    fn price_updates_prepend_history() {
        let mut store = loaded("d1", 100.0);
        for (i, price) in [95.0, 92.0, 90.0].into_iter().enumerate() {
            let secs = i64::try_from(i).unwrap_or_default();
            assert_eq!(store.apply(&price_event("d1", price, secs)), Applied::Applied);
        }
        let Some(state) = store.state() else {
            panic!("store should be loaded");
        };
        assert!((state.deal.price - 90.0).abs() < f64::EPSILON);
        let prices: Vec<f64> = state.price_history.iter().map(|e| e.price).collect();
        assert_eq!(prices, vec![90.0, 92.0, 95.0]);
    }

    #[test]
    fn events_for_other_rooms_are_ignored() {
        let mut store = loaded("d1", 100.0);
        assert_eq!(store.apply(&price_event("d2", 50.0, 0)), Applied::Ignored);
        assert_eq!(
            store.apply(&ServerEvent::MessageCreated(message("m", "d2", "x"))),
            Applied::Ignored
        );
        let Some(state) = store.state() else {
            panic!("store should be loaded");
        };
        assert!((state.deal.price - 100.0).abs() < f64::EPSILON);
        assert!(state.messages.is_empty());
    }

    #[test]
    fn early_events_are_buffered_then_replayed() {
        let mut store = RoomStore::new();
        store.open(DealId::new("d1"));
        let m1 = ServerEvent::MessageCreated(message("m1", "d1", "seller"));
        let m2 = ServerEvent::MessageCreated(message("m2", "d1", "seller"));
        assert_eq!(store.apply(&m1), Applied::Buffered);
        assert_eq!(store.apply(&m2), Applied::Buffered);
        assert_eq!(store.pending_len(), 2);

        let mut snap = snapshot("d1", 100.0);
        snap.messages.push(message("m1", "d1", "seller"));
        assert_eq!(store.install(&DealId::new("d1"), snap), Some(2));

        let Some(state) = store.state() else {
            panic!("store should be loaded");
        };
        let ids: Vec<&str> = state.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
        assert_eq!(store.pending_len(), 0);
    }

    #[test]
    fn replayed_price_entry_already_in_snapshot_is_not_duplicated() {
        let mut store = RoomStore::new();
        store.open(DealId::new("d1"));
        let event = price_event("d1", 90.0, 1);
        assert_eq!(store.apply(&event), Applied::Buffered);

        let mut snap = snapshot("d1", 90.0);
        if let ServerEvent::PriceUpdated { price_update, .. } = &event {
            snap.price_history.push(price_update.clone());
        }
        let _ = store.install(&DealId::new("d1"), snap);
        assert_eq!(store.state().map(|s| s.price_history.len()), Some(1));
    }

    #[test]
    fn snapshot_for_other_room_is_rejected() {
        let mut store = RoomStore::new();
        store.open(DealId::new("b"));
        assert_eq!(store.install(&DealId::new("a"), snapshot("a", 1.0)), None);
        assert!(!store.is_loaded());
    }

    #[test]
    fn typing_and_documents() {
        let mut store = loaded("d1", 100.0);
        let _ = store.apply(&ServerEvent::TypingStarted {
            deal_id: DealId::new("d1"),
            user: participant("seller", Role::Seller),
        });
        assert_eq!(
            store.state().and_then(|s| s.typing.as_ref()).map(|t| t.name.as_str()),
            Some("SELLER")
        );
        let _ = store.apply(&ServerEvent::TypingStopped {
            deal_id: DealId::new("d1"),
        });
        assert!(store.state().is_some_and(|s| s.typing.is_none()));

        let _ = store.apply(&ServerEvent::DocumentAdded(document("x", "d1")));
        let _ = store.apply(&ServerEvent::DocumentAdded(document("y", "d1")));
        let _ = store.apply(&ServerEvent::DocumentRemoved {
            deal_id: DealId::new("d1"),
            document_id: DocumentId::new("x"),
        });
        let ids: Vec<String> = store
            .state()
            .map(|s| s.documents.iter().map(|d| d.id.to_string()).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec!["y".to_string()]);
    }

    #[test]
    fn status_update_replaces_deal() {
        let mut store = loaded("d1", 100.0);
        let mut updated = deal("d1", 100.0);
        updated.status = DealStatus::Cancelled;
        let _ = store.apply(&ServerEvent::DealStatusUpdated(updated.clone()));
        assert_eq!(store.state().map(|s| &s.deal), Some(&updated));
    }

    #[test]
    fn clear_drops_everything() {
        let mut store = loaded("d1", 100.0);
        store.clear();
        assert!(store.state().is_none());
        assert_eq!(store.deal_id(), None);
        assert_eq!(store.apply(&price_event("d1", 90.0, 0)), Applied::Ignored);
    }

    #[test]
    fn price_change_needs_two_entries() {
        let mut store = loaded("d1", 100.0);
        let _ = store.apply(&price_event("d1", 100.0, 0));
        assert_eq!(store.state().and_then(RoomState::price_change_percent), None);
        let _ = store.apply(&price_event("d1", 90.0, 1));
        let Some(change) = store.state().and_then(RoomState::price_change_percent) else {
            panic!("change should be computed");
        };
        assert!((change + 10.0).abs() < 1e-9);
    }
}
