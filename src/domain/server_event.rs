//! Events pushed by the server over the real-time channel.
//!
//! Every room-scoped event carries the deal id it belongs to, either
//! directly (`dealId`) or inside the embedded record. The router reads it
//! through [`ServerEvent::deal_id`] before touching any state.

use serde::{Deserialize, Serialize};

use super::{
    Deal, DealId, Document, DocumentId, Message, Notification, Participant, PriceHistoryEntry,
};

/// Inbound real-time event, tagged by its wire event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A chat message was stored by the server.
    #[serde(rename = "new_message")]
    MessageCreated(Message),

    /// Someone started typing in a room.
    #[serde(rename = "user_typing", rename_all = "camelCase")]
    TypingStarted {
        /// Room the typing happens in.
        deal_id: DealId,
        /// Who is typing.
        user: Participant,
    },

    /// Someone stopped typing in a room.
    #[serde(rename = "user_stop_typing", rename_all = "camelCase")]
    TypingStopped {
        /// Room the typing happened in.
        deal_id: DealId,
    },

    /// A new price was proposed and accepted by the server.
    #[serde(rename = "price_updated", rename_all = "camelCase")]
    PriceUpdated {
        /// The deal after the update.
        deal: Deal,
        /// The recorded history entry.
        price_update: PriceHistoryEntry,
    },

    /// The deal's status changed; carries the whole record.
    #[serde(rename = "deal_status_updated")]
    DealStatusUpdated(Deal),

    /// A document was uploaded.
    #[serde(rename = "new_document")]
    DocumentAdded(Document),

    /// A document was deleted.
    #[serde(rename = "document_deleted", rename_all = "camelCase")]
    DocumentRemoved {
        /// Room the document belonged to.
        deal_id: DealId,
        /// Removed document.
        document_id: DocumentId,
    },

    /// A user notification; not scoped to any room.
    #[serde(rename = "new_notification")]
    NotificationReceived(Notification),
}

impl ServerEvent {
    /// Returns the deal id a room-scoped event belongs to, or `None` for
    /// events outside any room.
    #[must_use]
    pub fn deal_id(&self) -> Option<&DealId> {
        match self {
            Self::MessageCreated(m) => Some(&m.deal_id),
            Self::TypingStarted { deal_id, .. }
            | Self::TypingStopped { deal_id }
            | Self::DocumentRemoved { deal_id, .. } => Some(deal_id),
            Self::PriceUpdated { deal, .. } | Self::DealStatusUpdated(deal) => Some(&deal.id),
            Self::DocumentAdded(d) => Some(&d.deal_id),
            Self::NotificationReceived(_) => None,
        }
    }

    /// Returns the wire event name.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::MessageCreated(_) => "new_message",
            Self::TypingStarted { .. } => "user_typing",
            Self::TypingStopped { .. } => "user_stop_typing",
            Self::PriceUpdated { .. } => "price_updated",
            Self::DealStatusUpdated(_) => "deal_status_updated",
            Self::DocumentAdded(_) => "new_document",
            Self::DocumentRemoved { .. } => "document_deleted",
            Self::NotificationReceived(_) => "new_notification",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_typing_started() {
        let json = r#"{"event":"user_typing","data":{"dealId":"d1","user":{"_id":"u1","name":"Ada"}}}"#;
        let Ok(event) = serde_json::from_str::<ServerEvent>(json) else {
            panic!("event should parse");
        };
        assert_eq!(event.deal_id(), Some(&DealId::new("d1")));
        assert_eq!(event.event_name(), "user_typing");
    }

    #[test]
    fn parses_price_updated() {
        let json = r#"{"event":"price_updated","data":{
            "deal":{"_id":"d1","title":"Loft","price":90,"status":"pending",
                    "buyer":{"_id":"b","name":"B"},"seller":{"_id":"s","name":"S"}},
            "priceUpdate":{"price":90,"user":{"_id":"b","name":"B","role":"buyer"},
                           "timestamp":"2024-05-01T10:00:00Z"}}}"#;
        let Ok(event) = serde_json::from_str::<ServerEvent>(json) else {
            panic!("event should parse");
        };
        let ServerEvent::PriceUpdated { deal, price_update } = event else {
            panic!("wrong variant");
        };
        assert!((deal.price - 90.0).abs() < f64::EPSILON);
        assert!((price_update.price - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn document_removed_names() {
        let json = r#"{"event":"document_deleted","data":{"dealId":"d1","documentId":"x"}}"#;
        let Ok(event) = serde_json::from_str::<ServerEvent>(json) else {
            panic!("event should parse");
        };
        assert_eq!(
            event,
            ServerEvent::DocumentRemoved {
                deal_id: DealId::new("d1"),
                document_id: DocumentId::new("x"),
            }
        );
    }

    #[test]
    fn unknown_event_is_rejected() {
        let json = r#"{"event":"presence","data":{}}"#;
        assert!(serde_json::from_str::<ServerEvent>(json).is_err());
    }

    #[test]
    fn new_document_with_populated_uploader_routes_by_deal() {
        let json = r#"{"event":"new_document","data":{"_id":"doc1","deal":"d1","uploadedBy":{"_id":"s","name":"Sam"},"accessControl":"all","fileType":"image/png","originalName":"plan.png"}}"#;
        let Ok(ServerEvent::DocumentAdded(document)) = serde_json::from_str::<ServerEvent>(json)
        else {
            panic!("new_document should decode");
        };
        assert_eq!(document.uploaded_by.as_str(), "s");
        assert_eq!(document.deal_id, DealId::new("d1"));
    }
}
