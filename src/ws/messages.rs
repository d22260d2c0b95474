//! WebSocket message types: envelope and outbound actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DealId, MessageId, ServerEvent};

/// Top-level WebSocket message envelope, used in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFrame {
    /// Client-generated id for outbound frames; server-provided for events.
    #[serde(default)]
    pub id: String,
    /// Event name discriminator (e.g. `"join_deal"`, `"new_message"`).
    pub event: String,
    /// ISO-8601 timestamp.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Event-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WireFrame {
    /// Wraps an outbound action in a fresh envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the action cannot be serialized.
    pub fn from_action(action: &ClientAction) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            event: action.event_name().to_string(),
            timestamp: Utc::now(),
            data: action.data()?,
        })
    }

    /// Wraps a server event in an envelope, as a server would send it.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the event cannot be serialized.
    pub fn from_event(event: &ServerEvent) -> Result<Self, serde_json::Error> {
        let data = match serde_json::to_value(event)? {
            serde_json::Value::Object(mut map) => map.remove("data").unwrap_or_default(),
            _ => serde_json::Value::Null,
        };
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            event: event.event_name().to_string(),
            timestamp: Utc::now(),
            data,
        })
    }

    /// Decodes the frame as a server event.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] for unknown event names or payloads
    /// that do not match the event's shape.
    pub fn to_server_event(&self) -> Result<ServerEvent, serde_json::Error> {
        serde_json::from_value(serde_json::json!({
            "event": self.event,
            "data": self.data,
        }))
    }

    /// Decodes the frame as a client action.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] for unknown event names or payloads
    /// that do not match the action's shape.
    pub fn to_client_action(&self) -> Result<ClientAction, serde_json::Error> {
        serde_json::from_value(serde_json::json!({
            "event": self.event,
            "data": self.data,
        }))
    }
}

/// Actions the client emits on the real-time channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientAction {
    /// Enter a deal room.
    #[serde(rename = "join_deal", rename_all = "camelCase")]
    JoinDeal {
        /// Room to join.
        deal_id: DealId,
    },
    /// Leave a deal room.
    #[serde(rename = "leave_deal", rename_all = "camelCase")]
    LeaveDeal {
        /// Room to leave.
        deal_id: DealId,
    },
    /// Post a chat message.
    #[serde(rename = "send_message", rename_all = "camelCase")]
    SendMessage {
        /// Target room.
        deal_id: DealId,
        /// Message text.
        message: String,
    },
    /// The local user started typing.
    #[serde(rename = "typing_start", rename_all = "camelCase")]
    TypingStart {
        /// Room being typed in.
        deal_id: DealId,
    },
    /// The local user stopped typing.
    #[serde(rename = "typing_stop", rename_all = "camelCase")]
    TypingStop {
        /// Room being typed in.
        deal_id: DealId,
    },
    /// Propose a new price.
    #[serde(rename = "update_price", rename_all = "camelCase")]
    UpdatePrice {
        /// Negotiated deal.
        deal_id: DealId,
        /// Proposed price.
        price: f64,
    },
    /// Acknowledge a received message.
    #[serde(rename = "mark_read", rename_all = "camelCase")]
    MarkRead {
        /// Message read.
        message_id: MessageId,
    },
}

impl ClientAction {
    /// Returns the wire event name.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::JoinDeal { .. } => "join_deal",
            Self::LeaveDeal { .. } => "leave_deal",
            Self::SendMessage { .. } => "send_message",
            Self::TypingStart { .. } => "typing_start",
            Self::TypingStop { .. } => "typing_stop",
            Self::UpdatePrice { .. } => "update_price",
            Self::MarkRead { .. } => "mark_read",
        }
    }

    /// Returns the serialized payload without the event tag.
    fn data(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(match serde_json::to_value(self)? {
            serde_json::Value::Object(mut map) => map.remove("data").unwrap_or_default(),
            _ => serde_json::Value::Null,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn action_frame_has_camel_case_payload() {
        let action = ClientAction::UpdatePrice {
            deal_id: DealId::new("d1"),
            price: 90.0,
        };
        let Ok(frame) = WireFrame::from_action(&action) else {
            panic!("frame should build");
        };
        assert_eq!(frame.event, "update_price");
        assert_eq!(frame.data, serde_json::json!({"dealId": "d1", "price": 90.0}));
        assert!(!frame.id.is_empty());
    }

    #[test]
    fn frame_decodes_back_to_action() {
        let action = ClientAction::MarkRead {
            message_id: MessageId::new("m1"),
        };
        let Ok(frame) = WireFrame::from_action(&action) else {
            panic!("frame should build");
        };
        let Ok(decoded) = frame.to_client_action() else {
            panic!("frame should decode");
        };
        assert_eq!(decoded, action);
    }

    #[test]
    fn inbound_frame_without_id_or_timestamp_parses() {
        let text = r#"{"event":"user_stop_typing","data":{"dealId":"d1"}}"#;
        let Ok(frame) = serde_json::from_str::<WireFrame>(text) else {
            panic!("frame should parse");
        };
        let Ok(event) = frame.to_server_event() else {
            panic!("event should decode");
        };
        assert_eq!(
            event,
            ServerEvent::TypingStopped {
                deal_id: DealId::new("d1")
            }
        );
    }

    #[test]
    fn unknown_inbound_event_fails_to_decode() {
        let frame = WireFrame {
            id: String::new(),
            event: "presence".to_string(),
            timestamp: Utc::now(),
            data: serde_json::Value::Null,
        };
        assert!(frame.to_server_event().is_err());
    }
}
