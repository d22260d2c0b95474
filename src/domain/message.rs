//! Chat messages exchanged inside a deal room.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DealId, MessageId, Participant};

/// A chat message. Messages form an append-only sequence per deal, in
/// the order the server delivered them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier.
    #[serde(rename = "_id")]
    pub id: MessageId,
    /// Deal the message belongs to.
    #[serde(rename = "deal")]
    pub deal_id: DealId,
    /// Author.
    pub sender: Participant,
    /// Text body.
    pub content: String,
    /// Server timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the recipient has read it.
    #[serde(default)]
    pub read: bool,
}
