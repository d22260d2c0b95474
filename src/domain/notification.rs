//! User notifications and the unread-tracking feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DealId, NotificationId};

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Deal lifecycle news.
    Deal,
    /// New chat message.
    Message,
    /// Anything else the server sends.
    #[serde(other)]
    Other,
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification identifier.
    #[serde(rename = "_id")]
    pub id: NotificationId,
    /// Category.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Human-readable text.
    pub content: String,
    /// Deal the notification links to, if any.
    #[serde(default)]
    pub deal_id: Option<DealId>,
    /// Read flag.
    #[serde(default)]
    pub read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Newest-first notification list with an unread counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationFeed {
    items: Vec<Notification>,
    unread: usize,
}

impl NotificationFeed {
    /// Replaces the feed with a freshly fetched list.
    pub fn load(&mut self, items: Vec<Notification>) {
        self.unread = items.iter().filter(|n| !n.read).count();
        self.items = items;
    }

    /// Prepends a pushed notification.
    pub fn push(&mut self, notification: Notification) {
        if !notification.read {
            self.unread = self.unread.saturating_add(1);
        }
        self.items.insert(0, notification);
    }

    /// Marks one notification read.
    pub fn mark_read(&mut self, id: &NotificationId) {
        if let Some(n) = self.items.iter_mut().find(|n| &n.id == id)
            && !n.read
        {
            n.read = true;
            self.unread = self.unread.saturating_sub(1);
        }
    }

    /// Marks every notification read.
    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.read = true;
        }
        self.unread = 0;
    }

    /// Notifications, newest first.
    #[must_use]
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    /// Number of unread notifications.
    #[must_use]
    pub const fn unread(&self) -> usize {
        self.unread
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn notif(id: &str, read: bool) -> Notification {
        Notification {
            id: NotificationId::new(id),
            kind: NotificationKind::Deal,
            content: "deal accepted".to_string(),
            deal_id: Some(DealId::new("d1")),
            read,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn load_counts_unread() {
        let mut feed = NotificationFeed::default();
        feed.load(vec![notif("a", false), notif("b", true), notif("c", false)]);
        assert_eq!(feed.unread(), 2);
    }

    #[test]
    fn push_prepends() {
        let mut feed = NotificationFeed::default();
        feed.load(vec![notif("a", true)]);
        feed.push(notif("b", false));
        assert_eq!(feed.unread(), 1);
        assert_eq!(feed.items().first().map(|n| n.id.as_str()), Some("b"));
    }

    #[test]
    fn mark_read_saturates() {
        let mut feed = NotificationFeed::default();
        feed.load(vec![notif("a", false)]);
        feed.mark_read(&NotificationId::new("a"));
        feed.mark_read(&NotificationId::new("a"));
        assert_eq!(feed.unread(), 0);
    }

    #[test]
    fn mark_all_read_resets() {
        let mut feed = NotificationFeed::default();
        feed.load(vec![notif("a", false), notif("b", false)]);
        feed.mark_all_read();
        assert_eq!(feed.unread(), 0);
        assert!(feed.items().iter().all(|n| n.read));
    }

    #[test]
    fn unknown_kind_is_other() {
        let json = r#"{"_id":"n","type":"system","content":"hi","createdAt":"2024-05-01T10:00:00Z"}"#;
        let Ok(n) = serde_json::from_str::<Notification>(json) else {
            panic!("notification should parse");
        };
        assert_eq!(n.kind, NotificationKind::Other);
    }
}
