//! Deals and their negotiated price history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DealId, Participant, Role, User, UserId};

/// Lifecycle status of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DealStatus {
    /// Created, waiting for the seller to accept.
    Pending,
    /// Accepted; negotiation and chat continue.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Abandoned by either side.
    Cancelled,
}

impl DealStatus {
    /// Returns `true` once the deal can no longer change price or receive
    /// chat messages.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns `true` if a user acting as `role` may move a deal from
    /// `self` to `next`.
    ///
    /// Accepting (`pending → in-progress`) is reserved to the seller;
    /// anyone may cancel a pending deal or complete one in progress.
    #[must_use]
    pub fn can_transition_to(self, next: Self, role: Role) -> bool {
        match (self, next) {
            (Self::Pending, Self::InProgress) => role == Role::Seller,
            (Self::Pending, Self::Cancelled) | (Self::InProgress, Self::Completed) => true,
            _ => false,
        }
    }

    /// Returns the status as its wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for DealStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown deal status: {other}")),
        }
    }
}

/// Server-issued deal record. The client never edits it; every change
/// arrives as a whole replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    /// Deal identifier.
    #[serde(rename = "_id")]
    pub id: DealId,
    /// Short title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Current negotiated price.
    pub price: f64,
    /// Lifecycle status.
    pub status: DealStatus,
    /// Buying party.
    pub buyer: Participant,
    /// Selling party, if assigned.
    #[serde(default)]
    pub seller: Option<Participant>,
}

impl Deal {
    /// Returns the side `user_id` plays in this deal, if any.
    #[must_use]
    pub fn role_of(&self, user_id: &UserId) -> Option<Role> {
        if &self.buyer.id == user_id {
            Some(Role::Buyer)
        } else if self.seller.as_ref().is_some_and(|s| &s.id == user_id) {
            Some(Role::Seller)
        } else {
            None
        }
    }

    /// Role `user` acts with in this deal: their side when they are a
    /// participant, their account role otherwise.
    #[must_use]
    pub fn acting_role(&self, user: &User) -> Role {
        self.role_of(&user.id).unwrap_or(user.role)
    }
}

/// One recorded offer or ask. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    /// Proposed price.
    pub price: f64,
    /// Who proposed it.
    pub user: Participant,
    /// When the server recorded it.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn participant(id: &str) -> Participant {
        Participant {
            id: UserId::new(id),
            name: id.to_string(),
            role: None,
        }
    }

    fn deal() -> Deal {
        Deal {
            id: DealId::new("d1"),
            title: "Loft".to_string(),
            description: String::new(),
            price: 100.0,
            status: DealStatus::Pending,
            buyer: participant("b"),
            seller: Some(participant("s")),
        }
    }

    #[test]
    fn status_uses_kebab_case() {
        let Ok(json) = serde_json::to_string(&DealStatus::InProgress) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"in-progress\"");
        assert_eq!("in-progress".parse::<DealStatus>(), Ok(DealStatus::InProgress));
        assert!("open".parse::<DealStatus>().is_err());
    }

    #[test]
    fn closed_statuses() {
        assert!(!DealStatus::Pending.is_closed());
        assert!(!DealStatus::InProgress.is_closed());
        assert!(DealStatus::Completed.is_closed());
        assert!(DealStatus::Cancelled.is_closed());
    }

    #[test]
    fn only_seller_accepts() {
        assert!(DealStatus::Pending.can_transition_to(DealStatus::InProgress, Role::Seller));
        assert!(!DealStatus::Pending.can_transition_to(DealStatus::InProgress, Role::Buyer));
        assert!(DealStatus::Pending.can_transition_to(DealStatus::Cancelled, Role::Buyer));
        assert!(DealStatus::InProgress.can_transition_to(DealStatus::Completed, Role::Buyer));
        assert!(!DealStatus::Completed.can_transition_to(DealStatus::Pending, Role::Admin));
    }

    #[test]
    fn role_of_participants() {
        let d = deal();
        assert_eq!(d.role_of(&UserId::new("b")), Some(Role::Buyer));
        assert_eq!(d.role_of(&UserId::new("s")), Some(Role::Seller));
        assert_eq!(d.role_of(&UserId::new("x")), None);
    }

    #[test]
    fn acting_role_falls_back_to_account() {
        let d = deal();
        let outsider = User {
            id: UserId::new("x"),
            name: "X".to_string(),
            email: String::new(),
            role: Role::Admin,
        };
        assert_eq!(d.acting_role(&outsider), Role::Admin);
    }
}
