//! User accounts and the participant summaries embedded in other records.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Marketplace role of an account, or a user's side in a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Makes offers; offers must descend.
    Buyer,
    /// Asks prices; asks must ascend.
    Seller,
    /// Platform administrator. Not bound by the negotiation direction rule.
    Admin,
}

impl Role {
    /// Returns the role as its wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }
}

/// The authenticated account, as returned by `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Account id.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Account role.
    pub role: Role,
}

/// Compact user reference embedded in deals, messages and price history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Account id.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Role, when the server populates it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl From<&User> for Participant {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            role: Some(user.role),
        }
    }
}
