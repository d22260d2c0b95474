//! Documents shared inside a deal room.

use serde::{Deserialize, Deserializer, Serialize};

use super::{DealId, DocumentId, Role, User, UserId};

/// Who may see a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessControl {
    /// Both parties.
    All,
    /// Buyers only.
    Buyer,
    /// Sellers only.
    Seller,
}

/// An uploaded document. Added and removed whole; never partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document identifier.
    #[serde(rename = "_id")]
    pub id: DocumentId,
    /// Deal the document belongs to.
    #[serde(rename = "deal")]
    pub deal_id: DealId,
    /// Uploader's account id. The server sends either the bare id or the
    /// populated user record.
    #[serde(deserialize_with = "uploader_id")]
    pub uploaded_by: UserId,
    /// Visibility rule.
    pub access_control: AccessControl,
    /// MIME type.
    pub file_type: String,
    /// File name as uploaded.
    pub original_name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UploaderRef {
    Id(UserId),
    Populated {
        #[serde(rename = "_id")]
        id: UserId,
    },
}

fn uploader_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UserId, D::Error> {
    Ok(match UploaderRef::deserialize(deserializer)? {
        UploaderRef::Id(id) | UploaderRef::Populated { id } => id,
    })
}

impl Document {
    /// Returns `true` if `user`, acting as `role`, may view this document.
    ///
    /// Uploaders always see their own documents.
    #[must_use]
    pub fn visible_to(&self, user: &User, role: Role) -> bool {
        match self.access_control {
            AccessControl::All => true,
            AccessControl::Buyer if role == Role::Buyer => true,
            AccessControl::Seller if role == Role::Seller => true,
            _ => self.uploaded_by == user.id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn doc(access: AccessControl, uploader: &str) -> Document {
        Document {
            id: DocumentId::new("doc"),
            deal_id: DealId::new("d1"),
            uploaded_by: UserId::new(uploader),
            access_control: access,
            file_type: "application/pdf".to_string(),
            original_name: "contract.pdf".to_string(),
        }
    }

    fn user(id: &str, role: Role) -> User {
        User {
            id: UserId::new(id),
            name: id.to_string(),
            email: String::new(),
            role,
        }
    }

    #[test]
    fn access_rules() {
        let buyer = user("b", Role::Buyer);
        assert!(doc(AccessControl::All, "s").visible_to(&buyer, Role::Buyer));
        assert!(doc(AccessControl::Buyer, "s").visible_to(&buyer, Role::Buyer));
        assert!(!doc(AccessControl::Seller, "s").visible_to(&buyer, Role::Buyer));
    }

    #[test]
    fn uploader_always_sees_own() {
        let buyer = user("b", Role::Buyer);
        assert!(doc(AccessControl::Seller, "b").visible_to(&buyer, Role::Buyer));
    }

    fn parse(uploaded_by: &str) -> Document {
        let json = format!(
            r#"{{"_id":"doc1","deal":"d1","uploadedBy":{uploaded_by},"accessControl":"seller","fileType":"application/pdf","originalName":"deed.pdf"}}"#
        );
        let Ok(document) = serde_json::from_str::<Document>(&json) else {
            panic!("document should parse: {json}");
        };
        document
    }

    #[test]
    fn uploader_as_bare_id() {
        assert_eq!(parse(r#""s""#).uploaded_by, UserId::new("s"));
    }

    #[test]
    fn uploader_as_populated_user() {
        let document = parse(r#"{"_id":"s","name":"Sam","email":"sam@example.com"}"#);
        assert_eq!(document.uploaded_by, UserId::new("s"));
        let seller = user("s", Role::Buyer);
        assert!(document.visible_to(&seller, Role::Buyer));
    }
}
