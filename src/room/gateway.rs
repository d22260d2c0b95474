//! Outbound action gateway.
//!
//! Validates local intents against the room state and emits them on the
//! connection. The gateway never writes to the store: a sent message or
//! price only shows up once the server echoes it back as an event.

use std::time::Duration;

use tokio::time::Instant;

use crate::domain::{Deal, DealId, DealStatus, Document, DocumentId, Role, User};
use crate::error::{ClientError, ValidationError};
use crate::ws::{ClientAction, ConnectionManager};

use super::typing::TypingDebouncer;

/// Rejects empty messages and messages to closed deals.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyMessage`] for empty or whitespace-only
/// content and [`ValidationError::DealClosed`] for completed or cancelled
/// deals.
pub fn validate_message(deal: &Deal, content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    if deal.status.is_closed() {
        return Err(ValidationError::DealClosed(deal.status));
    }
    Ok(())
}

/// Checks a proposed price against the negotiation direction rule.
///
/// Buyers must offer strictly below the current price, sellers must ask
/// strictly above it. Other roles are only held to a positive price.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPrice`] for non-finite or
/// non-positive prices, [`ValidationError::DealClosed`] once negotiation
/// has ended, and [`ValidationError::OfferNotLower`] /
/// [`ValidationError::AskNotHigher`] for direction violations.
pub fn validate_price(deal: &Deal, role: Role, price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::InvalidPrice(price));
    }
    if deal.status.is_closed() {
        return Err(ValidationError::DealClosed(deal.status));
    }
    match role {
        Role::Buyer if price >= deal.price => Err(ValidationError::OfferNotLower {
            offered: price,
            current: deal.price,
        }),
        Role::Seller if price <= deal.price => Err(ValidationError::AskNotHigher {
            asked: price,
            current: deal.price,
        }),
        _ => Ok(()),
    }
}

/// Checks a requested status change.
///
/// # Errors
///
/// Returns [`ValidationError::StatusTransition`] when `role` may not move
/// the deal to `next`.
pub fn validate_status_change(
    deal: &Deal,
    role: Role,
    next: DealStatus,
) -> Result<(), ValidationError> {
    if deal.status.can_transition_to(next, role) {
        Ok(())
    } else {
        Err(ValidationError::StatusTransition {
            from: deal.status,
            to: next,
            role,
        })
    }
}

/// Finds `document_id` among `documents` and checks that `user` may
/// delete it: the uploader or an admin account.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownDocument`] when the document is not in
/// the room and [`ValidationError::DeleteForbidden`] for anyone else.
pub fn validate_document_delete(
    documents: &[Document],
    user: &User,
    document_id: &DocumentId,
) -> Result<(), ValidationError> {
    let document = documents
        .iter()
        .find(|d| &d.id == document_id)
        .ok_or_else(|| ValidationError::UnknownDocument(document_id.clone()))?;
    if document.uploaded_by == user.id || user.role == Role::Admin {
        Ok(())
    } else {
        Err(ValidationError::DeleteForbidden(document_id.clone()))
    }
}

/// Validation and emission layer for user-initiated real-time actions.
#[derive(Debug, Clone)]
pub struct OutboundGateway {
    typing: TypingDebouncer,
}

impl OutboundGateway {
    /// Creates a gateway whose typing indicator idles out after
    /// `typing_idle`.
    #[must_use]
    pub const fn new(typing_idle: Duration) -> Self {
        Self {
            typing: TypingDebouncer::new(typing_idle),
        }
    }

    /// Validates and sends a chat message, closing any typing period.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without touching the network
    /// when the message is rejected locally, or the connection's error if
    /// the message could not be handed to the transport.
    pub fn send_message(
        &mut self,
        conn: &ConnectionManager,
        deal: &Deal,
        content: &str,
    ) -> Result<(), ClientError> {
        validate_message(deal, content)?;
        self.stop_typing(conn);
        conn.emit(&ClientAction::SendMessage {
            deal_id: deal.id.clone(),
            message: content.to_string(),
        })
    }

    /// Validates and sends a price proposal on behalf of `user`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without touching the network
    /// when the price breaks the negotiation rule, or the connection's
    /// error if it could not be handed to the transport.
    pub fn update_price(
        &self,
        conn: &ConnectionManager,
        deal: &Deal,
        user: &User,
        price: f64,
    ) -> Result<(), ClientError> {
        validate_price(deal, deal.acting_role(user), price)?;
        conn.emit(&ClientAction::UpdatePrice {
            deal_id: deal.id.clone(),
            price,
        })
    }

    /// Records a keystroke; emits `typing_start` at the start of a period,
    /// preceded by `typing_stop` when the previous period had expired.
    pub fn keystroke(&mut self, conn: &ConnectionManager, deal_id: &DealId, now: Instant) {
        for action in self.typing.keystroke(deal_id, now) {
            emit_best_effort(conn, &action);
        }
    }

    /// Emits `typing_stop` if the idle period elapsed.
    pub fn poll_typing(&mut self, conn: &ConnectionManager, now: Instant) {
        if let Some(action) = self.typing.poll(now) {
            emit_best_effort(conn, &action);
        }
    }

    /// Emits `typing_stop` now if a typing period is open.
    pub fn stop_typing(&mut self, conn: &ConnectionManager) {
        if let Some(action) = self.typing.stop() {
            emit_best_effort(conn, &action);
        }
    }

    /// Forgets typing state without emitting (room torn down).
    pub fn reset(&mut self) {
        self.typing.reset();
    }

    /// Deadline of the open typing period.
    #[must_use]
    pub fn typing_deadline(&self) -> Option<Instant> {
        self.typing.deadline()
    }
}

/// Typing notifications are ephemeral; failures are only logged.
fn emit_best_effort(conn: &ConnectionManager, action: &ClientAction) {
    if let Err(e) = conn.emit(action) {
        tracing::debug!(error = %e, event = action.event_name(), "typing notification not sent");
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::room::store::tests::{deal, document};

    #[test]
    fn buyer_must_offer_lower() {
        let d = deal("d1", 100.0);
        assert!(validate_price(&d, Role::Buyer, 90.0).is_ok());
        assert!(matches!(
            validate_price(&d, Role::Buyer, 100.0),
            Err(ValidationError::OfferNotLower { .. })
        ));
        assert!(validate_price(&d, Role::Buyer, 120.0).is_err());
    }

    #[test]
    fn seller_must_ask_higher() {
        let d = deal("d1", 100.0);
        assert!(validate_price(&d, Role::Seller, 110.0).is_ok());
        assert!(matches!(
            validate_price(&d, Role::Seller, 100.0),
            Err(ValidationError::AskNotHigher { .. })
        ));
        assert!(validate_price(&d, Role::Seller, 80.0).is_err());
    }

    #[test]
    fn price_must_be_positive_and_finite() {
        let d = deal("d1", 100.0);
        assert!(matches!(
            validate_price(&d, Role::Admin, 0.0),
            Err(ValidationError::InvalidPrice(_))
        ));
        assert!(validate_price(&d, Role::Buyer, f64::NAN).is_err());
        assert!(validate_price(&d, Role::Admin, 250.0).is_ok());
    }

    #[test]
    fn closed_deal_ends_negotiation_and_chat() {
        let mut d = deal("d1", 100.0);
        d.status = DealStatus::Completed;
        assert_eq!(
            validate_price(&d, Role::Buyer, 50.0),
            Err(ValidationError::DealClosed(DealStatus::Completed))
        );
        assert_eq!(
            validate_message(&d, "hello"),
            Err(ValidationError::DealClosed(DealStatus::Completed))
        );
    }

    #[test]
    fn whitespace_message_is_rejected() {
        let d = deal("d1", 100.0);
        assert_eq!(validate_message(&d, "  \n\t"), Err(ValidationError::EmptyMessage));
        assert!(validate_message(&d, " hi ").is_ok());
    }

    #[test]
    fn status_transitions() {
        let d = deal("d1", 100.0);
        assert!(validate_status_change(&d, Role::Seller, DealStatus::InProgress).is_ok());
        assert!(validate_status_change(&d, Role::Buyer, DealStatus::InProgress).is_err());
        assert!(validate_status_change(&d, Role::Buyer, DealStatus::Completed).is_err());
    }

    #[test]
    fn only_uploader_or_admin_deletes_documents() {
        let documents = vec![document("doc1", "d1")];
        let id = DocumentId::new("doc1");
        let account = |id: &str, role: Role| User {
            id: UserId::new(id),
            name: id.to_string(),
            email: String::new(),
            role,
        };

        assert!(validate_document_delete(&documents, &account("seller", Role::Seller), &id).is_ok());
        assert!(validate_document_delete(&documents, &account("root", Role::Admin), &id).is_ok());
        assert_eq!(
            validate_document_delete(&documents, &account("buyer", Role::Buyer), &id),
            Err(ValidationError::DeleteForbidden(id.clone()))
        );
        assert_eq!(
            validate_document_delete(&documents, &account("seller", Role::Seller), &DocumentId::new("gone")),
            Err(ValidationError::UnknownDocument(DocumentId::new("gone")))
        );
    }
}
