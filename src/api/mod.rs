//! REST API layer: the [`DealApi`] seam, its HTTP client, and snapshot
//! loading.
//!
//! All endpoints live under `/api` and take a bearer token.

pub mod client;
pub mod dto;
#[cfg(test)]
pub(crate) mod fake;
pub mod snapshot;

use std::fmt;

use async_trait::async_trait;

use crate::domain::{
    AuthToken, Deal, DealId, DealStatus, Document, DocumentId, Message, Notification,
    NotificationId, PriceHistoryEntry, User,
};
use crate::error::ClientError;

pub use client::ApiClient;
pub use snapshot::load_snapshot;

/// The REST endpoints the client consumes.
///
/// # Errors
///
/// Every method returns [`ClientError::AuthRejected`] for a refused token,
/// [`ClientError::Http`] for other error statuses and
/// [`ClientError::Request`] for transport failures.
#[async_trait]
pub trait DealApi: Send + Sync + fmt::Debug {
    /// `GET /api/auth/me`: validates the token.
    async fn me(&self, token: &AuthToken) -> Result<User, ClientError>;

    /// `GET /api/deals/{id}`.
    async fn deal(&self, token: &AuthToken, deal_id: &DealId) -> Result<Deal, ClientError>;

    /// `GET /api/deals/{id}/messages`.
    async fn messages(
        &self,
        token: &AuthToken,
        deal_id: &DealId,
    ) -> Result<Vec<Message>, ClientError>;

    /// `GET /api/deals/{id}/documents`.
    async fn documents(
        &self,
        token: &AuthToken,
        deal_id: &DealId,
    ) -> Result<Vec<Document>, ClientError>;

    /// `GET /api/deals/{id}/price-history`.
    async fn price_history(
        &self,
        token: &AuthToken,
        deal_id: &DealId,
    ) -> Result<Vec<PriceHistoryEntry>, ClientError>;

    /// `PUT /api/deals/{id}/status`.
    async fn update_status(
        &self,
        token: &AuthToken,
        deal_id: &DealId,
        status: DealStatus,
    ) -> Result<(), ClientError>;

    /// `DELETE /api/deals/{id}/documents/{doc}`.
    async fn delete_document(
        &self,
        token: &AuthToken,
        deal_id: &DealId,
        document_id: &DocumentId,
    ) -> Result<(), ClientError>;

    /// `GET /api/notifications`.
    async fn notifications(&self, token: &AuthToken) -> Result<Vec<Notification>, ClientError>;

    /// `PUT /api/notifications/{id}/read`.
    async fn mark_notification_read(
        &self,
        token: &AuthToken,
        id: &NotificationId,
    ) -> Result<(), ClientError>;

    /// `PUT /api/notifications/read-all`.
    async fn mark_all_notifications_read(&self, token: &AuthToken) -> Result<(), ClientError>;
}
