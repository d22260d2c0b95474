//! In-memory [`DealApi`] for tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::DealApi;
use crate::domain::{
    AuthToken, Deal, DealId, DealStatus, Document, DocumentId, Message, Notification,
    NotificationId, PriceHistoryEntry, User,
};
use crate::error::ClientError;
use crate::room::RoomSnapshot;

#[derive(Debug, Default)]
pub(crate) struct FakeApi {
    user: Option<User>,
    rooms: HashMap<DealId, RoomSnapshot>,
    delays: HashMap<DealId, Duration>,
    failing_documents: HashSet<DealId>,
    notifications: Vec<Notification>,
    pub(crate) status_updates: Mutex<Vec<(DealId, DealStatus)>>,
    pub(crate) read_notifications: Mutex<Vec<NotificationId>>,
    pub(crate) deleted_documents: Mutex<Vec<DocumentId>>,
}

impl FakeApi {
    pub(crate) fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub(crate) fn with_room(mut self, snapshot: RoomSnapshot) -> Self {
        self.rooms.insert(snapshot.deal.id.clone(), snapshot);
        self
    }

    pub(crate) fn with_delay(mut self, deal_id: &str, delay: Duration) -> Self {
        self.delays.insert(DealId::new(deal_id), delay);
        self
    }

    pub(crate) fn failing_documents(mut self, deal_id: &str) -> Self {
        self.failing_documents.insert(DealId::new(deal_id));
        self
    }

    pub(crate) fn with_notification(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }

    fn room(&self, deal_id: &DealId) -> Result<&RoomSnapshot, ClientError> {
        self.rooms.get(deal_id).ok_or_else(|| ClientError::Http {
            status: 404,
            message: "Deal not found".to_string(),
        })
    }
}

#[async_trait]
impl DealApi for FakeApi {
    async fn me(&self, _token: &AuthToken) -> Result<User, ClientError> {
        self.user.clone().ok_or(ClientError::AuthRejected)
    }

    async fn deal(&self, _token: &AuthToken, deal_id: &DealId) -> Result<Deal, ClientError> {
        if let Some(delay) = self.delays.get(deal_id) {
            tokio::time::sleep(*delay).await;
        }
        Ok(self.room(deal_id)?.deal.clone())
    }

    async fn messages(
        &self,
        _token: &AuthToken,
        deal_id: &DealId,
    ) -> Result<Vec<Message>, ClientError> {
        Ok(self.room(deal_id)?.messages.clone())
    }

    async fn documents(
        &self,
        _token: &AuthToken,
        deal_id: &DealId,
    ) -> Result<Vec<Document>, ClientError> {
        if self.failing_documents.contains(deal_id) {
            return Err(ClientError::Http {
                status: 500,
                message: "Server error".to_string(),
            });
        }
        Ok(self.room(deal_id)?.documents.clone())
    }

    async fn price_history(
        &self,
        _token: &AuthToken,
        deal_id: &DealId,
    ) -> Result<Vec<PriceHistoryEntry>, ClientError> {
        Ok(self.room(deal_id)?.price_history.clone())
    }

    async fn update_status(
        &self,
        _token: &AuthToken,
        deal_id: &DealId,
        status: DealStatus,
    ) -> Result<(), ClientError> {
        self.status_updates.lock().await.push((deal_id.clone(), status));
        Ok(())
    }

    async fn delete_document(
        &self,
        _token: &AuthToken,
        deal_id: &DealId,
        document_id: &DocumentId,
    ) -> Result<(), ClientError> {
        self.room(deal_id)?;
        self.deleted_documents.lock().await.push(document_id.clone());
        Ok(())
    }

    async fn notifications(&self, _token: &AuthToken) -> Result<Vec<Notification>, ClientError> {
        Ok(self.notifications.clone())
    }

    async fn mark_notification_read(
        &self,
        _token: &AuthToken,
        id: &NotificationId,
    ) -> Result<(), ClientError> {
        self.read_notifications.lock().await.push(id.clone());
        Ok(())
    }

    async fn mark_all_notifications_read(&self, _token: &AuthToken) -> Result<(), ClientError> {
        Ok(())
    }
}
