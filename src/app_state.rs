//! Wiring of a running client: REST client, credential store and the
//! room service for the restored session.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::api::{ApiClient, DealApi};
use crate::config::ClientConfig;
use crate::credentials::{FileTokenStore, restore_session};
use crate::domain::Session;
use crate::error::ClientError;
use crate::service::{RoomHandle, RoomService};
use crate::ws::WsConnector;

/// Everything a front end needs once the session is restored.
#[derive(Debug)]
pub struct AppState {
    /// REST client, also used for document download links.
    pub api: Arc<ApiClient>,
    /// Persisted credential.
    pub tokens: FileTokenStore,
    /// The authenticated session.
    pub session: Session,
    /// Handle to the room service.
    pub rooms: RoomHandle,
    /// The room service task.
    pub task: JoinHandle<()>,
}

impl AppState {
    /// Restores the session from the token file and starts the room
    /// service. The service is not connected yet.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingCredential`] without a stored token,
    /// [`ClientError::AuthRejected`] when it is refused, or the REST
    /// client's construction error.
    pub async fn start(config: &ClientConfig) -> Result<Self, ClientError> {
        let api = Arc::new(ApiClient::new(config.api_url.clone(), config.http_timeout)?);
        let tokens = FileTokenStore::new(config.token_file.clone());
        let session = restore_session(api.as_ref(), &tokens).await?;

        let connector = Arc::new(WsConnector::new(config.ws_url.clone()));
        let (rooms, task) = RoomService::spawn(
            session.clone(),
            connector,
            Arc::clone(&api) as Arc<dyn DealApi>,
            config,
        );

        Ok(Self {
            api,
            tokens,
            session,
            rooms,
            task,
        })
    }

    /// Logs out and waits for the room service to stop.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the token file cannot be removed.
    pub async fn logout(self) -> Result<(), ClientError> {
        self.rooms.logout(&self.tokens).await?;
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "room service task failed");
        }
        Ok(())
    }
}
