//! Persisted credential and session restore.
//!
//! The client keeps one opaque token on disk. It is attached to every REST
//! call and to the real-time handshake, and removed on logout or when the
//! server rejects it.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::api::DealApi;
use crate::domain::{AuthToken, Session};
use crate::error::ClientError;

/// Storage for the single auth token.
///
/// # Errors
///
/// Implementations return [`ClientError::Storage`] on I/O failures.
#[async_trait]
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Loads the stored token, if any.
    async fn load(&self) -> Result<Option<AuthToken>, ClientError>;

    /// Replaces the stored token.
    async fn save(&self, token: &AuthToken) -> Result<(), ClientError>;

    /// Removes the stored token. Succeeds when nothing is stored.
    async fn clear(&self) -> Result<(), ClientError>;
}

/// Token kept in a plain file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<AuthToken>, ClientError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let raw = raw.trim();
                Ok((!raw.is_empty()).then(|| AuthToken::new(raw)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &AuthToken) -> Result<(), ClientError> {
        tokio::fs::write(&self.path, token.expose()).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Restores the session from the stored token.
///
/// The token is validated with `GET /api/auth/me`; a rejected token is
/// cleared from the store.
///
/// # Errors
///
/// Returns [`ClientError::MissingCredential`] when no token is stored,
/// [`ClientError::AuthRejected`] when the server refuses it, or any other
/// API / storage error.
pub async fn restore_session(
    api: &dyn DealApi,
    store: &dyn TokenStore,
) -> Result<Session, ClientError> {
    let token = store.load().await?.ok_or(ClientError::MissingCredential)?;
    match api.me(&token).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, role = user.role.as_str(), "session restored");
            Ok(Session::new(user, token))
        }
        Err(ClientError::AuthRejected) => {
            tracing::warn!("stored token rejected; clearing it");
            store.clear().await?;
            Err(ClientError::AuthRejected)
        }
        Err(e) => Err(e),
    }
}
