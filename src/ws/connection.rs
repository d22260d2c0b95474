//! Connection manager: owns the single live link of a session.
//!
//! The manager is owned by the room service task; it has no interior
//! locking. Its state is published on a [`watch`] channel so presence
//! indicators can follow it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use super::messages::{ClientAction, WireFrame};
use super::reconnect::ReconnectPolicy;
use super::transport::{Connector, TransportEvent};
use crate::domain::{ConnectionState, Session};
use crate::error::ClientError;

/// Holds at most one live connection per authenticated session.
#[derive(Debug)]
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    policy: ReconnectPolicy,
    state: watch::Sender<ConnectionState>,
    outbound: Option<mpsc::UnboundedSender<WireFrame>>,
    attempts: u32,
}

impl ConnectionManager {
    /// Creates a disconnected manager.
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>, policy: ReconnectPolicy) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connector,
            policy,
            state,
            outbound: None,
            attempts: 0,
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Returns `true` when actions can be emitted.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Subscribes to connection state changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Opens the connection with the session's credential, replacing any
    /// existing one. Returns the inbound event stream of the new link.
    ///
    /// # Errors
    ///
    /// Propagates the connector's error; the state is left `Disconnected`.
    pub async fn connect(
        &mut self,
        session: &Session,
    ) -> Result<mpsc::UnboundedReceiver<TransportEvent>, ClientError> {
        self.outbound = None;
        self.state.send_replace(ConnectionState::Connecting);
        match self.connector.open(&session.token).await {
            Ok(link) => {
                self.outbound = Some(link.outbound);
                self.attempts = 0;
                self.state.send_replace(ConnectionState::Connected);
                tracing::info!(user_id = %session.user.id, "connected");
                Ok(link.inbound)
            }
            Err(e) => {
                self.state.send_replace(ConnectionState::Disconnected);
                tracing::warn!(error = %e, "connect failed");
                Err(e)
            }
        }
    }

    /// Tears the connection down. Server-side room memberships end with it.
    pub fn disconnect(&mut self) {
        if self.outbound.take().is_some() {
            tracing::info!("disconnected");
        }
        self.state.send_replace(ConnectionState::Disconnected);
    }

    /// Records that the transport dropped on its own.
    pub fn mark_lost(&mut self) {
        self.outbound = None;
        self.state.send_replace(ConnectionState::Disconnected);
    }

    /// Emits an action onto the live link.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] when there is no live link and
    /// [`ClientError::Codec`] if the action cannot be encoded.
    pub fn emit(&self, action: &ClientAction) -> Result<(), ClientError> {
        let Some(outbound) = self.outbound.as_ref().filter(|_| self.is_connected()) else {
            return Err(ClientError::NotConnected);
        };
        let frame = WireFrame::from_action(action)?;
        tracing::debug!(event = action.event_name(), frame_id = %frame.id, "emit");
        outbound.send(frame).map_err(|_| ClientError::NotConnected)
    }

    /// Delay before the next reconnect attempt, or `None` if the policy
    /// gives up. Each call counts as one attempt.
    pub fn next_reconnect_delay(&mut self) -> Option<Duration> {
        let delay = self.policy.delay(self.attempts)?;
        self.attempts = self.attempts.saturating_add(1);
        Some(delay)
    }
}
