//! In-process loopback transport.
//!
//! [`MemoryConnector`] hands every opened link to a paired
//! [`MemoryServer`], which can push server events and read the actions the
//! client emitted. Integration tests drive the whole room flow through it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use super::messages::{ClientAction, WireFrame};
use super::transport::{Connector, Link, TransportEvent};
use crate::domain::{AuthToken, ServerEvent};
use crate::error::ClientError;

/// Client half of the loopback.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    accepted: mpsc::UnboundedSender<ServerLink>,
    reject: Arc<AtomicBool>,
}

/// Server half of the loopback; yields one [`ServerLink`] per connect.
#[derive(Debug)]
pub struct MemoryServer {
    accepted: Mutex<mpsc::UnboundedReceiver<ServerLink>>,
    reject: Arc<AtomicBool>,
}

/// Server view of a single client link.
#[derive(Debug)]
pub struct ServerLink {
    /// Token the client presented.
    pub token: AuthToken,
    to_client: mpsc::UnboundedSender<TransportEvent>,
    from_client: mpsc::UnboundedReceiver<WireFrame>,
}

impl MemoryConnector {
    /// Creates a connected connector/server pair.
    #[must_use]
    pub fn pair() -> (Self, MemoryServer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let reject = Arc::new(AtomicBool::new(false));
        (
            Self {
                accepted: tx,
                reject: Arc::clone(&reject),
            },
            MemoryServer {
                accepted: Mutex::new(rx),
                reject,
            },
        )
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(&self, token: &AuthToken) -> Result<Link, ClientError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(ClientError::AuthRejected);
        }
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        self.accepted
            .send(ServerLink {
                token: token.clone(),
                to_client: in_tx,
                from_client: out_rx,
            })
            .map_err(|_| ClientError::Transport("memory server dropped".to_string()))?;
        Ok(Link {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}

impl MemoryServer {
    /// Makes subsequent connects fail with [`ClientError::AuthRejected`].
    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    /// Waits for the next client connect.
    pub async fn accept(&self) -> Option<ServerLink> {
        self.accepted.lock().await.recv().await
    }
}

impl ServerLink {
    /// Pushes a server event to the client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Codec`] if the event cannot be encoded and
    /// [`ClientError::Transport`] if the client side is gone.
    pub fn push(&self, event: &ServerEvent) -> Result<(), ClientError> {
        let frame = WireFrame::from_event(event)?;
        self.push_frame(frame)
    }

    /// Pushes a raw frame to the client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the client side is gone.
    pub fn push_frame(&self, frame: WireFrame) -> Result<(), ClientError> {
        self.to_client
            .send(TransportEvent::Frame(frame))
            .map_err(|_| ClientError::Transport("client dropped".to_string()))
    }

    /// Simulates a transport drop.
    pub fn close(&self) {
        let _ = self.to_client.send(TransportEvent::Error("connection reset".to_string()));
        let _ = self.to_client.send(TransportEvent::Closed);
    }

    /// Waits for the next action the client emitted. Returns `None` once
    /// the client closed the link.
    pub async fn next_action(&mut self) -> Option<ClientAction> {
        loop {
            let frame = self.from_client.recv().await?;
            match frame.to_client_action() {
                Ok(action) => return Some(action),
                Err(e) => tracing::warn!(error = %e, event = %frame.event, "undecodable client frame"),
            }
        }
    }

    /// Returns an already emitted action without waiting.
    pub fn try_next_action(&mut self) -> Option<ClientAction> {
        let frame = self.from_client.try_recv().ok()?;
        frame.to_client_action().ok()
    }
}
