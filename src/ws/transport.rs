//! Transport seam for the real-time channel.
//!
//! A [`Connector`] opens a [`Link`]: a pair of channels carrying
//! [`WireFrame`]s out and [`TransportEvent`]s in. [`WsConnector`] speaks
//! JSON text frames over `tokio-tungstenite`; the in-memory connector in
//! [`super::memory`] serves tests and embedders.

use std::fmt;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;

use super::messages::WireFrame;
use crate::domain::AuthToken;
use crate::error::ClientError;

/// Something that happened on an open link.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A frame arrived from the server.
    Frame(WireFrame),
    /// A transport error occurred; a `Closed` follows.
    Error(String),
    /// The link is gone.
    Closed,
}

/// Channel pair of one live connection.
///
/// Dropping `outbound` asks the transport to close the connection.
#[derive(Debug)]
pub struct Link {
    /// Frames to send to the server.
    pub outbound: mpsc::UnboundedSender<WireFrame>,
    /// Frames and lifecycle events from the server, in receipt order.
    pub inbound: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Opens authenticated links to the real-time endpoint.
#[async_trait]
pub trait Connector: Send + Sync + fmt::Debug {
    /// Opens a link carrying `token` as the handshake credential.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRejected`] when the server refuses the
    /// credential and [`ClientError::Transport`] for any other failure.
    async fn open(&self, token: &AuthToken) -> Result<Link, ClientError>;
}

/// WebSocket connector sending `Authorization: Bearer <token>` on the
/// upgrade request.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    /// Creates a connector for the given `ws://` / `wss://` URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn open(&self, token: &AuthToken) -> Result<Link, ClientError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| ClientError::Transport(format!("invalid ws request: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|_| ClientError::AuthRejected)?;
        request.headers_mut().insert("Authorization", bearer);

        let stream = match tokio_tungstenite::connect_async(request).await {
            Ok((stream, _)) => stream,
            Err(tokio_tungstenite::tungstenite::Error::Http(response))
                if matches!(response.status().as_u16(), 401 | 403) =>
            {
                return Err(ClientError::AuthRejected);
            }
            Err(e) => return Err(ClientError::Transport(format!("connection failed: {e}"))),
        };

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<WireFrame>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (mut ws_tx, mut ws_rx) = stream.split();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    // Outgoing frame from the client
                    frame = out_rx.recv() => {
                        let Some(frame) = frame else {
                            let _ = ws_tx.send(Message::Close(None)).await;
                            break;
                        };
                        let json = match serde_json::to_string(&frame) {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::warn!(error = %e, event = %frame.event, "dropping unencodable frame");
                                continue;
                            }
                        };
                        if let Err(e) = ws_tx.send(Message::text(json)).await {
                            let _ = in_tx.send(TransportEvent::Error(e.to_string()));
                            break;
                        }
                    }
                    // Incoming message from the server
                    msg = ws_rx.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                match serde_json::from_str::<WireFrame>(text.as_str()) {
                                    Ok(frame) => {
                                        if in_tx.send(TransportEvent::Frame(frame)).is_err() {
                                            break;
                                        }
                                    }
                                    Err(e) => tracing::warn!(error = %e, "dropping malformed frame"),
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                let _ = in_tx.send(TransportEvent::Error(e.to_string()));
                                break;
                            }
                        }
                    }
                }
            }
            let _ = in_tx.send(TransportEvent::Closed);
            tracing::debug!("ws link closed");
        });

        Ok(Link {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}
