//! Room service: the actor that owns the session's real-time state.
//!
//! One task owns the connection, the subscription, the store and the
//! gateway. It `select!`s over UI commands, transport events, snapshot
//! completions and timers, so every mutation happens in one place and in
//! receipt order. UIs talk to it through a cloneable [`RoomHandle`] and
//! observe it through a [`watch`] of [`RoomView`] plus the [`EventBus`].

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::{DealApi, load_snapshot};
use crate::config::ClientConfig;
use crate::credentials::TokenStore;
use crate::domain::{
    ClientEvent, ConnectionState, DealId, DealStatus, DocumentId, EventBus, Notification,
    NotificationFeed, NotificationId, ServerEvent, Session,
};
use crate::error::ClientError;
use crate::room::{
    EventRouter, OutboundGateway, RoomSnapshot, RoomState, RoomStore, RoomSubscription,
    validate_document_delete, validate_status_change,
};
use crate::ws::{ClientAction, ConnectionManager, Connector, TransportEvent};

type Reply<T> = oneshot::Sender<Result<T, ClientError>>;

/// What the UI renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomView {
    /// Connection state.
    pub connection: ConnectionState,
    /// Active room, loading or loaded.
    pub deal_id: Option<DealId>,
    /// Reconciled room state once the snapshot is in.
    pub room: Option<RoomState>,
    /// Notification feed.
    pub notifications: NotificationFeed,
}

impl RoomView {
    /// Returns `true` while a room is active but not yet loaded.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.deal_id.is_some() && self.room.is_none()
    }
}

#[derive(Debug)]
enum Command {
    Connect(Reply<()>),
    Disconnect,
    Enter(DealId, Reply<u64>),
    Leave(DealId, Option<u64>),
    SendMessage(String, Reply<()>),
    Keystroke,
    UpdatePrice(f64, Reply<()>),
    UpdateStatus(DealStatus, Reply<()>),
    DeleteDocument(DocumentId, Reply<()>),
    MarkNotificationRead(NotificationId, Reply<()>),
    MarkAllNotificationsRead(Reply<()>),
    Shutdown(oneshot::Sender<()>),
}

#[derive(Debug)]
enum Internal {
    SnapshotLoaded {
        deal_id: DealId,
        epoch: u64,
        result: Result<RoomSnapshot, ClientError>,
    },
    NotificationsLoaded(Vec<Notification>),
    NotificationRead(NotificationId),
    AllNotificationsRead,
}

/// The room session manager task.
#[derive(Debug)]
pub struct RoomService {
    session: Session,
    api: Arc<dyn DealApi>,
    bus: EventBus,
    conn: ConnectionManager,
    inbound: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    subscription: RoomSubscription,
    store: RoomStore,
    router: EventRouter,
    gateway: OutboundGateway,
    feed: NotificationFeed,
    commands: mpsc::UnboundedReceiver<Command>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    reconnect_at: Option<Instant>,
    resync_on_connect: bool,
    visit: u64,
    view: watch::Sender<RoomView>,
}

impl RoomService {
    /// Spawns the service task for `session` and returns its handle.
    ///
    /// The service starts disconnected; call [`RoomHandle::connect`].
    #[must_use]
    pub fn spawn(
        session: Session,
        connector: Arc<dyn Connector>,
        api: Arc<dyn DealApi>,
        config: &ClientConfig,
    ) -> (RoomHandle, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(RoomView::default());
        let bus = EventBus::new(config.event_bus_capacity);
        let conn = ConnectionManager::new(connector, config.reconnect);

        let handle = RoomHandle {
            commands: cmd_tx,
            view: view_rx,
            connection: conn.watch(),
            bus: bus.clone(),
        };

        let service = Self {
            router: EventRouter::new(session.user.id.clone()),
            session,
            api,
            bus,
            conn,
            inbound: None,
            subscription: RoomSubscription::new(),
            store: RoomStore::new(),
            gateway: OutboundGateway::new(config.typing_idle),
            feed: NotificationFeed::default(),
            commands: cmd_rx,
            internal_tx,
            internal_rx,
            reconnect_at: None,
            resync_on_connect: false,
            visit: 0,
            view: view_tx,
        };

        let task = tokio::spawn(service.run());
        (handle, task)
    }

    async fn run(mut self) {
        loop {
            let typing_deadline = self.gateway.typing_deadline();
            let reconnect_at = self.reconnect_at;

            tokio::select! {
                // Command from a handle
                cmd = self.commands.recv() => {
                    let Some(cmd) = cmd else {
                        self.teardown();
                        break;
                    };
                    if self.handle_command(cmd).await.is_break() {
                        break;
                    }
                }
                // Result of a spawned fetch
                Some(msg) = self.internal_rx.recv() => self.handle_internal(msg),
                // Frame or lifecycle event from the transport
                event = recv_inbound(&mut self.inbound) => self.handle_transport(event),
                () = sleep_until_opt(typing_deadline) => {
                    self.gateway.poll_typing(&self.conn, Instant::now());
                }
                () = sleep_until_opt(reconnect_at) => self.reconnect().await,
            }

            self.publish_view();
        }

        self.publish_view();
        tracing::debug!(user_id = %self.session.user.id, "room service stopped");
    }

    async fn handle_command(&mut self, cmd: Command) -> ControlFlow<()> {
        match cmd {
            Command::Connect(reply) => {
                let result = self.connect().await;
                let _ = reply.send(result);
            }
            Command::Disconnect => self.disconnect(),
            Command::Enter(deal_id, reply) => {
                self.visit = self.visit.wrapping_add(1);
                self.enter(deal_id);
                let _ = reply.send(Ok(self.visit));
            }
            // A guard only releases the visit that created it.
            Command::Leave(deal_id, visit) => {
                if visit.is_none_or(|v| v == self.visit) {
                    self.leave(&deal_id);
                }
            }
            Command::SendMessage(content, reply) => {
                let result = self.send_message(&content);
                let _ = reply.send(result);
            }
            Command::Keystroke => {
                if let Some(deal_id) = self.subscription.active() {
                    self.gateway.keystroke(&self.conn, deal_id, Instant::now());
                }
            }
            Command::UpdatePrice(price, reply) => {
                let result = self.update_price(price);
                let _ = reply.send(result);
            }
            Command::UpdateStatus(status, reply) => self.update_status(status, reply),
            Command::DeleteDocument(document_id, reply) => {
                self.delete_document(document_id, reply);
            }
            Command::MarkNotificationRead(id, reply) => self.mark_notification_read(id, reply),
            Command::MarkAllNotificationsRead(reply) => self.mark_all_notifications_read(reply),
            Command::Shutdown(done) => {
                self.teardown();
                let _ = done.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn handle_internal(&mut self, msg: Internal) {
        match msg {
            Internal::SnapshotLoaded {
                deal_id,
                epoch,
                result,
            } => self.install_snapshot(deal_id, epoch, result),
            Internal::NotificationsLoaded(items) => self.feed.load(items),
            Internal::NotificationRead(id) => self.feed.mark_read(&id),
            Internal::AllNotificationsRead => self.feed.mark_all_read(),
        }
    }

    fn handle_transport(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Frame(frame) => match frame.to_server_event() {
                Ok(event) => self.route(&event),
                Err(e) => {
                    tracing::warn!(error = %e, event = %frame.event, "ignoring undecodable event");
                }
            },
            TransportEvent::Error(e) => {
                tracing::warn!(error = %e, "transport error");
                self.bus.publish(ClientEvent::warning(format!("Connection error: {e}")));
            }
            TransportEvent::Closed => self.connection_lost(),
        }
    }

    fn route(&mut self, event: &ServerEvent) {
        let (routed, follow_up) = self.router.route(
            event,
            &mut self.subscription,
            &mut self.store,
            &mut self.feed,
        );
        tracing::trace!(event = event.event_name(), ?routed, "routed");
        if let ServerEvent::NotificationReceived(n) = event {
            self.bus.publish(ClientEvent::NotificationReceived(n.clone()));
        }
        if let Some(action) = follow_up
            && let Err(e) = self.conn.emit(&action)
        {
            tracing::debug!(error = %e, "read receipt not sent");
        }
    }

    async fn connect(&mut self) -> Result<(), ClientError> {
        self.reconnect_at = None;
        let inbound = self.conn.connect(&self.session).await;
        self.publish_connection();
        match inbound {
            Ok(rx) => {
                self.inbound = Some(rx);
                self.on_connected();
                Ok(())
            }
            Err(e) => {
                self.bus.publish(ClientEvent::error(e.user_message()));
                Err(e)
            }
        }
    }

    async fn reconnect(&mut self) {
        tracing::info!("attempting reconnect");
        if self.connect().await.is_err() {
            match self.conn.next_reconnect_delay() {
                Some(delay) => self.reconnect_at = Some(Instant::now() + delay),
                None => {
                    self.bus.publish(ClientEvent::error("Could not reconnect"));
                }
            }
        }
    }

    fn on_connected(&mut self) {
        self.spawn_notifications();
        let Some(deal_id) = self.subscription.active().cloned() else {
            return;
        };
        if std::mem::take(&mut self.resync_on_connect) {
            // Events pushed while the link was down are lost; start over.
            tracing::info!(%deal_id, "resyncing room after reconnect");
            self.enter(deal_id);
        } else {
            self.emit_logged(&ClientAction::JoinDeal { deal_id });
        }
    }

    fn connection_lost(&mut self) {
        self.inbound = None;
        self.conn.mark_lost();
        self.gateway.reset();
        self.resync_on_connect = self.subscription.active().is_some();
        self.publish_connection();
        self.bus.publish(ClientEvent::warning(
            ClientError::NotConnected.user_message(),
        ));
        if let Some(delay) = self.conn.next_reconnect_delay() {
            tracing::info!(?delay, "reconnect scheduled");
            self.reconnect_at = Some(Instant::now() + delay);
        }
    }

    fn disconnect(&mut self) {
        if let Some(deal_id) = self.subscription.active().cloned() {
            self.leave(&deal_id);
        }
        self.inbound = None;
        self.reconnect_at = None;
        self.resync_on_connect = false;
        self.conn.disconnect();
        self.publish_connection();
    }

    fn teardown(&mut self) {
        self.disconnect();
        self.feed = NotificationFeed::default();
    }

    fn enter(&mut self, deal_id: DealId) {
        self.gateway.stop_typing(&self.conn);
        let ticket = self.subscription.join(deal_id.clone());
        if let Some(old) = ticket.left.filter(|old| *old != deal_id) {
            self.emit_logged(&ClientAction::LeaveDeal {
                deal_id: old.clone(),
            });
            self.bus.publish(ClientEvent::RoomLeft { deal_id: old });
        }
        self.store.open(deal_id.clone());
        if self.conn.is_connected() {
            self.emit_logged(&ClientAction::JoinDeal {
                deal_id: deal_id.clone(),
            });
        }
        tracing::info!(%deal_id, epoch = ticket.epoch, "entering room");
        self.spawn_snapshot(deal_id, ticket.epoch);
    }

    fn leave(&mut self, deal_id: &DealId) {
        if !self.subscription.matches(deal_id) {
            return;
        }
        self.gateway.stop_typing(&self.conn);
        self.subscription.leave(deal_id);
        self.store.clear();
        self.emit_logged(&ClientAction::LeaveDeal {
            deal_id: deal_id.clone(),
        });
        self.bus.publish(ClientEvent::RoomLeft {
            deal_id: deal_id.clone(),
        });
        tracing::info!(%deal_id, "left room");
    }

    fn spawn_snapshot(&self, deal_id: DealId, epoch: u64) {
        let api = Arc::clone(&self.api);
        let token = self.session.token.clone();
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = load_snapshot(api.as_ref(), &token, &deal_id).await;
            let _ = tx.send(Internal::SnapshotLoaded {
                deal_id,
                epoch,
                result,
            });
        });
    }

    fn install_snapshot(
        &mut self,
        deal_id: DealId,
        epoch: u64,
        result: Result<RoomSnapshot, ClientError>,
    ) {
        if !self.subscription.is_current(&deal_id, epoch) {
            tracing::debug!(%deal_id, epoch, "discarding stale snapshot");
            return;
        }
        match result {
            Ok(snapshot) => {
                let replayed = self.store.install(&deal_id, snapshot).unwrap_or_default();
                self.subscription.adopt(&deal_id);
                tracing::info!(%deal_id, replayed, "room loaded");
                self.bus.publish(ClientEvent::RoomLoaded { deal_id });
            }
            Err(e) => {
                tracing::warn!(%deal_id, error = %e, "room load failed");
                self.leave(&deal_id);
                self.bus.publish(ClientEvent::RoomLoadFailed {
                    deal_id,
                    message: e.user_message(),
                });
            }
        }
    }

    fn loaded_room(&self) -> Result<&RoomState, ClientError> {
        let deal_id = self.subscription.active().ok_or(ClientError::NoActiveRoom)?;
        self.store
            .state()
            .ok_or_else(|| ClientError::RoomNotLoaded(deal_id.clone()))
    }

    fn send_message(&mut self, content: &str) -> Result<(), ClientError> {
        let deal = self.loaded_room()?.deal.clone();
        let result = self.gateway.send_message(&self.conn, &deal, content);
        self.report_undelivered(&result);
        result
    }

    fn update_price(&self, price: f64) -> Result<(), ClientError> {
        let deal = &self.loaded_room()?.deal;
        let result = self
            .gateway
            .update_price(&self.conn, deal, &self.session.user, price);
        self.report_undelivered(&result);
        result
    }

    fn update_status(&self, status: DealStatus, reply: Reply<()>) {
        let deal = match self.loaded_room() {
            Ok(room) => room.deal.clone(),
            Err(e) => {
                let _ = reply.send(Err(e));
                return;
            }
        };
        if let Err(e) = validate_status_change(&deal, deal.acting_role(&self.session.user), status)
        {
            let _ = reply.send(Err(e.into()));
            return;
        }
        let api = Arc::clone(&self.api);
        let token = self.session.token.clone();
        let bus = self.bus.clone();
        tokio::spawn(async move {
            let result = api.update_status(&token, &deal.id, status).await;
            if let Err(e) = &result {
                tracing::warn!(deal_id = %deal.id, error = %e, "status update failed");
                bus.publish(ClientEvent::error(e.user_message()));
            }
            let _ = reply.send(result);
        });
    }

    fn delete_document(&self, document_id: DocumentId, reply: Reply<()>) {
        let deal_id = match self.loaded_room().and_then(|room| {
            validate_document_delete(&room.documents, &self.session.user, &document_id)?;
            Ok(room.deal.id.clone())
        }) {
            Ok(deal_id) => deal_id,
            Err(e) => {
                let _ = reply.send(Err(e));
                return;
            }
        };
        let api = Arc::clone(&self.api);
        let token = self.session.token.clone();
        let bus = self.bus.clone();
        tokio::spawn(async move {
            let result = api.delete_document(&token, &deal_id, &document_id).await;
            if let Err(e) = &result {
                tracing::warn!(%deal_id, %document_id, error = %e, "document delete failed");
                bus.publish(ClientEvent::error(e.user_message()));
            }
            let _ = reply.send(result);
        });
    }

    fn spawn_notifications(&self) {
        let api = Arc::clone(&self.api);
        let token = self.session.token.clone();
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            match api.notifications(&token).await {
                Ok(items) => {
                    let _ = tx.send(Internal::NotificationsLoaded(items));
                }
                Err(e) => tracing::warn!(error = %e, "fetching notifications failed"),
            }
        });
    }

    fn mark_notification_read(&self, id: NotificationId, reply: Reply<()>) {
        let api = Arc::clone(&self.api);
        let token = self.session.token.clone();
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = api.mark_notification_read(&token, &id).await;
            if result.is_ok() {
                let _ = tx.send(Internal::NotificationRead(id));
            }
            let _ = reply.send(result);
        });
    }

    fn mark_all_notifications_read(&self, reply: Reply<()>) {
        let api = Arc::clone(&self.api);
        let token = self.session.token.clone();
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = api.mark_all_notifications_read(&token).await;
            if result.is_ok() {
                let _ = tx.send(Internal::AllNotificationsRead);
            }
            let _ = reply.send(result);
        });
    }

    fn emit_logged(&self, action: &ClientAction) {
        if let Err(e) = self.conn.emit(action) {
            tracing::debug!(error = %e, event = action.event_name(), "action not sent");
        }
    }

    fn report_undelivered(&self, result: &Result<(), ClientError>) {
        if let Err(e) = result
            && e.is_transient()
        {
            tracing::warn!(error = %e, "action not delivered");
            self.bus.publish(ClientEvent::warning("Not delivered: connection is down"));
        }
    }

    fn publish_connection(&self) {
        self.bus.publish(ClientEvent::ConnectionChanged {
            state: self.conn.state(),
        });
    }

    fn publish_view(&self) {
        let next = RoomView {
            connection: self.conn.state(),
            deal_id: self.subscription.active().cloned(),
            room: self.store.state().cloned(),
            notifications: self.feed.clone(),
        };
        self.view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

async fn recv_inbound(inbound: &mut Option<mpsc::UnboundedReceiver<TransportEvent>>) -> TransportEvent {
    match inbound {
        Some(rx) => rx.recv().await.unwrap_or(TransportEvent::Closed),
        None => std::future::pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Cloneable handle to a running [`RoomService`].
#[derive(Debug, Clone)]
pub struct RoomHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<RoomView>,
    connection: watch::Receiver<ConnectionState>,
    bus: EventBus,
}

impl RoomHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .map_err(|_| ClientError::SessionClosed)?;
        rx.await.map_err(|_| ClientError::SessionClosed)?
    }

    /// Opens the real-time connection.
    ///
    /// # Errors
    ///
    /// Returns the connector's error ([`ClientError::AuthRejected`],
    /// [`ClientError::Transport`]) or [`ClientError::SessionClosed`].
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.request(Command::Connect).await
    }

    /// Closes the connection and leaves the active room.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionClosed`] if the service has stopped.
    pub fn disconnect(&self) -> Result<(), ClientError> {
        self.commands
            .send(Command::Disconnect)
            .map_err(|_| ClientError::SessionClosed)
    }

    /// Enters a deal room, leaving any other one. The snapshot loads in the
    /// background; watch [`RoomHandle::view`] or the event bus for
    /// [`ClientEvent::RoomLoaded`] / [`ClientEvent::RoomLoadFailed`].
    ///
    /// Dropping the returned guard leaves the room.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionClosed`] if the service has stopped.
    pub async fn enter_room(&self, deal_id: DealId) -> Result<RoomGuard, ClientError> {
        let id = deal_id.clone();
        let visit = self.request(|reply| Command::Enter(id, reply)).await?;
        Ok(RoomGuard {
            deal_id,
            visit,
            commands: self.commands.clone(),
            released: false,
        })
    }

    /// Leaves `deal_id` if it is the active room. Safe to repeat.
    pub fn leave_room(&self, deal_id: &DealId) {
        let _ = self.commands.send(Command::Leave(deal_id.clone(), None));
    }

    /// Sends a chat message to the active room.
    ///
    /// The message appears in the room only once the server echoes it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for empty content or a closed
    /// deal, [`ClientError::NoActiveRoom`] / [`ClientError::RoomNotLoaded`]
    /// without a loaded room, and [`ClientError::NotConnected`] when the
    /// connection is down.
    pub async fn send_message(&self, content: impl Into<String>) -> Result<(), ClientError> {
        let content = content.into();
        self.request(|reply| Command::SendMessage(content, reply))
            .await
    }

    /// Records a keystroke in the message input.
    pub fn keystroke(&self) {
        let _ = self.commands.send(Command::Keystroke);
    }

    /// Proposes a new price in the active room.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the price breaks the
    /// negotiation rule, plus the room and connection errors of
    /// [`RoomHandle::send_message`].
    pub async fn update_price(&self, price: f64) -> Result<(), ClientError> {
        self.request(|reply| Command::UpdatePrice(price, reply))
            .await
    }

    /// Requests a deal status change through the REST API. The room
    /// reflects it when `deal_status_updated` arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for disallowed transitions or
    /// the API's error.
    pub async fn update_status(&self, status: DealStatus) -> Result<(), ClientError> {
        self.request(|reply| Command::UpdateStatus(status, reply))
            .await
    }

    /// Deletes a document of the active room through the REST API. Only
    /// the uploader or an admin may delete; anyone else is rejected locally.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for unknown documents or a user
    /// without permission, the API's error, or a room error when no room
    /// is loaded.
    pub async fn delete_document(&self, document_id: DocumentId) -> Result<(), ClientError> {
        self.request(|reply| Command::DeleteDocument(document_id, reply))
            .await
    }

    /// Marks one notification read.
    ///
    /// # Errors
    ///
    /// Returns the API's error; the local feed is unchanged then.
    pub async fn mark_notification_read(&self, id: NotificationId) -> Result<(), ClientError> {
        self.request(|reply| Command::MarkNotificationRead(id, reply))
            .await
    }

    /// Marks all notifications read.
    ///
    /// # Errors
    ///
    /// Returns the API's error; the local feed is unchanged then.
    pub async fn mark_all_notifications_read(&self) -> Result<(), ClientError> {
        self.request(Command::MarkAllNotificationsRead).await
    }

    /// Ends the session: disconnects, drops all room state, stops the
    /// service and clears the stored credential.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the credential cannot be removed.
    pub async fn logout(&self, tokens: &dyn TokenStore) -> Result<(), ClientError> {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(Command::Shutdown(tx)).is_ok() {
            let _ = rx.await;
        }
        tokens.clear().await
    }

    /// Watches the rendered view.
    #[must_use]
    pub fn view(&self) -> watch::Receiver<RoomView> {
        self.view.clone()
    }

    /// Watches the connection state.
    #[must_use]
    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.clone()
    }

    /// Subscribes to lifecycle events and notices.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<ClientEvent> {
        self.bus.subscribe()
    }
}

/// Scoped room membership. Leaves its room exactly once: on
/// [`RoomGuard::leave`] or on drop. A guard from an earlier visit to the
/// same room does not end a later one.
#[derive(Debug)]
pub struct RoomGuard {
    deal_id: DealId,
    visit: u64,
    commands: mpsc::UnboundedSender<Command>,
    released: bool,
}

impl RoomGuard {
    /// Room this guard holds.
    #[must_use]
    pub fn deal_id(&self) -> &DealId {
        &self.deal_id
    }

    /// Leaves the room now.
    pub fn leave(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !std::mem::replace(&mut self.released, true) {
            let _ = self
                .commands
                .send(Command::Leave(self.deal_id.clone(), Some(self.visit)));
        }
    }
}

impl Drop for RoomGuard {
    fn drop(&mut self) {
        self.release();
    }
}
