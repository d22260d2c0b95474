//! dealroom command-line client.
//!
//! Usage: `dealroom <deal-id>`. Restores the session from the token file,
//! enters the room and reads commands from stdin:
//!
//! - any text sends a chat message
//! - `/price <amount>` proposes a price
//! - `/status <pending|in-progress|completed|cancelled>` changes the status
//! - `/read-all` marks every notification read
//! - `/logout` clears the stored token and exits
//! - `/quit` leaves the room and exits

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use dealroom_client::app_state::AppState;
use dealroom_client::config::ClientConfig;
use dealroom_client::domain::{ClientEvent, DealId, DealStatus};
use dealroom_client::service::{RoomHandle, RoomView};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let deal_id = std::env::args()
        .nth(1)
        .map(DealId::from)
        .context("usage: dealroom <deal-id>")?;

    // Load configuration
    let config = ClientConfig::from_env()?;
    tracing::info!(api = %config.api_url, ws = %config.ws_url, "starting dealroom");

    let app = AppState::start(&config)
        .await
        .context("could not restore session; log in first")?;
    tracing::info!(user = %app.session.user.name, role = app.session.user.role.as_str(), "signed in");

    tokio::spawn(print_events(app.rooms.clone()));
    tokio::spawn(print_messages(app.rooms.view()));

    app.rooms.connect().await?;
    let guard = app.rooms.enter_room(deal_id).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/logout", _) => {
                drop(guard);
                app.logout().await?;
                return Ok(());
            }
            ("/price", amount) => match amount.trim().parse::<f64>() {
                Ok(price) => report(app.rooms.update_price(price).await),
                Err(_) => println!("! not a number: {amount}"),
            },
            ("/status", status) => match status.trim().parse::<DealStatus>() {
                Ok(status) => report(app.rooms.update_status(status).await),
                Err(e) => println!("! {e}"),
            },
            ("/read-all", _) => report(app.rooms.mark_all_notifications_read().await),
            _ => report(app.rooms.send_message(line).await),
        }
    }

    guard.leave();
    app.rooms.disconnect()?;
    Ok(())
}

fn report(result: Result<(), dealroom_client::error::ClientError>) {
    if let Err(e) = result {
        println!("! {}", e.user_message());
    }
}

async fn print_events(rooms: RoomHandle) {
    let mut events = rooms.events();
    while let Ok(event) = events.recv().await {
        match event {
            ClientEvent::RoomLoaded { deal_id } => println!("* joined {deal_id}"),
            ClientEvent::RoomLoadFailed { message, .. } => println!("! {message}"),
            ClientEvent::RoomLeft { deal_id } => println!("* left {deal_id}"),
            ClientEvent::ConnectionChanged { state } => println!("* connection {state:?}"),
            ClientEvent::NotificationReceived(n) => println!("* {}", n.content),
            ClientEvent::Notice { message, .. } => println!("! {message}"),
        }
    }
}

async fn print_messages(mut view: watch::Receiver<RoomView>) {
    let mut shown = 0;
    let mut price = None;
    let mut typing = None;
    while view.changed().await.is_ok() {
        let current = view.borrow_and_update().clone();
        let Some(room) = current.room else {
            shown = 0;
            price = None;
            continue;
        };
        for message in room.messages.iter().skip(shown) {
            println!("[{}] {}", message.sender.name, message.content);
        }
        shown = room.messages.len();
        if price != Some(room.deal.price) {
            price = Some(room.deal.price);
            println!("* price {:.2} ({})", room.deal.price, room.deal.status.as_str());
        }
        let now_typing = room.typing.map(|t| t.name);
        if now_typing != typing {
            if let Some(name) = &now_typing {
                println!("* {name} is typing");
            }
            typing = now_typing;
        }
    }
}
