//! WebSocket layer: wire envelope, transports, and the connection manager.
//!
//! The client keeps exactly one duplex connection per session. Frames are
//! JSON text messages shaped as [`messages::WireFrame`].

pub mod connection;
pub mod memory;
pub mod messages;
pub mod reconnect;
pub mod transport;

pub use connection::ConnectionManager;
pub use memory::{MemoryConnector, MemoryServer, ServerLink};
pub use messages::{ClientAction, WireFrame};
pub use reconnect::ReconnectPolicy;
pub use transport::{Connector, Link, TransportEvent, WsConnector};
