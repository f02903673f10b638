//! Network module.
//!
//! Contains the Gateway (listening side), the Link (connecting side), the
//! per-connection worker, and the callback contract they drive.

mod connection;
mod events;
mod gateway;
mod handle;
mod link;

pub use connection::Connection;
pub use events::{CloseReason, ConnectionEvents, ListenerEvents};
pub use gateway::Gateway;
pub use handle::ConnectionHandle;
pub use link::Link;
