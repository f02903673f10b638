//! Callback contract between the transport and the relay core.
//!
//! The transport owns sockets and tasks; the core only sees these callbacks
//! plus the [`ConnectionHandle`] capability. Callbacks are synchronous and
//! must not block: they run on the connection's worker task.

use crate::network::ConnectionHandle;
use std::net::SocketAddr;

/// Why a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Closed from this side (`close()`, a forced close, or shutdown).
    Local,
    /// The peer hung up.
    Remote,
    /// Read or write failure, including an over-long or malformed line.
    Error(String),
}

impl CloseReason {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

/// Per-connection lifecycle callbacks.
///
/// For every connection `on_connected` fires once before any `on_message`,
/// and `on_disconnected` fires exactly once, last.
pub trait ConnectionEvents: Send + Sync + 'static {
    fn on_connected(&self, handle: &ConnectionHandle);

    fn on_message(&self, handle: &ConnectionHandle, line: String);

    fn on_disconnected(&self, handle: &ConnectionHandle, reason: CloseReason);
}

/// Listener lifecycle callbacks, used by the accepting side.
pub trait ListenerEvents: ConnectionEvents {
    fn on_listen_started(&self, addr: SocketAddr);

    fn on_listen_stopped(&self);
}
