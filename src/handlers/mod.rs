//! Relay handlers.
//!
//! - [`RelayServer`]: session state machine driven by the gateway callbacks
//! - [`broadcast`]: fan-out to authenticated connections
//! - [`ServerControl`]: operator console commands
//! - [`ChatClient`] / [`ClientControl`]: the client side of the wire

mod broadcast;
mod client;
mod operator;
mod session;

pub use broadcast::broadcast;
pub use client::{ChatClient, ClientControl};
pub use operator::ServerControl;
pub use session::RelayServer;

/// What a console loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}
