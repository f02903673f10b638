//! Session state machine - server side handling of inbound lines.
//!
//! [`RelayServer`] is the callback set the gateway drives. Every inbound line
//! is either the `#login <id>` handshake or chat:
//!
//! - login while `Unauthenticated`: record the id, announce `"<id> has
//!   logged on."` to the operator and every authenticated connection;
//! - chat while `Authenticated`: relay `"<id>> <text>"` the same way;
//! - anything else is a protocol violation: the offender gets exactly one
//!   notice, is marked `Closed` (so it drops out of broadcasts at once) and
//!   its connection is closed.
//!
//! A relayed line that would not fit on one wire line is never broadcast;
//! the sender gets a notice instead and stays connected.

use super::broadcast::broadcast;
use crate::console::Console;
use crate::error::{ControlError, HandlerError, HandlerResult, RegistryError};
use crate::metrics;
use crate::network::{CloseReason, ConnectionEvents, ConnectionHandle, ListenerEvents};
use crate::state::{ConnectionRegistry, ServerRuntime, SessionState};
use relay_proto::{
    DEFAULT_MAX_LINE_LEN, ProtocolError, WireMessage, chat_line, check_line, logged_on,
    server_notice,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Server-side relay core.
pub struct RelayServer<C> {
    registry: ConnectionRegistry,
    runtime: Arc<ServerRuntime>,
    console: Arc<C>,
    max_line_len: usize,
}

impl<C: Console> RelayServer<C> {
    pub fn new(registry: ConnectionRegistry, runtime: Arc<ServerRuntime>, console: Arc<C>) -> Self {
        Self {
            registry,
            runtime,
            console,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }

    /// Outbound line limit, matching the connections' codec.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn runtime(&self) -> &ServerRuntime {
        &self.runtime
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Process one inbound line from `handle`.
    pub fn handle_line(&self, handle: &ConnectionHandle, line: &str) -> HandlerResult {
        match WireMessage::parse(line) {
            WireMessage::Login(login_id) => self.handle_login(handle, &login_id),
            WireMessage::Chat(text) => self.handle_chat(handle, &text),
        }
    }

    fn handle_login(&self, handle: &ConnectionHandle, login_id: &str) -> HandlerResult {
        if check_line(&logged_on(login_id), self.max_line_len).is_err() {
            return Err(HandlerError::LoginTooLong);
        }
        let login_id = self.registry.set_login(handle.id(), login_id)?;
        info!(conn_id = handle.id(), login_id = %login_id, "Client logged on");
        metrics::record_login();

        let announcement = logged_on(&login_id);
        self.console.display(&announcement);
        broadcast(&self.registry, &announcement);
        Ok(())
    }

    fn handle_chat(&self, handle: &ConnectionHandle, text: &str) -> HandlerResult {
        let session = self.registry.get(handle.id());
        match (session.state(), session.login_id()) {
            (SessionState::Authenticated, Some(login_id)) => {
                let line = chat_line(login_id, text);
                if let Err(e) = check_line(&line, self.max_line_len) {
                    self.refuse_relay(handle, &e);
                    return Ok(());
                }
                self.console.display(&line);
                broadcast(&self.registry, &line);
                Ok(())
            }
            (SessionState::Closed, _) => Err(RegistryError::SessionClosed.into()),
            _ => Err(HandlerError::NotLoggedIn),
        }
    }

    /// Tell the sender its line was not relayed. The connection stays open.
    fn refuse_relay(&self, handle: &ConnectionHandle, err: &ProtocolError) {
        warn!(conn_id = handle.id(), error = %err, "Chat line does not fit on the wire");
        metrics::record_dropped();

        let text = match err {
            ProtocolError::LineTooLong { .. } => "Error: Message is too long to relay.",
            _ => "Error: Message could not be relayed.",
        };
        if let Err(e) = handle.send(server_notice(text)) {
            debug!(conn_id = handle.id(), error = %e, "Could not queue relay notice");
        }
    }

    /// Notify the offender once and force-close its connection.
    pub fn reject(&self, handle: &ConnectionHandle, err: &HandlerError) {
        let Some(notice) = err.notice() else {
            debug!(conn_id = handle.id(), error = %err, "Ignoring line from closing connection");
            return;
        };

        warn!(
            conn_id = handle.id(),
            addr = %handle.addr(),
            error = %err,
            code = err.error_code(),
            "Protocol violation, closing connection"
        );
        metrics::record_violation(err.error_code());

        if let Err(e) = handle.send(notice) {
            debug!(conn_id = handle.id(), error = %e, "Could not queue rejection notice");
        }
        self.registry.mark_closed(handle.id());
        handle.close();

        if let Some(text) = operator_notice(err) {
            self.console.display(&text);
        }
    }

    /// Show an operator line on the console and relay it to every
    /// authenticated client as a server notice.
    pub fn announce(&self, text: &str) -> Result<usize, ControlError> {
        let line = server_notice(text);
        check_line(&line, self.max_line_len).map_err(ControlError::Relay)?;
        self.console.display(text);
        Ok(broadcast(&self.registry, &line))
    }
}

/// What the operator sees when a connection is rejected.
fn operator_notice(err: &HandlerError) -> Option<String> {
    let text = match err {
        HandlerError::NotLoggedIn => {
            "Unauthorized message attempt from a client without login ID. Closing connection."
                .to_string()
        }
        HandlerError::Registry(RegistryError::AlreadyAuthenticated(_)) => {
            "Client attempted to re-login. Closing connection.".to_string()
        }
        HandlerError::LoginTooLong => {
            "Client attempted to log in with an oversized login ID. Closing connection."
                .to_string()
        }
        HandlerError::Registry(RegistryError::EmptyLogin) => {
            "Client attempted to log in without a login ID. Closing connection.".to_string()
        }
        HandlerError::Registry(RegistryError::LoginInUse(id)) => {
            format!("Client attempted to log in as {id}, which is already in use. Closing connection.")
        }
        HandlerError::Registry(RegistryError::SessionClosed | RegistryError::NotFound(_)) => {
            return None;
        }
    };
    Some(text)
}

impl<C: Console> ConnectionEvents for RelayServer<C> {
    fn on_connected(&self, handle: &ConnectionHandle) {
        self.registry.register(handle.clone());
        metrics::record_connection_opened();
        self.console.display("A new client has connected to the server.");
    }

    fn on_message(&self, handle: &ConnectionHandle, line: String) {
        if let Err(err) = self.handle_line(handle, &line) {
            self.reject(handle, &err);
        }
    }

    fn on_disconnected(&self, handle: &ConnectionHandle, reason: CloseReason) {
        let Some(session) = self.registry.unregister(handle.id()) else {
            return;
        };
        metrics::record_connection_closed();
        info!(
            conn_id = handle.id(),
            login_id = session.login_id().unwrap_or("-"),
            reason = ?reason,
            "Client disconnected"
        );

        let text = match session.login_id() {
            Some(login_id) => format!("Client {login_id} has disconnected."),
            None => "Client has disconnected.".to_string(),
        };
        self.console.display(&text);
    }
}

impl<C: Console> ListenerEvents for RelayServer<C> {
    fn on_listen_started(&self, addr: SocketAddr) {
        self.runtime.set_listening(true);
        self.console
            .display(&format!("Server listening for connections on port {}", addr.port()));
    }

    fn on_listen_stopped(&self) {
        self.runtime.set_listening(false);
        self.console
            .display("Server has stopped listening for connections.");
    }
}
