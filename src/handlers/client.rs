//! Client side of the relay.
//!
//! [`ChatClient`] is the callback set the [`Link`] drives: it logs in as soon
//! as the connection is up and shows every server line verbatim.
//! [`ClientControl`] interprets the user's console: `#` lines are commands
//! checked against the client runtime, everything else is sent as chat.

use super::Flow;
use crate::config::LimitsConfig;
use crate::console::Console;
use crate::error::ControlError;
use crate::network::{CloseReason, ConnectionEvents, ConnectionHandle, Link};
use crate::state::ClientRuntime;
use crate::telemetry::{CommandTimer, spans};
use relay_proto::{ClientCommand, is_command, login_line};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

/// Connection callbacks for the chat client.
pub struct ChatClient<C> {
    runtime: Arc<ClientRuntime>,
    console: Arc<C>,
}

impl<C: Console> ChatClient<C> {
    pub fn new(runtime: Arc<ClientRuntime>, console: Arc<C>) -> Self {
        Self { runtime, console }
    }

    pub fn runtime(&self) -> &ClientRuntime {
        &self.runtime
    }

    pub fn console(&self) -> &C {
        &self.console
    }
}

impl<C: Console> ConnectionEvents for ChatClient<C> {
    fn on_connected(&self, handle: &ConnectionHandle) {
        self.runtime.set_connected(true);
        let login_id = self.runtime.login_id();
        if let Err(e) = handle.send(login_line(&login_id)) {
            warn!(error = %e, "Failed to queue login handshake");
            self.console
                .display("Error: Unable to send login message to server.");
        }
    }

    fn on_message(&self, _handle: &ConnectionHandle, line: String) {
        self.console.display(&line);
    }

    fn on_disconnected(&self, _handle: &ConnectionHandle, reason: CloseReason) {
        self.runtime.set_connected(false);
        info!(reason = ?reason, "Disconnected from server");
        if reason.is_local() {
            self.console.display("Connection closed.");
        } else {
            self.console.display("The server has shut down.");
        }
    }
}

/// User control plane for one chat client.
pub struct ClientControl<C: Console> {
    client: Arc<ChatClient<C>>,
    link: Link<ChatClient<C>>,
    shutdown: CancellationToken,
}

impl<C: Console> ClientControl<C> {
    pub fn new(client: Arc<ChatClient<C>>, limits: LimitsConfig, shutdown: CancellationToken) -> Self {
        let link = Link::new(Arc::clone(&client), limits);
        Self {
            client,
            link,
            shutdown,
        }
    }

    pub fn client(&self) -> &ChatClient<C> {
        &self.client
    }

    /// Connect to the configured host and port. Runtime state is unchanged
    /// on failure.
    pub async fn connect(&self) -> Result<(), ControlError> {
        let runtime = self.client.runtime();
        let (host, port) = (runtime.host(), runtime.port());
        self.link
            .connect(&host, port)
            .await
            .map_err(ControlError::Connect)?;
        Ok(())
    }

    /// Handle one console line.
    pub async fn handle_line(&self, line: &str) -> Flow {
        if !is_command(line) {
            if let Err(e) = self.link.send(line) {
                debug!(error = %e, "Chat not sent");
                self.report(ControlError::Send(e));
            }
            return Flow::Continue;
        }

        let command = match ClientCommand::parse(line) {
            Ok(command) => command,
            Err(e) => {
                self.report(ControlError::from(e));
                return Flow::Continue;
            }
        };

        let _timer = CommandTimer::new(command.name());
        let span = spans::command(command.name());
        match self.execute(command).instrument(span).await {
            Ok(flow) => flow,
            Err(e) => {
                self.report(e);
                Flow::Continue
            }
        }
    }

    /// Run a parsed command after checking its precondition.
    pub async fn execute(&self, command: ClientCommand) -> Result<Flow, ControlError> {
        let runtime = self.client.runtime();
        let console = self.client.console();

        match command {
            ClientCommand::Quit => {
                if let Err(e) = self.link.close().await {
                    warn!(error = %e, "Error closing connection during quit");
                }
                self.shutdown.cancel();
                return Ok(Flow::Quit);
            }
            ClientCommand::Logoff => {
                if !runtime.is_connected() {
                    return Err(ControlError::NotConnected);
                }
                self.link.close().await.map_err(ControlError::Disconnect)?;
                console.display("Disconnected from server.");
            }
            ClientCommand::SetHost(host) => {
                if runtime.is_connected() {
                    return Err(ControlError::MustLogOff("host"));
                }
                console.display(&format!("Host set to: {host}"));
                runtime.set_host(host);
            }
            ClientCommand::SetPort(port) => {
                if runtime.is_connected() {
                    return Err(ControlError::MustLogOff("port"));
                }
                runtime.set_port(port);
                console.display(&format!("Port set to: {port}"));
            }
            ClientCommand::Login => {
                if runtime.is_connected() {
                    return Err(ControlError::AlreadyConnected);
                }
                self.connect().await?;
                console.display(&format!(
                    "Connected to server at {} with port {}",
                    runtime.host(),
                    runtime.port()
                ));
            }
            ClientCommand::GetHost => {
                console.display(&format!("Current host: {}", runtime.host()));
            }
            ClientCommand::GetPort => {
                console.display(&format!("Current port: {}", runtime.port()));
            }
        }
        Ok(Flow::Continue)
    }

    fn report(&self, err: ControlError) {
        warn!(error = %err, code = err.error_code(), "Command failed");
        self.client.console().display(&err.to_display());
    }
}
