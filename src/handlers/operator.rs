//! Server command dispatcher.
//!
//! Lines typed at the operator console that start with `#` are parsed into a
//! [`ServerCommand`] and checked against the runtime state before anything
//! changes; other lines are operator chat. Every outcome is reported on the
//! console. Remote peers never reach this code.

use super::{Flow, RelayServer};
use crate::config::LimitsConfig;
use crate::console::Console;
use crate::error::ControlError;
use crate::network::Gateway;
use crate::telemetry::{CommandTimer, spans};
use relay_proto::{ServerCommand, is_command};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, warn};

/// Operator control plane for one relay server.
pub struct ServerControl<C: Console> {
    relay: Arc<RelayServer<C>>,
    gateway: Gateway<RelayServer<C>>,
    shutdown: CancellationToken,
}

impl<C: Console> ServerControl<C> {
    pub fn new(
        relay: Arc<RelayServer<C>>,
        bind: IpAddr,
        limits: LimitsConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let gateway = Gateway::new(Arc::clone(&relay), bind, limits);
        Self {
            relay,
            gateway,
            shutdown,
        }
    }

    pub fn relay(&self) -> &RelayServer<C> {
        &self.relay
    }

    pub fn gateway(&self) -> &Gateway<RelayServer<C>> {
        &self.gateway
    }

    /// Listen on the configured port. Runtime state is unchanged on failure.
    pub async fn start(&self) -> Result<SocketAddr, ControlError> {
        let port = self.relay.runtime().port();
        self.gateway.listen(port).await.map_err(ControlError::Listen)
    }

    /// Handle one console line.
    pub async fn handle_line(&self, line: &str) -> Flow {
        if !is_command(line) {
            if let Err(e) = self.relay.announce(line) {
                self.report(e);
            }
            return Flow::Continue;
        }

        let command = match ServerCommand::parse(line) {
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
    pub async fn execute(&self, command: ServerCommand) -> Result<Flow, ControlError> {
        let runtime = self.relay.runtime();
        let console = self.relay.console();

        match command {
            ServerCommand::Quit => {
                if let Err(e) = self.gateway.close().await {
                    warn!(error = %e, "Error closing connections during quit");
                }
                console.display("Server quit gracefully");
                info!("Operator requested shutdown");
                self.shutdown.cancel();
                return Ok(Flow::Quit);
            }
            ServerCommand::Stop => {
                if !runtime.is_listening() {
                    return Err(ControlError::NotListening);
                }
                self.gateway.stop_listening().await.map_err(ControlError::Stop)?;
            }
            ServerCommand::Close => {
                self.gateway.close().await.map_err(ControlError::Close)?;
                console.display("Server closed and all clients disconnected.");
            }
            ServerCommand::SetPort(port) => {
                if runtime.is_listening() {
                    return Err(ControlError::PortWhileListening);
                }
                runtime.set_port(port);
                console.display(&format!("Port is now: {port}"));
            }
            ServerCommand::Start => {
                if runtime.is_listening() {
                    return Err(ControlError::AlreadyListening);
                }
                self.start().await?;
            }
            ServerCommand::GetPort => {
                console.display(&format!("Current port: {}", runtime.port()));
            }
        }
        Ok(Flow::Continue)
    }

    fn report(&self, err: ControlError) {
        warn!(error = %err, code = err.error_code(), "Command failed");
        self.relay.console().display(&err.to_display());
    }
}
