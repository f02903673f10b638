//! Test server management.
//!
//! Runs a relay server inside the test process, listening on an ephemeral
//! loopback port, with a [`Transcript`] standing in for the operator console.

use relayd::config::LimitsConfig;
use relayd::console::Transcript;
use relayd::handlers::{Flow, RelayServer, ServerControl};
use relayd::state::{ConnectionRegistry, ServerRuntime};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{TestClient, WAIT};

/// A test server instance.
pub struct TestServer {
    control: ServerControl<Transcript>,
    shutdown: CancellationToken,
}

impl TestServer {
    /// Spawn a server that allows duplicate login ids.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(false, LimitsConfig::default()).await
    }

    /// Spawn a server with explicit login policy and limits.
    pub async fn spawn_with(unique_logins: bool, limits: LimitsConfig) -> anyhow::Result<Self> {
        let relay = Arc::new(RelayServer::new(
            ConnectionRegistry::new(unique_logins),
            Arc::new(ServerRuntime::new(0)),
            Arc::new(Transcript::new()),
        )
        .with_max_line_len(limits.max_line_len));
        let shutdown = CancellationToken::new();
        let control = ServerControl::new(
            relay,
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            limits,
            shutdown.clone(),
        );
        control.start().await?;
        Ok(Self { control, shutdown })
    }

    /// Address of the active listener.
    pub fn addr(&self) -> SocketAddr {
        self.control
            .gateway()
            .local_addr()
            .expect("server is not listening")
    }

    pub fn control(&self) -> &ServerControl<Transcript> {
        &self.control
    }

    pub fn relay(&self) -> &RelayServer<Transcript> {
        self.control.relay()
    }

    /// The operator console.
    pub fn transcript(&self) -> &Transcript {
        self.control.relay().console()
    }

    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Type a line at the operator console.
    pub async fn command(&self, line: &str) -> Flow {
        self.control.handle_line(line).await
    }

    /// Wait until the operator console shows `text`.
    pub async fn wait_for_display(&self, text: &str) -> bool {
        self.transcript().wait_for(text, WAIT).await
    }

    /// Open a raw connection without logging in.
    pub async fn connect(&self) -> anyhow::Result<TestClient> {
        TestClient::connect(self.addr()).await
    }

    /// Open a connection and complete the login handshake.
    pub async fn login(&self, login_id: &str) -> anyhow::Result<TestClient> {
        let mut client = self.connect().await?;
        client.send_raw(&format!("#login {login_id}")).await?;
        client.expect(&format!("{login_id} has logged on.")).await?;
        Ok(client)
    }
}
