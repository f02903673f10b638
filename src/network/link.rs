//! Link - the connecting side of the transport.
//!
//! Holds at most one outbound connection at a time. The worker is the same
//! [`Connection`] task the gateway uses, so the client observes the same
//! callback ordering as the server.

use crate::config::LimitsConfig;
use crate::error::TransportError;
use crate::network::{Connection, ConnectionEvents, ConnectionHandle};
use crate::state::ConnIdGenerator;
use parking_lot::Mutex;
use relay_proto::check_line;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

struct ActiveLink {
    handle: ConnectionHandle,
    task: JoinHandle<()>,
}

/// Client transport.
pub struct Link<E> {
    events: Arc<E>,
    limits: LimitsConfig,
    ids: ConnIdGenerator,
    active: Mutex<Option<ActiveLink>>,
}

impl<E: ConnectionEvents> Link<E> {
    pub fn new(events: Arc<E>, limits: LimitsConfig) -> Self {
        Self {
            events,
            limits,
            ids: ConnIdGenerator::new(),
            active: Mutex::new(None),
        }
    }

    /// Open a connection. `on_connected` has fired by the time this returns.
    #[instrument(skip(self), name = "connect")]
    pub async fn connect(&self, host: &str, port: u16) -> Result<ConnectionHandle, TransportError> {
        let connect_err = |source| TransportError::Connect {
            host: host.to_string(),
            port,
            source,
        };
        let stream = TcpStream::connect((host, port)).await.map_err(connect_err)?;
        let addr = stream.peer_addr().map_err(connect_err)?;
        // Best effort; Nagle only affects latency.
        let _ = stream.set_nodelay(true);

        let id = self.ids.next();
        let (handle, outgoing) =
            ConnectionHandle::new(id, addr, self.limits.send_queue, CancellationToken::new());
        info!(conn_id = id, %addr, "Connected");
        self.events.on_connected(&handle);

        let connection = Connection::new(
            handle.clone(),
            stream,
            outgoing,
            Arc::clone(&self.events),
            self.limits.max_line_len,
        );
        let task = tokio::spawn(connection.run());

        let previous = self.active.lock().replace(ActiveLink {
            handle: handle.clone(),
            task,
        });
        if let Some(previous) = previous {
            previous.handle.close();
        }
        Ok(handle)
    }

    /// Queue a line on the current connection.
    ///
    /// Lines that would not go out as a single wire line are refused here
    /// rather than dropped by the worker.
    pub fn send(&self, line: impl Into<String>) -> Result<(), TransportError> {
        let line = line.into();
        check_line(&line, self.limits.max_line_len)?;
        match self.active.lock().as_ref() {
            Some(active) => active.handle.send(line),
            None => Err(TransportError::NotConnected),
        }
    }

    /// Close the current connection and wait for its worker.
    ///
    /// `on_disconnected` has fired by the time this returns. A no-op when
    /// there is no connection.
    pub async fn close(&self) -> Result<(), TransportError> {
        let active = self.active.lock().take();
        if let Some(active) = active {
            active.handle.close();
            active.task.await?;
        }
        Ok(())
    }
}
