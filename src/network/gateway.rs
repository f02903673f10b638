//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds a socket on demand and spawns a [`Connection`] task for
//! each incoming client. Listening can be stopped and resumed without
//! touching established connections; `close()` additionally tears every
//! connection down and waits for the workers to finish.

use crate::config::LimitsConfig;
use crate::error::TransportError;
use crate::network::{Connection, ConnectionHandle, ListenerEvents};
use crate::state::ConnIdGenerator;
use parking_lot::Mutex;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, instrument};

/// Pause after a failed `accept()` so a persistent error (e.g. fd
/// exhaustion) does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// State shared with the accept loop.
struct Shared<E> {
    events: Arc<E>,
    ids: ConnIdGenerator,
    limits: LimitsConfig,
    tracker: TaskTracker,
}

struct ActiveListener {
    addr: SocketAddr,
    stop: CancellationToken,
    task: JoinHandle<()>,
}

/// The listening side of the transport.
pub struct Gateway<E> {
    shared: Arc<Shared<E>>,
    bind: IpAddr,
    listener: Mutex<Option<ActiveListener>>,
    /// Parent of every connection's closer; replaced after each `close()`.
    connections: Mutex<CancellationToken>,
}

impl<E: ListenerEvents> Gateway<E> {
    pub fn new(events: Arc<E>, bind: IpAddr, limits: LimitsConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                events,
                ids: ConnIdGenerator::new(),
                limits,
                tracker: TaskTracker::new(),
            }),
            bind,
            listener: Mutex::new(None),
            connections: Mutex::new(CancellationToken::new()),
        }
    }

    /// Start accepting connections on `port` (0 picks a free port).
    ///
    /// `on_listen_started` has fired by the time this returns. Calling it
    /// while already listening returns the current address.
    #[instrument(skip(self), name = "listen")]
    pub async fn listen(&self, port: u16) -> Result<SocketAddr, TransportError> {
        if let Some(addr) = self.local_addr() {
            return Ok(addr);
        }

        let listener = TcpListener::bind((self.bind, port))
            .await
            .map_err(|source| TransportError::Bind { port, source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| TransportError::Bind { port, source })?;

        info!(%addr, "Listener bound");
        self.shared.events.on_listen_started(addr);

        let stop = CancellationToken::new();
        let parent = self.connections.lock().clone();
        let task = tokio::spawn(accept_loop(
            listener,
            stop.clone(),
            parent,
            Arc::clone(&self.shared),
        ));
        *self.listener.lock() = Some(ActiveListener { addr, stop, task });
        Ok(addr)
    }

    /// Stop accepting. Established connections stay open.
    ///
    /// Returns once the accept loop has exited and `on_listen_stopped` has
    /// fired. A no-op when not listening.
    pub async fn stop_listening(&self) -> Result<(), TransportError> {
        let active = self.listener.lock().take();
        if let Some(active) = active {
            active.stop.cancel();
            active.task.await?;
        }
        Ok(())
    }

    /// Stop listening, close every connection, and wait for their workers.
    ///
    /// Each connection reports `on_disconnected` before this returns. The
    /// gateway can listen again afterwards.
    pub async fn close(&self) -> Result<(), TransportError> {
        let stopped = self.stop_listening().await;

        let parent = std::mem::replace(&mut *self.connections.lock(), CancellationToken::new());
        parent.cancel();

        let tracker = &self.shared.tracker;
        tracker.close();
        tracker.wait().await;
        tracker.reopen();

        info!("All connections closed");
        stopped
    }

    pub fn is_listening(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Address of the active listener.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.lock().as_ref().map(|active| active.addr)
    }

    /// Number of connection workers still running.
    pub fn active_connections(&self) -> usize {
        self.shared.tracker.len()
    }
}

#[instrument(skip_all, name = "gateway")]
async fn accept_loop<E: ListenerEvents>(
    listener: TcpListener,
    stop: CancellationToken,
    parent: CancellationToken,
    shared: Arc<Shared<E>>,
) {
    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        error!(%addr, error = %e, "Failed to set TCP_NODELAY");
                    }

                    let id = shared.ids.next();
                    let (handle, outgoing) = ConnectionHandle::new(
                        id,
                        addr,
                        shared.limits.send_queue,
                        parent.child_token(),
                    );
                    info!(conn_id = id, %addr, "Connection accepted");

                    // Registration happens-before the first inbound line.
                    shared.events.on_connected(&handle);

                    let connection = Connection::new(
                        handle,
                        stream,
                        outgoing,
                        Arc::clone(&shared.events),
                        shared.limits.max_line_len,
                    );
                    shared.tracker.spawn(connection.run());
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    drop(listener);
    info!("Listener stopped");
    shared.events.on_listen_stopped();
}
