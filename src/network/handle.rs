//! Per-connection handle shared between the transport and the registry.

use crate::error::TransportError;
use crate::state::ConnId;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Cheap, cloneable reference to one live connection.
///
/// The socket itself stays with the connection worker; a handle can only
/// queue outbound lines and request a close.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnId,
    addr: SocketAddr,
    outgoing: mpsc::Sender<String>,
    closer: CancellationToken,
}

impl ConnectionHandle {
    /// Create a handle plus the receiving end of its outbound queue.
    pub fn new(
        id: ConnId,
        addr: SocketAddr,
        capacity: usize,
        closer: CancellationToken,
    ) -> (Self, mpsc::Receiver<String>) {
        let (outgoing, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                id,
                addr,
                outgoing,
                closer,
            },
            rx,
        )
    }

    #[inline]
    pub fn id(&self) -> ConnId {
        self.id
    }

    #[inline]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Queue a line for delivery without waiting.
    ///
    /// Fails when the queue is full or the connection is closing.
    pub fn send(&self, line: impl Into<String>) -> Result<(), TransportError> {
        if self.closer.is_cancelled() {
            return Err(TransportError::Closed(self.id));
        }
        self.outgoing.try_send(line.into()).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::QueueFull(self.id),
            TrySendError::Closed(_) => TransportError::Closed(self.id),
        })
    }

    /// Ask the worker to flush queued lines and close. Idempotent.
    pub fn close(&self) {
        self.closer.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_cancelled()
    }

    /// Resolves once a close has been requested.
    pub async fn closed(&self) {
        self.closer.cancelled().await
    }
}
