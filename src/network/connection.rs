//! Connection - per-connection worker task.
//!
//! ```text
//!            ┌──────────────────────────────────────┐
//!            │           Connection task            │
//!  socket ──►│ FramedRead ──► events.on_message()   │
//!            │                                      │
//!  handle ──►│ outbound queue ──► FramedWrite ──────┼──► socket
//!            │                                      │
//!  closer ──►│ cancel ──► drain queue, shutdown,    │
//!            │            events.on_disconnected()  │
//!            └──────────────────────────────────────┘
//! ```

use crate::network::{CloseReason, ConnectionEvents, ConnectionHandle};
use crate::telemetry::spans;
use futures_util::{SinkExt, StreamExt};
use relay_proto::{LineCodec, ProtocolError};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, debug, info, warn};

/// Upper bound on flushing queued lines once the connection is closing.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// A connection worker. Consumed by [`Connection::run`].
pub struct Connection<E> {
    handle: ConnectionHandle,
    stream: TcpStream,
    outgoing: mpsc::Receiver<String>,
    events: Arc<E>,
    max_line_len: usize,
}

impl<E: ConnectionEvents> Connection<E> {
    pub fn new(
        handle: ConnectionHandle,
        stream: TcpStream,
        outgoing: mpsc::Receiver<String>,
        events: Arc<E>,
        max_line_len: usize,
    ) -> Self {
        Self {
            handle,
            stream,
            outgoing,
            events,
            max_line_len,
        }
    }

    /// Run until either side closes, then report the disconnect exactly once.
    pub async fn run(self) {
        let span = spans::connection(self.handle.id(), self.handle.addr());
        self.run_inner().instrument(span).await
    }

    async fn run_inner(self) {
        let Self {
            handle,
            stream,
            mut outgoing,
            events,
            max_line_len,
        } = self;

        let (reader, writer) = stream.into_split();
        let mut reader = FramedRead::new(reader, LineCodec::with_max_len(max_line_len));
        let mut writer = FramedWrite::new(writer, LineCodec::with_max_len(max_line_len));

        let reason = loop {
            tokio::select! {
                biased;

                _ = handle.closed() => break CloseReason::Local,

                Some(line) = outgoing.recv() => {
                    let written = tokio::select! {
                        _ = handle.closed() => break CloseReason::Local,
                        written = writer.send(line) => written,
                    };
                    match written {
                        Ok(()) => {}
                        Err(ProtocolError::Io(e)) => break CloseReason::Error(e.to_string()),
                        Err(e) => warn!(error = %e, "Dropping unencodable outbound line"),
                    }
                }

                frame = reader.next() => match frame {
                    Some(Ok(line)) => {
                        debug!(len = line.len(), "Received line");
                        events.on_message(&handle, line);
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, code = e.error_code(), "Read failed");
                        break CloseReason::Error(e.to_string());
                    }
                    None => break CloseReason::Remote,
                },
            }
        };

        // Queued lines (e.g. a rejection notice) go out before the close.
        let drain = async {
            while let Ok(line) = outgoing.try_recv() {
                if writer.send(line).await.is_err() {
                    break;
                }
            }
            let _ = writer.close().await;
        };
        if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
            debug!("Timed out flushing outbound queue");
        }

        handle.close();
        info!(reason = ?reason, "Connection closed");
        events.on_disconnected(&handle, reason);
    }
}
