//! Test relay clients.
//!
//! [`TestClient`] speaks raw lines over TCP so tests can send anything,
//! including protocol violations. [`chat_client`] builds the real client
//! control plane wired to a [`Transcript`].

use relayd::config::LimitsConfig;
use relayd::console::Transcript;
use relayd::handlers::{ChatClient, ClientControl};
use relayd::state::ClientRuntime;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::{QUIET, WAIT};

/// A raw line client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Send one line; the terminator is added.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single line.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(WAIT).await
    }

    /// Receive a line with a timeout. End of stream is an error.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("connection closed by server");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Receive one line and require it to equal `expected`.
    pub async fn expect(&mut self, expected: &str) -> anyhow::Result<()> {
        let line = self.recv().await?;
        anyhow::ensure!(line == expected, "expected {expected:?}, got {line:?}");
        Ok(())
    }

    /// Require that nothing arrives for a short while.
    pub async fn expect_silence(&mut self) -> anyhow::Result<()> {
        match self.recv_timeout(QUIET).await {
            Ok(line) => anyhow::bail!("expected silence, got {line:?}"),
            Err(e) if e.is::<tokio::time::error::Elapsed>() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Require the server to close the connection with no further lines.
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        let read = timeout(WAIT, self.reader.read_line(&mut line)).await;
        match read {
            Ok(Ok(0)) => Ok(()),
            // A reset also counts as closed
            Ok(Err(_)) => Ok(()),
            Ok(Ok(_)) => anyhow::bail!("expected close, got {:?}", line.trim_end()),
            Err(_) => anyhow::bail!("connection still open after {WAIT:?}"),
        }
    }
}

/// Build a chat client for `login_id` aimed at `addr`, not yet connected.
pub fn chat_client(login_id: &str, addr: SocketAddr) -> ClientControl<Transcript> {
    let runtime = ClientRuntime::new(login_id, addr.ip().to_string(), addr.port());
    let client = Arc::new(ChatClient::new(Arc::new(runtime), Arc::new(Transcript::new())));
    ClientControl::new(client, LimitsConfig::default(), CancellationToken::new())
}
