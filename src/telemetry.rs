//! Tracing setup, command timing and span constructors.

use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber writing to stderr.
///
/// `RUST_LOG` overrides `default_directive`. Returns quietly if a subscriber
/// is already installed.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Guard for timing a console command and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: &'static str,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use crate::state::ConnId;
    use std::net::SocketAddr;
    use tracing::{Span, info_span};

    /// Span for one connection worker.
    pub fn connection(conn_id: ConnId, addr: SocketAddr) -> Span {
        info_span!("connection", conn_id, %addr)
    }

    /// Span for one console command.
    pub fn command(name: &str) -> Span {
        info_span!("command", name = %name)
    }
}
