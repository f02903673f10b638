//! Console sinks.
//!
//! The relay core never prints directly; it hands operator-visible text to a
//! [`Console`]. The binaries use [`StdoutConsole`]; tests use a
//! [`Transcript`] and assert on what was shown.

use parking_lot::Mutex;
use std::io::Write;
use std::time::Duration;
use tokio::sync::Notify;

/// Sink for operator-visible text.
pub trait Console: Send + Sync + 'static {
    fn display(&self, text: &str);
}

/// Writes each line to stdout behind an optional prefix.
#[derive(Debug, Default, Clone)]
pub struct StdoutConsole {
    prefix: &'static str,
}

impl StdoutConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: &'static str) -> Self {
        Self { prefix }
    }
}

impl Console for StdoutConsole {
    fn display(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        // stdout closed: nothing useful left to do with the text
        let _ = writeln!(out, "{}{}", self.prefix, text);
        let _ = out.flush();
    }
}

/// In-memory console that records every displayed line.
#[derive(Debug, Default)]
pub struct Transcript {
    lines: Mutex<Vec<String>>,
    changed: Notify,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lines.lock().iter().any(|line| line == text)
    }

    /// How many times `text` was displayed.
    pub fn count(&self, text: &str) -> usize {
        self.lines.lock().iter().filter(|line| *line == text).count()
    }

    /// Wait until `text` has been displayed, up to `timeout`.
    pub async fn wait_for(&self, text: &str, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let changed = self.changed.notified();
                tokio::pin!(changed);
                changed.as_mut().enable();
                if self.contains(text) {
                    return;
                }
                changed.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }
}

impl Console for Transcript {
    fn display(&self, text: &str) {
        self.lines.lock().push(text.to_string());
        self.changed.notify_waiters();
    }
}
