//! Per-connection limits configuration.

use serde::Deserialize;

use super::defaults::{default_max_line_len, default_send_queue};

/// Per-connection limits.
///
/// These bound how much a single peer can make the relay buffer, in either
/// direction.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Longest accepted line in bytes, terminator included (default: 4096).
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Outbound queue capacity per connection (default: 1024).
    /// A recipient whose queue is full misses the line.
    #[serde(default = "default_send_queue")]
    pub send_queue: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
            send_queue: default_send_queue(),
        }
    }
}
