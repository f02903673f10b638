//! Connection identity generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one live connection, assigned by the transport.
pub type ConnId = u64;

/// Hands out connection ids for one transport instance.
///
/// Ids start at 1 and are never handed out twice by the same generator.
#[derive(Debug)]
pub struct ConnIdGenerator {
    counter: AtomicU64,
}

impl Default for ConnIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnIdGenerator {
    /// Create a generator whose first id is 1.
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    /// Generate the next unique id.
    pub fn next(&self) -> ConnId {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}
