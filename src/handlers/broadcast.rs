//! Broadcast relay.
//!
//! Fans one line out to every authenticated connection. Delivery is a
//! non-blocking enqueue per recipient; a recipient that is closing or whose
//! queue is full misses the line and the rest still get it.

use crate::metrics;
use crate::state::ConnectionRegistry;
use tracing::{debug, warn};

/// Send `line` to every authenticated connection. Returns how many
/// recipients accepted it.
pub fn broadcast(registry: &ConnectionRegistry, line: &str) -> usize {
    let mut delivered = 0;

    registry.for_each_authenticated(|handle, login_id| match handle.send(line) {
        Ok(()) => {
            delivered += 1;
            metrics::record_relayed();
        }
        Err(e) => {
            warn!(
                conn_id = handle.id(),
                login_id,
                error = %e,
                code = e.error_code(),
                "Dropped broadcast line"
            );
            metrics::record_dropped();
        }
    });

    debug!(recipients = delivered, "Broadcast");
    metrics::record_fanout(delivered);
    delivered
}
