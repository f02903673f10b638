//! Prometheus metrics collection for relayd.
//!
//! - `relay_connections_total` - Connections accepted
//! - `relay_connected_clients` - Live connections (gauge)
//! - `relay_logins_total` - Successful logins
//! - `relay_messages_relayed_total` - Lines delivered to recipients' queues
//! - `relay_messages_dropped_total` - Deliveries dropped (queue full / closing)
//! - `relay_protocol_violations_total{kind}` - Rejected logins and chat before login
//! - `relay_command_total{command}` - Console commands by name
//! - `relay_command_duration_seconds{command}` - Console command latency
//! - `relay_message_fanout` - Recipients per broadcast (histogram)
//!
//! Recording before [`init`] is a no-op.

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

pub static CONNECTIONS_TOTAL: OnceLock<IntCounter> = OnceLock::new();

pub static LOGINS_TOTAL: OnceLock<IntCounter> = OnceLock::new();

/// Lines accepted into a recipient's outbound queue.
pub static MESSAGES_RELAYED: OnceLock<IntCounter> = OnceLock::new();

/// Lines that could not be queued for a recipient.
pub static MESSAGES_DROPPED: OnceLock<IntCounter> = OnceLock::new();

pub static PROTOCOL_VIOLATIONS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges
// ========================================================================

pub static CONNECTED_CLIENTS: OnceLock<IntGauge> = OnceLock::new();

// ========================================================================
// Console commands and fan-out
// ========================================================================

pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

pub static MESSAGE_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; later calls leave the first registration in
/// place.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                match $init {
                    Ok(m) => {
                        if let Err(e) = r.register(Box::new(m.clone())) {
                            tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                        }
                        let _ = $metric.set(m);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                    }
                }
            }
        };
    }

    register!(CONNECTIONS_TOTAL, IntCounter::new("relay_connections_total", "Connections accepted"));
    register!(LOGINS_TOTAL, IntCounter::new("relay_logins_total", "Successful logins"));
    register!(MESSAGES_RELAYED, IntCounter::new("relay_messages_relayed_total", "Lines queued for delivery"));
    register!(MESSAGES_DROPPED, IntCounter::new("relay_messages_dropped_total", "Lines dropped for a recipient"));
    register!(PROTOCOL_VIOLATIONS, IntCounterVec::new(Opts::new("relay_protocol_violations_total", "Protocol violations by kind"), &["kind"]));
    register!(CONNECTED_CLIENTS, IntGauge::new("relay_connected_clients", "Currently connected clients"));
    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("relay_command_total", "Console commands processed by name"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("relay_command_duration_seconds", "Console command latency by name")
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["command"]));
    register!(MESSAGE_FANOUT, Histogram::with_opts(
        HistogramOpts::new("relay_message_fanout", "Recipients per broadcast")
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

#[inline]
fn inc(metric: &OnceLock<IntCounter>) {
    if let Some(c) = metric.get() {
        c.inc();
    }
}

#[inline]
pub fn record_connection_opened() {
    inc(&CONNECTIONS_TOTAL);
    if let Some(g) = CONNECTED_CLIENTS.get() {
        g.inc();
    }
}

#[inline]
pub fn record_connection_closed() {
    if let Some(g) = CONNECTED_CLIENTS.get() {
        g.dec();
    }
}

#[inline]
pub fn record_login() {
    inc(&LOGINS_TOTAL);
}

#[inline]
pub fn record_relayed() {
    inc(&MESSAGES_RELAYED);
}

#[inline]
pub fn record_dropped() {
    inc(&MESSAGES_DROPPED);
}

/// Record a rejected login or chat-before-login.
#[inline]
pub fn record_violation(kind: &str) {
    if let Some(c) = PROTOCOL_VIOLATIONS.get() {
        c.with_label_values(&[kind]).inc();
    }
}

/// Record a console command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record how many recipients a broadcast reached.
#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(h) = MESSAGE_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();
        init();

        record_command("getport", 0.001);
        record_violation("not_logged_in");
        record_fanout(3);

        let output = gather_metrics();
        assert!(output.contains("relay_command_total"));
        assert!(output.contains("relay_protocol_violations_total"));
        assert!(output.contains("relay_message_fanout"));
    }
}
