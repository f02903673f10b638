//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::{IpAddr, Ipv4Addr};

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_port() -> u16 {
    relay_proto::DEFAULT_PORT
}

pub fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

// =============================================================================
// Client Defaults
// =============================================================================

pub fn default_host() -> String {
    "localhost".to_string()
}

// =============================================================================
// Limit Defaults
// =============================================================================

pub fn default_max_line_len() -> usize {
    4096
}

pub fn default_send_queue() -> usize {
    1024
}
