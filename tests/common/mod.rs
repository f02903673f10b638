//! Integration test common infrastructure.
//!
//! Provides an in-process relay server, a raw line client, and a scripted
//! chat client for asserting on relay flows.

#![allow(dead_code)]

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::{TestClient, chat_client};
#[allow(unused_imports)]
pub use server::TestServer;

use std::time::Duration;

/// How long any single expectation may wait.
pub const WAIT: Duration = Duration::from_secs(5);

/// How long to watch for a line that must not arrive.
pub const QUIET: Duration = Duration::from_millis(200);
