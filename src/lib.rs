//! relayd - session-gated multi-client text relay.
//!
//! Clients connect, log in with a self-declared id (`#login <id>`), and every
//! line they send afterwards is relayed to all logged-in clients as
//! `<id>> <text>`. The server operator and each client user drive their side
//! through `#` console commands.
//!
//! The crate is shared by the `relayd` and `relay-client` binaries and by the
//! integration tests.

pub mod config;
pub mod console;
pub mod error;
pub mod handlers;
pub mod http;
pub mod metrics;
pub mod network;
pub mod state;
pub mod telemetry;
