//! # relay-proto
//!
//! Line grammar shared by the relayd server and client.
//!
//! Everything on the wire is a newline-terminated UTF-8 line. The first line a
//! client sends is the `#login <id>` handshake; every other line is chat. Lines
//! typed at a local console that start with `#` are control commands and are
//! never sent over the wire.
//!
//! ## Quick Start
//!
//! ```rust
//! use relay_proto::{WireMessage, ServerCommand};
//!
//! assert_eq!(
//!     WireMessage::parse("#login alice"),
//!     WireMessage::Login("alice".to_string())
//! );
//! assert_eq!(relay_proto::chat_line("alice", "hello"), "alice> hello");
//! assert_eq!(ServerCommand::parse("#setport 6000"), Ok(ServerCommand::SetPort(6000)));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;

pub use self::command::{is_command, parse_port, ClientCommand, CommandError, ServerCommand};
pub use self::error::ProtocolError;
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, DEFAULT_MAX_LINE_LEN};
pub use self::message::{
    chat_line, check_line, logged_on, login_line, server_notice, WireMessage, LOGIN_KEYWORD, SERVER_PREFIX,
};

/// Port used by both sides when nothing else is configured.
pub const DEFAULT_PORT: u16 = 5555;
