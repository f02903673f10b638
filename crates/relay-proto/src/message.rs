//! Wire messages and the fixed line formats the relay produces.

use std::fmt;

use crate::error::{ProtocolError, Result};

/// First token of the login handshake.
pub const LOGIN_KEYWORD: &str = "#login";

/// Prefix for server-originated informational lines.
pub const SERVER_PREFIX: &str = "SERVER MSG> ";

/// A line received from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireMessage {
    /// `#login <id>`. The id is trimmed and may be empty.
    Login(String),
    /// Any other line, carried verbatim.
    Chat(String),
}

impl WireMessage {
    /// Classify a decoded line.
    ///
    /// Only a line whose first token is exactly `#login` is a handshake;
    /// `#loginx` or `#Login` are ordinary chat.
    pub fn parse(line: &str) -> Self {
        if let Some(rest) = line.strip_prefix(LOGIN_KEYWORD) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Self::Login(rest.trim().to_string());
            }
        }
        Self::Chat(line.to_string())
    }

    /// Whether this is the login handshake.
    pub fn is_login(&self) -> bool {
        matches!(self, Self::Login(_))
    }
}

impl fmt::Display for WireMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login(id) if id.is_empty() => f.write_str(LOGIN_KEYWORD),
            Self::Login(id) => write!(f, "{LOGIN_KEYWORD} {id}"),
            Self::Chat(text) => f.write_str(text),
        }
    }
}

/// `#login <id>`, sent by a client right after connecting.
pub fn login_line(login_id: &str) -> String {
    WireMessage::Login(login_id.to_string()).to_string()
}

/// `SERVER MSG> <text>`.
pub fn server_notice(text: &str) -> String {
    format!("{SERVER_PREFIX}{text}")
}

/// `<id>> <text>`, the relayed form of a chat line.
pub fn chat_line(login_id: &str, text: &str) -> String {
    format!("{login_id}> {text}")
}

/// Check that `line` can be written as a single wire line of at most
/// `max_len` bytes, terminator included.
pub fn check_line(line: &str, max_len: usize) -> Result<()> {
    if line.contains(['\r', '\n']) {
        return Err(ProtocolError::EmbeddedNewline);
    }
    if line.len() + 1 > max_len {
        return Err(ProtocolError::LineTooLong {
            actual: line.len() + 1,
            limit: max_len,
        });
    }
    Ok(())
}

/// `<id> has logged on.`
pub fn logged_on(login_id: &str) -> String {
    format!("{login_id} has logged on.")
}
