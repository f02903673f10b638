//! Console control commands.
//!
//! A console line starting with `#` is a control command for the local side
//! and is never forwarded to the peer. Argument-less commands must make up the
//! whole (trimmed) line; commands with arguments match on their first token
//! and read their arguments from the whitespace-separated remainder.

mod client;
mod server;

pub use client::ClientCommand;
pub use server::ServerCommand;

use thiserror::Error;

/// Leading character of every console command.
pub const COMMAND_PREFIX: char = '#';

/// Reasons a console line could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// `#setport` without an argument.
    #[error("No port specified.")]
    NoPortSpecified,

    /// `#setport` argument outside `0..=65535` or not a number.
    #[error("Invalid port number: {0}")]
    InvalidPort(String),

    /// `#sethost` without an argument.
    #[error("No host specified.")]
    NoHostSpecified,

    /// Unknown keyword, or arguments given to an argument-less command.
    #[error("Command not recognized: {0}")]
    Unrecognized(String),
}

impl CommandError {
    /// Static label for metrics and structured logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoPortSpecified => "no_port_specified",
            Self::InvalidPort(_) => "invalid_port",
            Self::NoHostSpecified => "no_host_specified",
            Self::Unrecognized(_) => "unrecognized",
        }
    }
}

/// Whether a console line is a control command rather than chat.
#[inline]
pub fn is_command(line: &str) -> bool {
    line.starts_with(COMMAND_PREFIX)
}

/// Parse a `#setport` argument. Any value in `0..=65535` is accepted.
pub fn parse_port(arg: Option<&str>) -> Result<u16, CommandError> {
    let arg = arg.ok_or(CommandError::NoPortSpecified)?;
    arg.parse::<u16>()
        .map_err(|_| CommandError::InvalidPort(arg.to_string()))
}

/// Split a console line into its keyword and arguments.
pub(crate) fn tokenize(line: &str) -> (&str, Vec<&str>) {
    let mut tokens = line.split_whitespace();
    let keyword = tokens.next().unwrap_or_default();
    (keyword, tokens.collect())
}
