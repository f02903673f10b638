//! Commands accepted by the server's operator console.

use super::{parse_port, tokenize, CommandError};

/// Operator console commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCommand {
    /// `#quit` - disconnect everyone and terminate.
    Quit,
    /// `#stop` - stop accepting new connections.
    Stop,
    /// `#close` - stop listening and disconnect every client.
    Close,
    /// `#setport <port>` - change the listen port (only while stopped).
    SetPort(u16),
    /// `#start` - resume listening.
    Start,
    /// `#getport` - show the configured port.
    GetPort,
}

impl ServerCommand {
    /// Parse a console line that starts with `#`.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let (keyword, args) = tokenize(line);
        let bare = args.is_empty();

        let command = match keyword {
            "#quit" if bare => Self::Quit,
            "#stop" if bare => Self::Stop,
            "#close" if bare => Self::Close,
            "#start" if bare => Self::Start,
            "#getport" if bare => Self::GetPort,
            "#setport" => Self::SetPort(parse_port(args.first().copied())?),
            _ => return Err(CommandError::Unrecognized(line.trim().to_string())),
        };
        Ok(command)
    }

    /// Command keyword, used as a metrics label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::Stop => "stop",
            Self::Close => "close",
            Self::SetPort(_) => "setport",
            Self::Start => "start",
            Self::GetPort => "getport",
        }
    }
}
