//! Commands accepted by the client's user console.

use super::{parse_port, tokenize, CommandError};

/// User console commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// `#quit` - close the connection and terminate.
    Quit,
    /// `#logoff` - close the connection but keep running.
    Logoff,
    /// `#sethost <host>` - change the server host (only while disconnected).
    SetHost(String),
    /// `#setport <port>` - change the server port (only while disconnected).
    SetPort(u16),
    /// `#login` - connect to the configured host and port.
    Login,
    /// `#gethost` - show the configured host.
    GetHost,
    /// `#getport` - show the configured port.
    GetPort,
}

impl ClientCommand {
    /// Parse a console line that starts with `#`.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let (keyword, args) = tokenize(line);
        let bare = args.is_empty();

        let command = match keyword {
            "#quit" if bare => Self::Quit,
            "#logoff" if bare => Self::Logoff,
            "#login" if bare => Self::Login,
            "#gethost" if bare => Self::GetHost,
            "#getport" if bare => Self::GetPort,
            "#sethost" => match args.first() {
                Some(host) => Self::SetHost((*host).to_string()),
                None => return Err(CommandError::NoHostSpecified),
            },
            "#setport" => Self::SetPort(parse_port(args.first().copied())?),
            _ => return Err(CommandError::Unrecognized(line.trim().to_string())),
        };
        Ok(command)
    }

    /// Command keyword, used as a metrics label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::Logoff => "logoff",
            Self::SetHost(_) => "sethost",
            Self::SetPort(_) => "setport",
            Self::Login => "login",
            Self::GetHost => "gethost",
            Self::GetPort => "getport",
        }
    }
}
