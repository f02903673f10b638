//! Unified error handling for relayd.
//!
//! This module provides the error hierarchy for the relay: session
//! violations raised while handling inbound lines, transport failures, and
//! operator-visible control errors. Each carries a static code for metric
//! labels.

use crate::state::ConnId;
use relay_proto::{CommandError, ProtocolError};
use thiserror::Error;

// ============================================================================
// Registry Errors
// ============================================================================

/// Connection registry failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("already logged in as {0}")]
    AlreadyAuthenticated(String),

    #[error("login id {0} is already in use")]
    LoginInUse(String),

    #[error("no login id specified")]
    EmptyLogin,

    #[error("connection is closing")]
    SessionClosed,

    #[error("connection {0} is not registered")]
    NotFound(ConnId),
}

impl RegistryError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyAuthenticated(_) => "already_authenticated",
            Self::LoginInUse(_) => "login_in_use",
            Self::EmptyLogin => "empty_login",
            Self::SessionClosed => "session_closed",
            Self::NotFound(_) => "not_found",
        }
    }
}

// ============================================================================
// Handler Errors (inbound line processing)
// ============================================================================

/// Protocol violations detected while handling a line from a client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("message before login")]
    NotLoggedIn,

    #[error("login id does not fit on one line")]
    LoginTooLong,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotLoggedIn => "not_logged_in",
            Self::LoginTooLong => "login_too_long",
            Self::Registry(e) => e.error_code(),
        }
    }

    /// Text of the single notice sent to the offending client.
    ///
    /// Returns `None` when the connection is already gone and nobody is left
    /// to tell.
    pub fn notice(&self) -> Option<String> {
        let text = match self {
            Self::NotLoggedIn => "Error: Please log in before sending messages.".to_string(),
            Self::LoginTooLong => "Error: Login ID is too long.".to_string(),
            Self::Registry(RegistryError::AlreadyAuthenticated(id)) => {
                format!("Error: Already logged in as {id}.")
            }
            Self::Registry(RegistryError::LoginInUse(id)) => {
                format!("Error: Login ID {id} is already in use.")
            }
            Self::Registry(RegistryError::EmptyLogin) => "Error: No login ID specified.".to_string(),
            Self::Registry(RegistryError::SessionClosed | RegistryError::NotFound(_)) => {
                return None;
            }
        };
        Some(relay_proto::server_notice(&text))
    }
}

/// Result type for inbound line handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Transport Errors
// ============================================================================

/// Socket-level failures surfaced by the gateway and the client link.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot listen on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("outbound queue full for connection {0}")]
    QueueFull(ConnId),

    #[error("connection {0} is closed")]
    Closed(ConnId),

    #[error("not connected")]
    NotConnected,

    #[error(transparent)]
    Line(#[from] ProtocolError),

    #[error("worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl TransportError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Bind { .. } => "bind",
            Self::Connect { .. } => "connect",
            Self::QueueFull(_) => "queue_full",
            Self::Closed(_) => "closed",
            Self::NotConnected => "not_connected",
            Self::Line(e) => e.error_code(),
            Self::Task(_) => "task",
        }
    }
}

// ============================================================================
// Control Errors (console commands)
// ============================================================================

/// Errors reported to the local console. None of them change runtime state.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Server is not listening.")]
    NotListening,

    #[error("Server is already listening.")]
    AlreadyListening,

    #[error("Cannot set a new port while the server is listening.")]
    PortWhileListening,

    #[error("Client is not connected.")]
    NotConnected,

    #[error("Client is already connected.")]
    AlreadyConnected,

    #[error("Must log off before setting {0}.")]
    MustLogOff(&'static str),

    #[error("Server cannot start: {0}")]
    Listen(#[source] TransportError),

    #[error("Could not connect to server: {0}")]
    Connect(#[source] TransportError),

    #[error("Could not stop listening: {0}")]
    Stop(#[source] TransportError),

    #[error("Could not close server: {0}")]
    Close(#[source] TransportError),

    #[error("Could not disconnect: {0}")]
    Disconnect(#[source] TransportError),

    #[error("Could not send message to server.")]
    Send(#[source] TransportError),

    #[error("Message not relayed: {0}")]
    Relay(#[source] ProtocolError),
}

impl ControlError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Command(e) => e.error_code(),
            Self::NotListening => "not_listening",
            Self::AlreadyListening => "already_listening",
            Self::PortWhileListening => "port_while_listening",
            Self::NotConnected => "not_connected",
            Self::AlreadyConnected => "already_connected",
            Self::MustLogOff(_) => "must_log_off",
            Self::Listen(_) => "listen_failed",
            Self::Connect(_) => "connect_failed",
            Self::Stop(_) => "stop_failed",
            Self::Close(_) => "close_failed",
            Self::Disconnect(_) => "disconnect_failed",
            Self::Send(_) => "send_failed",
            Self::Relay(e) => e.error_code(),
        }
    }

    /// Line shown on the console.
    pub fn to_display(&self) -> String {
        format!("Error: {self}")
    }
}
