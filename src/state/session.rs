//! Authentication lifecycle of one connection.
//!
//! ```text
//! ┌─────────────────┐  #login <id>  ┌───────────────┐
//! │ Unauthenticated ├──────────────►│ Authenticated │
//! └────────┬────────┘               └───────┬───────┘
//!          │   disconnect / forced close    │
//!          └──────────────┬─────────────────┘
//!                         ▼
//!                    ┌────────┐
//!                    │ Closed │
//!                    └────────┘
//! ```
//!
//! There is no way back from `Authenticated` to `Unauthenticated`, and
//! `Closed` is terminal.

use crate::error::RegistryError;

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Accepted, no login yet. Nothing it sends is relayed.
    Unauthenticated,
    /// Logged in; receives and originates broadcasts.
    Authenticated,
    /// Disconnected or being force-closed.
    Closed,
}

impl SessionState {
    /// Lower-case name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated => "authenticated",
            Self::Closed => "closed",
        }
    }
}

/// Per-connection metadata held by the registry.
///
/// Invariant: `state == Authenticated` implies a non-empty `login_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    login_id: Option<String>,
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A freshly accepted connection.
    pub fn new() -> Self {
        Self {
            login_id: None,
            state: SessionState::Unauthenticated,
        }
    }

    /// What an absent connection reads as.
    pub fn closed() -> Self {
        Self {
            login_id: None,
            state: SessionState::Closed,
        }
    }

    pub fn login_id(&self) -> Option<&str> {
        self.login_id.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Transition `Unauthenticated -> Authenticated`.
    ///
    /// A second login is rejected and leaves the session untouched.
    pub fn authenticate(&mut self, login_id: &str) -> Result<(), RegistryError> {
        match self.state {
            SessionState::Unauthenticated => {}
            SessionState::Authenticated => {
                return Err(RegistryError::AlreadyAuthenticated(
                    self.login_id.clone().unwrap_or_default(),
                ));
            }
            SessionState::Closed => return Err(RegistryError::SessionClosed),
        }

        let login_id = login_id.trim();
        if login_id.is_empty() {
            return Err(RegistryError::EmptyLogin);
        }

        self.login_id = Some(login_id.to_string());
        self.state = SessionState::Authenticated;
        Ok(())
    }

    /// Move to `Closed`. Idempotent; the login id is kept for logging.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}
