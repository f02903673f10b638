//! Connection registry - every live connection and its session.
//!
//! # Thread Safety
//!
//! All operations are thread-safe via DashMap. Lock order is always
//! `entries` shard lock → `logins` shard lock; nothing takes them in the
//! other order, and no guard is held across an await point.

use crate::error::RegistryError;
use crate::network::ConnectionHandle;
use crate::state::{ConnId, Session, SessionState};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use tracing::debug;

struct Entry {
    handle: ConnectionHandle,
    session: Session,
}

/// Registry of live connections keyed by connection id.
pub struct ConnectionRegistry {
    entries: DashMap<ConnId, Entry>,
    /// Login id → holder, maintained only when `unique_logins` is set.
    logins: DashMap<String, ConnId>,
    unique_logins: bool,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ConnectionRegistry {
    /// Create an empty registry.
    ///
    /// With `unique_logins`, a login id held by another live session is
    /// rejected with [`RegistryError::LoginInUse`].
    pub fn new(unique_logins: bool) -> Self {
        Self {
            entries: DashMap::new(),
            logins: DashMap::new(),
            unique_logins,
        }
    }

    /// Add a freshly accepted connection in `Unauthenticated` state.
    pub fn register(&self, handle: ConnectionHandle) {
        let id = handle.id();
        self.entries.insert(
            id,
            Entry {
                handle,
                session: Session::new(),
            },
        );
        debug!(conn_id = id, "Connection registered");
    }

    /// Remove a connection. Removing an absent id is a no-op.
    pub fn unregister(&self, id: ConnId) -> Option<Session> {
        let (_, entry) = self.entries.remove(&id)?;
        if self.unique_logins {
            if let Some(login_id) = entry.session.login_id() {
                self.logins.remove_if(login_id, |_, holder| *holder == id);
            }
        }
        debug!(conn_id = id, "Connection unregistered");
        Some(entry.session)
    }

    /// Authenticate a connection. Returns the stored (trimmed) login id.
    pub fn set_login(&self, id: ConnId, login_id: &str) -> Result<String, RegistryError> {
        let mut entry = self.entries.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        let login_id = login_id.trim();

        let reserve = self.unique_logins
            && entry.session.state() == SessionState::Unauthenticated
            && !login_id.is_empty();
        if reserve {
            match self.logins.entry(login_id.to_string()) {
                MapEntry::Occupied(_) => {
                    return Err(RegistryError::LoginInUse(login_id.to_string()));
                }
                MapEntry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        if let Err(e) = entry.session.authenticate(login_id) {
            if reserve {
                self.logins.remove_if(login_id, |_, holder| *holder == id);
            }
            return Err(e);
        }
        Ok(login_id.to_string())
    }

    /// Current session of a connection; absent connections read as closed.
    pub fn get(&self, id: ConnId) -> Session {
        self.entries
            .get(&id)
            .map(|entry| entry.session.clone())
            .unwrap_or_else(Session::closed)
    }

    /// Move a connection to `Closed` ahead of its disconnect so it stops
    /// receiving broadcasts. Returns the session as it was before.
    pub fn mark_closed(&self, id: ConnId) -> Option<Session> {
        let mut entry = self.entries.get_mut(&id)?;
        let before = entry.session.clone();
        entry.session.close();
        debug!(conn_id = id, from = before.state().as_str(), "Session closed");
        Some(before)
    }

    /// Point-in-time view of every authenticated connection.
    pub fn authenticated(&self) -> Vec<(ConnectionHandle, String)> {
        self.entries
            .iter()
            .filter(|entry| entry.session.is_authenticated())
            .filter_map(|entry| {
                let login_id = entry.session.login_id()?.to_string();
                Some((entry.handle.clone(), login_id))
            })
            .collect()
    }

    /// Apply `f` to each authenticated connection of a snapshot.
    ///
    /// The snapshot is taken first, so `f` runs without any registry lock
    /// held and may call back into the registry.
    pub fn for_each_authenticated<F>(&self, mut f: F)
    where
        F: FnMut(&ConnectionHandle, &str),
    {
        for (handle, login_id) in self.authenticated() {
            f(&handle, &login_id);
        }
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of authenticated connections.
    pub fn authenticated_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.session.is_authenticated())
            .count()
    }
}
