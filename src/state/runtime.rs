//! Runtime controllers for each side of the relay.
//!
//! Passive holders of the mutable configuration. Reads are safe from any
//! task; writes are only issued by the command dispatchers after they have
//! checked the preconditions (no port change while listening, no host or
//! port change while connected).

use parking_lot::RwLock;

#[derive(Debug)]
struct ServerSettings {
    port: u16,
    listening: bool,
}

/// Server runtime controller.
#[derive(Debug)]
pub struct ServerRuntime {
    inner: RwLock<ServerSettings>,
}

impl ServerRuntime {
    pub fn new(port: u16) -> Self {
        Self {
            inner: RwLock::new(ServerSettings {
                port,
                listening: false,
            }),
        }
    }

    pub fn port(&self) -> u16 {
        self.inner.read().port
    }

    pub fn is_listening(&self) -> bool {
        self.inner.read().listening
    }

    pub fn set_port(&self, port: u16) {
        self.inner.write().port = port;
    }

    pub fn set_listening(&self, listening: bool) {
        self.inner.write().listening = listening;
    }
}

#[derive(Debug)]
struct ClientSettings {
    host: String,
    port: u16,
    connected: bool,
    login_id: String,
}

/// Client runtime controller.
#[derive(Debug)]
pub struct ClientRuntime {
    inner: RwLock<ClientSettings>,
}

impl ClientRuntime {
    pub fn new(login_id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            inner: RwLock::new(ClientSettings {
                host: host.into(),
                port,
                connected: false,
                login_id: login_id.into(),
            }),
        }
    }

    pub fn host(&self) -> String {
        self.inner.read().host.clone()
    }

    pub fn port(&self) -> u16 {
        self.inner.read().port
    }

    pub fn login_id(&self) -> String {
        self.inner.read().login_id.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.read().connected
    }

    pub fn set_host(&self, host: impl Into<String>) {
        self.inner.write().host = host.into();
    }

    pub fn set_port(&self, port: u16) {
        self.inner.write().port = port;
    }

    pub fn set_connected(&self, connected: bool) {
        self.inner.write().connected = connected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_runtime() {
        let runtime = ServerRuntime::new(5555);
        assert_eq!(runtime.port(), 5555);
        assert!(!runtime.is_listening());

        runtime.set_listening(true);
        runtime.set_port(9999);
        assert!(runtime.is_listening());
        assert_eq!(runtime.port(), 9999);
    }

    #[test]
    fn test_client_runtime() {
        let runtime = ClientRuntime::new("alice", "localhost", 5555);
        assert_eq!(runtime.login_id(), "alice");
        assert!(!runtime.is_connected());

        runtime.set_host("example.org");
        runtime.set_port(7000);
        runtime.set_connected(true);

        assert_eq!(runtime.host(), "example.org");
        assert_eq!(runtime.port(), 7000);
        assert!(runtime.is_connected());
    }
}
