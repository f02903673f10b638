//! Core configuration types and loading.

use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;
use thiserror::Error;

use super::defaults::{default_bind, default_host, default_port};
use super::limits::LimitsConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Relay configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server side settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Client side settings.
    #[serde(default)]
    pub client: ClientConfig,
    /// Per-connection limits, shared by both sides.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` when one is given, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Server side settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on (default: 5555). Port 0 picks an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Address to bind (default: 0.0.0.0).
    #[serde(default = "default_bind")]
    pub bind: IpAddr,
    /// Reject a login id that another live session already holds.
    #[serde(default)]
    pub unique_logins: bool,
    /// Prometheus endpoint port. 0 disables the endpoint.
    #[serde(default)]
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            unique_logins: false,
            metrics_port: 0,
        }
    }
}

/// Client side settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Server host (default: localhost).
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (default: 5555).
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
