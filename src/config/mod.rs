//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, ClientConfig)
//! - [`limits`]: Per-connection limits (LimitsConfig)
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup validation

mod defaults;
mod limits;
mod types;
mod validation;

pub use limits::LimitsConfig;
pub use types::{ClientConfig, Config, ConfigError, ServerConfig};
pub use validation::{ValidationError, validate};

/// Environment variable naming the server's config file.
pub const CONFIG_ENV: &str = "RELAYD_CONFIG";
