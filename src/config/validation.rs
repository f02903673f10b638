//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Smallest line limit that still fits a login handshake and a notice.
const MIN_LINE_LEN: usize = 64;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("limits.max_line_len must be at least 64, got {0}")]
    LineLimitTooSmall(usize),
    #[error("limits.send_queue must be greater than 0")]
    EmptySendQueue,
    #[error("client.host must not be empty")]
    MissingClientHost,
    #[error("client.port must not be 0")]
    InvalidClientPort,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.limits.max_line_len < MIN_LINE_LEN {
        errors.push(ValidationError::LineLimitTooSmall(config.limits.max_line_len));
    }
    if config.limits.send_queue == 0 {
        errors.push(ValidationError::EmptySendQueue);
    }

    if config.client.host.trim().is_empty() {
        errors.push(ValidationError::MissingClientHost);
    }
    if config.client.port == 0 {
        errors.push(ValidationError::InvalidClientPort);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
