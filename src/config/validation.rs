//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones. Returns all validation
//! errors, not just the first; runs before a config is accepted into the
//! system.

use std::fmt;

use crate::config::schema::WatchConfig;

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    ZeroPollInterval,
    ZeroReadTimeout,
    UnknownLogLevel(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address '{addr}' is not a valid socket address")
            }
            ValidationError::ZeroPollInterval => write!(f, "poller.interval_ms must be greater than 0"),
            ValidationError::ZeroReadTimeout => write!(f, "timeouts.read_secs must be greater than 0"),
            ValidationError::UnknownLogLevel(level) => {
                write!(f, "observability.log_level '{level}' is not a known level")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &WatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.poller.interval_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::ZeroReadTimeout);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
