//! Top-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::net::ListenerError;
use crate::routes::SourceError;

/// Errors that surface to the binary entry point. Everything else is
/// recovered locally (skipped ticks, per-connection teardown) and logged.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("listener error: {0}")]
    Listener(#[from] ListenerError),
    #[error("route source error: {0}")]
    Source(#[from] SourceError),
    #[error("signal handler error: {0}")]
    Signals(#[from] std::io::Error),
}
