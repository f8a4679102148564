//! TCP listener setup.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Report the specific setup stage that failed (open, set-option, bind,
//!   listen) so startup logs point at the real problem
//!
//! Bind failure is returned to the caller, not treated as fatal here; the
//! process decides whether it can continue.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket};

/// Error type for listener setup, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("invalid listen address '{address}': {source}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },
    #[error("failed to open socket: {0}")]
    Open(std::io::Error),
    #[error("failed to set option (reuse address): {0}")]
    SetOption(std::io::Error),
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: std::io::Error,
    },
    #[error("failed to start listening: {0}")]
    Listen(std::io::Error),
}

/// Backlog passed to listen(2).
const LISTEN_BACKLOG: u32 = 1024;

/// Bind the acceptor socket, reporting the failed stage on error.
pub fn bind(address: &str) -> Result<TcpListener, ListenerError> {
    let addr: SocketAddr = address.parse().map_err(|source| ListenerError::Address {
        address: address.to_string(),
        source,
    })?;

    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4(),
        SocketAddr::V6(_) => TcpSocket::new_v6(),
    }
    .map_err(ListenerError::Open)?;

    socket.set_reuseaddr(true).map_err(ListenerError::SetOption)?;
    socket
        .bind(addr)
        .map_err(|source| ListenerError::Bind { address: addr, source })?;

    let listener = socket.listen(LISTEN_BACKLOG).map_err(ListenerError::Listen)?;

    tracing::info!(address = %addr, "listener bound");
    Ok(listener)
}
