//! Server: acceptor loop and connection registry.
//!
//! # Responsibilities
//! - Accept incoming streams and spawn a connection state machine for each
//! - Own the registry of live connections; insert on accept, remove when a
//!   connection deregisters itself
//! - Force-close every live connection on shutdown
//!
//! The registry is the only state touched from more than one task (the
//! accept path inserts, each connection's close path removes); entries are
//! guarded by the map's internal locks, which are never held across an
//! await.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, watch};

use crate::http::router::RequestRouter;
use crate::net::connection::{Connection, ConnectionId};
use crate::net::listener::{self, ListenerError};

/// Registry entry for one live connection.
struct ConnectionHandle {
    peer: SocketAddr,
    /// Signals the connection task to shut down.
    close_signal: watch::Sender<bool>,
}

pub struct Server {
    registry: DashMap<u64, ConnectionHandle>,
    router: Arc<RequestRouter>,
    read_timeout: Duration,
}

impl Server {
    pub fn new(router: Arc<RequestRouter>, read_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            registry: DashMap::new(),
            router,
            read_timeout,
        })
    }

    /// Bind the acceptor. Must be called at most once per server; failure is
    /// reported to the caller with the setup stage that failed.
    pub fn open(&self, address: &str) -> Result<TcpListener, ListenerError> {
        listener::bind(address).map_err(|error| {
            tracing::error!(%error, "failed to open acceptor");
            error
        })
    }

    /// Accept loop. Re-arms after every accept; ends only on the shutdown
    /// signal, which also force-closes every live connection.
    pub async fn run(self: Arc<Self>, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("now accepting requests");

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_connection(stream, peer),
                    Err(error) => {
                        tracing::warn!(%error, "accept failed, continuing");
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("server received shutdown signal");
                    self.close_all();
                    break;
                }
            }
        }
    }

    fn spawn_connection(self: &Arc<Self>, stream: TcpStream, peer: SocketAddr) {
        let connection = Connection::new(
            stream,
            Arc::clone(&self.router),
            Arc::downgrade(self),
            self.read_timeout,
        );
        let id = connection.id();

        let (close_tx, close_rx) = watch::channel(false);
        self.registry.insert(
            id.as_u64(),
            ConnectionHandle {
                peer,
                close_signal: close_tx,
            },
        );

        tracing::info!(
            connection_id = %id,
            peer = %peer,
            active = self.registry.len(),
            "accepted connection"
        );

        tokio::spawn(connection.run(close_rx));
    }

    /// Remove one connection from the registry. A missing id indicates a
    /// double close or a stale reference; it is reported, not fatal.
    pub fn close(&self, id: ConnectionId) {
        match self.registry.remove(&id.as_u64()) {
            Some((_, handle)) => {
                tracing::info!(connection_id = %id, peer = %handle.peer, "terminating connection");
            }
            None => {
                tracing::warn!(connection_id = %id, "failed to find connection");
            }
        }
    }

    /// Signal every live connection to shut down. Each connection
    /// deregisters itself as it observes the signal.
    pub fn close_all(&self) {
        tracing::info!(active = self.registry.len(), "closing all connections");
        for entry in self.registry.iter() {
            let _ = entry.close_signal.send(true);
        }
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }
}
