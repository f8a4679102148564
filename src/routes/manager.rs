//! Route manager: the poll-diff-publish tick cycle.
//!
//! # Responsibilities
//! - Periodically acquire a routing-table snapshot from the source
//! - Diff it against the retained snapshot and classify every route
//! - Publish classified events on the notification bus
//! - Expose the latest snapshot to readers through an atomic swap
//!
//! Ticks are serialized: a tick always runs to completion (or source
//! failure) before the next is scheduled. A failed acquisition skips the
//! tick and leaves the retained snapshot authoritative.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::broadcast;
use tokio::time;

use crate::bus::RouteEventBus;
use crate::routes::diff::diff;
use crate::routes::source::RouteSource;
use crate::routes::table::RouteTable;

pub struct RouteManager {
    source: Arc<dyn RouteSource>,
    bus: Arc<RouteEventBus>,
    /// Latest snapshot, readable from other tasks. Swapped wholesale after
    /// every successful tick, never patched in place.
    published: Arc<ArcSwap<RouteTable>>,
    /// Working baseline, owned exclusively by the tick cycle.
    retained: RouteTable,
    interval: Duration,
}

impl RouteManager {
    pub fn new(source: Arc<dyn RouteSource>, bus: Arc<RouteEventBus>, interval: Duration) -> Self {
        Self {
            source,
            bus,
            published: Arc::new(ArcSwap::from_pointee(RouteTable::default())),
            retained: RouteTable::default(),
            interval,
        }
    }

    /// Handle for read-only access to the latest snapshot.
    pub fn published(&self) -> Arc<ArcSwap<RouteTable>> {
        Arc::clone(&self.published)
    }

    /// Drive the tick cycle until the shutdown signal fires.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "route poller starting");
        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("route poller received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One poll-diff-publish cycle.
    ///
    /// The cold-start tick (empty retained snapshot) reports every current
    /// route as added; downstream observers must treat that as "initialize
    /// from scratch".
    pub async fn tick(&mut self) {
        let source = Arc::clone(&self.source);
        // The OS query may block briefly; keep it off the async workers.
        let acquired = tokio::task::spawn_blocking(move || source.current()).await;

        let snapshot = match acquired {
            Ok(Ok(entries)) => RouteTable::new(entries),
            Ok(Err(error)) => {
                tracing::warn!(%error, "failed to read routing table, skipping tick");
                return;
            }
            Err(error) => {
                tracing::warn!(%error, "snapshot task failed, skipping tick");
                return;
            }
        };

        let result = diff(&self.retained, &snapshot);

        for entry in &result.added {
            tracing::info!(
                destination = %entry.key.destination,
                mask = %entry.key.mask,
                gateway = %entry.gateway,
                interface = entry.key.interface_index,
                metric = entry.metric,
                "route_added"
            );
            self.bus.publish_added(entry);
        }

        for change in &result.changed {
            if change.gateway_changed {
                tracing::info!(
                    destination = %change.current.key.destination,
                    mask = %change.current.key.mask,
                    previous = %change.previous.gateway,
                    current = %change.current.gateway,
                    "route_changed: gateway"
                );
            }
            if change.metric_changed {
                tracing::info!(
                    destination = %change.current.key.destination,
                    mask = %change.current.key.mask,
                    previous = change.previous.metric,
                    current = change.current.metric,
                    "route_changed: metric"
                );
            }
            self.bus.publish_changed(change);
        }

        for entry in &result.removed {
            tracing::info!(
                destination = %entry.key.destination,
                mask = %entry.key.mask,
                gateway = %entry.gateway,
                interface = entry.key.interface_index,
                metric = entry.metric,
                "route_removed"
            );
            self.bus.publish_removed(entry);
        }

        // The new snapshot becomes the baseline even when nothing changed.
        self.retained = snapshot.clone();
        self.published.store(Arc::new(snapshot));
    }
}
