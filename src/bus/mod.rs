//! Route change notification bus.
//!
//! # Responsibilities
//! - Fan out classified diff results to registered observers
//! - Isolate observer failures from the poller and from each other
//!
//! Observers are plain synchronous handlers invoked on the poller's own
//! execution context; a handler that blocks, blocks the poller. Slow
//! consumers must hand work off themselves. Delivery order across observers
//! for one event is subscription order; there is no ordering guarantee
//! across different events.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::RwLock;

use crate::routes::diff::RouteChange;
use crate::routes::table::RouteEntry;

type EntryHandler = Box<dyn Fn(&RouteEntry) + Send + Sync>;
type ChangeHandler = Box<dyn Fn(&RouteChange) + Send + Sync>;

/// Typed publish/subscribe for the three route event kinds.
#[derive(Default)]
pub struct RouteEventBus {
    added: RwLock<Vec<EntryHandler>>,
    removed: RwLock<Vec<EntryHandler>>,
    changed: RwLock<Vec<ChangeHandler>>,
}

impl RouteEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_added(&self, handler: impl Fn(&RouteEntry) + Send + Sync + 'static) {
        self.added.write().unwrap().push(Box::new(handler));
    }

    pub fn subscribe_removed(&self, handler: impl Fn(&RouteEntry) + Send + Sync + 'static) {
        self.removed.write().unwrap().push(Box::new(handler));
    }

    pub fn subscribe_changed(&self, handler: impl Fn(&RouteChange) + Send + Sync + 'static) {
        self.changed.write().unwrap().push(Box::new(handler));
    }

    pub fn publish_added(&self, entry: &RouteEntry) {
        Self::dispatch("route_added", &self.added, entry);
    }

    pub fn publish_removed(&self, entry: &RouteEntry) {
        Self::dispatch("route_removed", &self.removed, entry);
    }

    pub fn publish_changed(&self, change: &RouteChange) {
        Self::dispatch("route_changed", &self.changed, change);
    }

    /// Invoke every handler in subscription order. A panicking handler is
    /// caught and logged; the remaining handlers still run.
    fn dispatch<T>(event: &str, handlers: &RwLock<Vec<Box<dyn Fn(&T) + Send + Sync>>>, payload: &T) {
        let handlers = handlers.read().unwrap();
        for (index, handler) in handlers.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| handler(payload))).is_err() {
                tracing::warn!(event, observer = index, "observer panicked, continuing with remaining observers");
            }
        }
    }
}

impl std::fmt::Debug for RouteEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEventBus")
            .field("added_observers", &self.added.read().unwrap().len())
            .field("removed_observers", &self.removed.read().unwrap().len())
            .field("changed_observers", &self.changed.read().unwrap().len())
            .finish()
    }
}
