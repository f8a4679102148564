//! Routing-table value types.
//!
//! A [`RouteTable`] is a frozen read of the OS routing table at one poll
//! instant. Entries are plain values; nothing here touches the OS.

use serde::{Deserialize, Serialize};

/// Identity of a route across snapshots.
///
/// Two records describe "the same route" iff destination, mask and interface
/// index are all equal. Gateway and metric are mutable attributes of a route,
/// not part of its identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteKey {
    /// Destination network address, dotted quad (e.g. "10.0.0.0").
    pub destination: String,
    /// Subnet mask, dotted quad (e.g. "255.0.0.0").
    pub mask: String,
    /// OS interface index the route egresses through.
    pub interface_index: u32,
}

impl RouteKey {
    pub fn new(destination: impl Into<String>, mask: impl Into<String>, interface_index: u32) -> Self {
        Self {
            destination: destination.into(),
            mask: mask.into(),
            interface_index,
        }
    }
}

/// One row of the routing table at poll time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub key: RouteKey,
    /// Next-hop gateway, dotted quad ("0.0.0.0" for on-link routes).
    pub gateway: String,
    /// Route preference metric, lower wins.
    pub metric: u32,
}

impl RouteEntry {
    pub fn new(
        destination: impl Into<String>,
        mask: impl Into<String>,
        interface_index: u32,
        gateway: impl Into<String>,
        metric: u32,
    ) -> Self {
        Self {
            key: RouteKey::new(destination, mask, interface_index),
            gateway: gateway.into(),
            metric,
        }
    }
}

/// An ordered snapshot of the whole routing table.
///
/// The OS should never hand back two rows with the same [`RouteKey`]; the
/// diff engine tolerates accidental duplicates by treating the first match
/// as canonical, so no deduplication happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<RouteEntry>> for RouteTable {
    fn from(entries: Vec<RouteEntry>) -> Self {
        Self::new(entries)
    }
}
