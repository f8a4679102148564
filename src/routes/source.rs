//! Routing-table snapshot source.
//!
//! # Responsibilities
//! - Define the collaborator seam the poller reads snapshots through
//! - Provide the production reader backed by `/proc/net/route`
//!
//! The source is constructor-injected wherever it is needed; tests swap in a
//! scripted implementation instead of touching the OS.

use std::fmt::Debug;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::table::RouteEntry;

/// Error type for snapshot acquisition.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read routing table: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed routing table line: {0}")]
    Malformed(String),
}

/// Something that can read the current routing table.
///
/// `current` may block briefly (it performs an OS query); the poller calls it
/// off the async workers. Failure must leave the caller free to retry on the
/// next tick.
pub trait RouteSource: Send + Sync + Debug {
    fn current(&self) -> Result<Vec<RouteEntry>, SourceError>;
}

/// Production source reading `/proc/net/route`.
///
/// The kernel exposes destination, gateway and mask as little-endian hex
/// words and the device as an interface name; the name is resolved to an
/// index through `/sys/class/net/<name>/ifindex`.
#[derive(Debug)]
pub struct ProcRouteSource {
    route_path: PathBuf,
    ifindex_root: PathBuf,
}

impl ProcRouteSource {
    pub fn new() -> Self {
        Self {
            route_path: PathBuf::from("/proc/net/route"),
            ifindex_root: PathBuf::from("/sys/class/net"),
        }
    }

    /// Read from alternate locations, for tests exercising the parser.
    pub fn with_paths(route_path: impl Into<PathBuf>, ifindex_root: impl Into<PathBuf>) -> Self {
        Self {
            route_path: route_path.into(),
            ifindex_root: ifindex_root.into(),
        }
    }

    fn interface_index(&self, name: &str) -> u32 {
        let path = self.ifindex_root.join(name).join("ifindex");
        read_index(&path).unwrap_or(0)
    }
}

impl Default for ProcRouteSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteSource for ProcRouteSource {
    fn current(&self) -> Result<Vec<RouteEntry>, SourceError> {
        let content = fs::read_to_string(&self.route_path)?;
        let mut entries = Vec::new();

        // First line is the column header.
        for line in content.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            // Iface Destination Gateway Flags RefCnt Use Metric Mask ...
            if fields.len() < 8 {
                return Err(SourceError::Malformed(line.to_string()));
            }

            let iface = fields[0];
            let destination = parse_hex_addr(fields[1])
                .ok_or_else(|| SourceError::Malformed(line.to_string()))?;
            let gateway = parse_hex_addr(fields[2])
                .ok_or_else(|| SourceError::Malformed(line.to_string()))?;
            let metric: u32 = fields[6]
                .parse()
                .map_err(|_| SourceError::Malformed(line.to_string()))?;
            let mask = parse_hex_addr(fields[7])
                .ok_or_else(|| SourceError::Malformed(line.to_string()))?;

            entries.push(RouteEntry::new(
                destination.to_string(),
                mask.to_string(),
                self.interface_index(iface),
                gateway.to_string(),
                metric,
            ));
        }

        Ok(entries)
    }
}

fn read_index(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// `/proc/net/route` encodes IPv4 addresses as little-endian hex words.
fn parse_hex_addr(field: &str) -> Option<Ipv4Addr> {
    let raw = u32::from_str_radix(field, 16).ok()?;
    Some(Ipv4Addr::from(raw.to_be()))
}
