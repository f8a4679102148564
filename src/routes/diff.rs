//! Snapshot diff engine.
//!
//! Compares two routing-table snapshots and classifies every route as added,
//! removed or changed. Pure in-memory comparison; it cannot fail and never
//! mutates its inputs.
//!
//! Matching is deliberately asymmetric and must stay that way:
//! - pass 1 (added/changed) matches on the full (destination, mask,
//!   interface index) key;
//! - pass 2 (removed) matches on destination and mask only.
//!
//! A route whose only change is its interface index is therefore reported as
//! added by pass 1 but never as removed by pass 2. See the pinning test at
//! the bottom of this file.

use super::table::{RouteEntry, RouteTable};

/// A route whose identity survived between snapshots but whose mutable
/// attributes differ. Carries both sides plus which fields moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChange {
    pub previous: RouteEntry,
    pub current: RouteEntry,
    pub gateway_changed: bool,
    pub metric_changed: bool,
}

/// Result of diffing two snapshots. The three sequences are disjoint;
/// unchanged routes are not reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDiff {
    pub added: Vec<RouteEntry>,
    pub removed: Vec<RouteEntry>,
    pub changed: Vec<RouteChange>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Classify every route in `current` against `previous`.
///
/// Snapshots are expected to hold tens of routes, so the O(n*m) linear scans
/// are fine; the first key match in a scan is canonical.
pub fn diff(previous: &RouteTable, current: &RouteTable) -> TableDiff {
    let mut result = TableDiff::default();

    // Pass 1: new or changed routes, keyed on the full identity.
    for curr in current.entries() {
        match previous.entries().iter().find(|prev| prev.key == curr.key) {
            None => result.added.push(curr.clone()),
            Some(prev) => {
                let gateway_changed = curr.gateway != prev.gateway;
                let metric_changed = curr.metric != prev.metric;
                if gateway_changed || metric_changed {
                    result.changed.push(RouteChange {
                        previous: prev.clone(),
                        current: curr.clone(),
                        gateway_changed,
                        metric_changed,
                    });
                }
            }
        }
    }

    // Pass 2: removed routes, keyed on destination + mask only. Interface
    // index is intentionally excluded here.
    for prev in previous.entries() {
        let still_present = current.entries().iter().any(|curr| {
            curr.key.destination == prev.key.destination && curr.key.mask == prev.key.mask
        });
        if !still_present {
            result.removed.push(prev.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::table::RouteEntry;

    fn table(entries: Vec<RouteEntry>) -> RouteTable {
        RouteTable::new(entries)
    }

    fn default_route() -> RouteEntry {
        RouteEntry::new("0.0.0.0", "0.0.0.0", 3, "192.168.0.1", 55)
    }

    fn loopback() -> RouteEntry {
        RouteEntry::new("127.0.0.0", "255.0.0.0", 1, "0.0.0.0", 331)
    }

    #[test]
    fn identical_snapshots_report_nothing() {
        let s = table(vec![default_route(), loopback()]);
        let d = diff(&s, &s);
        assert!(d.is_empty());
    }

    #[test]
    fn cold_start_reports_everything_as_added() {
        let s = table(vec![default_route(), loopback()]);
        let d = diff(&RouteTable::default(), &s);
        assert_eq!(d.added, s.entries().to_vec());
        assert!(d.removed.is_empty());
        assert!(d.changed.is_empty());
    }

    #[test]
    fn emptied_table_reports_everything_as_removed() {
        let s = table(vec![default_route(), loopback()]);
        let d = diff(&s, &RouteTable::default());
        assert_eq!(d.removed, s.entries().to_vec());
        assert!(d.added.is_empty());
        assert!(d.changed.is_empty());
    }

    #[test]
    fn gateway_change_is_reported_with_both_sides() {
        let prev = table(vec![default_route()]);
        let mut moved = default_route();
        moved.gateway = "192.168.0.254".to_string();
        let curr = table(vec![moved.clone()]);

        let d = diff(&prev, &curr);
        assert!(d.added.is_empty());
        assert!(d.removed.is_empty());
        assert_eq!(d.changed.len(), 1);
        let change = &d.changed[0];
        assert_eq!(change.previous, default_route());
        assert_eq!(change.current, moved);
        assert!(change.gateway_changed);
        assert!(!change.metric_changed);
    }

    #[test]
    fn metric_change_is_reported_independently() {
        let prev = table(vec![loopback()]);
        let mut bumped = loopback();
        bumped.metric = 50;
        let curr = table(vec![bumped]);

        let d = diff(&prev, &curr);
        assert_eq!(d.changed.len(), 1);
        assert!(!d.changed[0].gateway_changed);
        assert!(d.changed[0].metric_changed);
    }

    #[test]
    fn gateway_and_metric_can_change_together() {
        let prev = table(vec![default_route()]);
        let mut both = default_route();
        both.gateway = "10.0.0.1".to_string();
        both.metric = 1;
        let curr = table(vec![both]);

        let d = diff(&prev, &curr);
        assert_eq!(d.changed.len(), 1);
        assert!(d.changed[0].gateway_changed);
        assert!(d.changed[0].metric_changed);
    }

    // Pins the asymmetric matching: pass 1 keys on the full identity, so an
    // interface move shows up as added; pass 2 keys on destination + mask
    // only, so the old row still counts as present and is NOT removed.
    #[test]
    fn reports_interface_move_as_added_never_removed() {
        let prev = table(vec![default_route()]);
        let mut moved = default_route();
        moved.key.interface_index = 7;
        let curr = table(vec![moved.clone()]);

        let d = diff(&prev, &curr);
        assert_eq!(d.added, vec![moved]);
        assert!(d.removed.is_empty());
        assert!(d.changed.is_empty());
    }

    #[test]
    fn added_and_removed_are_keyed_correctly_in_mixed_diff() {
        let kept = loopback();
        let gone = RouteEntry::new("172.16.0.0", "255.240.0.0", 2, "10.0.0.1", 20);
        let new = RouteEntry::new("192.168.50.0", "255.255.255.0", 4, "0.0.0.0", 281);

        let prev = table(vec![kept.clone(), gone.clone()]);
        let curr = table(vec![kept, new.clone()]);

        let d = diff(&prev, &curr);
        assert_eq!(d.added, vec![new]);
        assert_eq!(d.removed, vec![gone]);
        assert!(d.changed.is_empty());
    }

    // The OS should never produce duplicate keys, but if it does the first
    // match wins on both sides of the comparison.
    #[test]
    fn duplicate_keys_use_first_match_as_canonical() {
        let canonical = default_route();
        let mut shadow = default_route();
        shadow.metric = 999;

        let prev = table(vec![canonical.clone(), shadow]);
        let curr = table(vec![canonical]);

        let d = diff(&prev, &curr);
        // The canonical row is unchanged; the shadow row's dest+mask still
        // exists in `curr`, so nothing is removed either.
        assert!(d.added.is_empty());
        assert!(d.removed.is_empty());
        assert!(d.changed.is_empty());
    }

    #[test]
    fn diff_does_not_mutate_inputs() {
        let prev = table(vec![default_route()]);
        let curr = table(vec![loopback()]);
        let prev_before = prev.clone();
        let curr_before = curr.clone();

        let _ = diff(&prev, &curr);
        assert_eq!(prev, prev_before);
        assert_eq!(curr, curr_before);
    }
}
