//! Hub counters.
//!
//! Written only by the hub loop, read from anywhere.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct HubMetrics {
    joined: AtomicU64,
    rejected_joins: AtomicU64,
    left: AtomicU64,
    routed: AtomicU64,
    delivered: AtomicU64,
    dropped_unknown_room: AtomicU64,
    dropped_full: AtomicU64,
    evicted: AtomicU64,
    notifications: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubMetricsSnapshot {
    pub joined: u64,
    pub rejected_joins: u64,
    pub left: u64,
    pub routed: u64,
    pub delivered: u64,
    pub dropped_unknown_room: u64,
    pub dropped_full: u64,
    pub evicted: u64,
    pub notifications: u64,
}

fn add(counter: &AtomicU64, n: usize) {
    counter.fetch_add(n as u64, Ordering::Relaxed);
}

impl HubMetrics {
    pub(super) fn record_join(&self, accepted: bool) {
        if accepted {
            add(&self.joined, 1);
        } else {
            add(&self.rejected_joins, 1);
        }
    }

    pub(super) fn record_leave(&self) {
        add(&self.left, 1);
    }

    pub(super) fn record_route(&self, delivered: usize, dropped_full: usize, evicted: usize) {
        add(&self.routed, 1);
        add(&self.delivered, delivered);
        add(&self.dropped_full, dropped_full);
        add(&self.evicted, evicted);
    }

    pub(super) fn record_unknown_room(&self) {
        add(&self.routed, 1);
        add(&self.dropped_unknown_room, 1);
    }

    pub(super) fn record_notification(&self) {
        add(&self.notifications, 1);
    }

    pub fn snapshot(&self) -> HubMetricsSnapshot {
        HubMetricsSnapshot {
            joined: self.joined.load(Ordering::Relaxed),
            rejected_joins: self.rejected_joins.load(Ordering::Relaxed),
            left: self.left.load(Ordering::Relaxed),
            routed: self.routed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped_unknown_room: self.dropped_unknown_room.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
        }
    }
}
