use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Running counters for a relay
#[derive(Debug, Default)]
pub struct RelayStats {
    received: AtomicU64,
    decode_errors: AtomicU64,
    unresolved: AtomicU64,
    enqueued: AtomicU64,
    dropped: AtomicU64,
    forwarded: AtomicU64,
    forward_errors: AtomicU64,
    loops_detected: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStatsSnapshot {
    pub received: u64,
    pub decode_errors: u64,
    pub unresolved: u64,
    pub enqueued: u64,
    pub dropped: u64,
    pub forwarded: u64,
    pub forward_errors: u64,
    pub loops_detected: u64,
}

impl RelayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unresolved(&self) {
        self.unresolved.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_forward_error(&self) {
        self.forward_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_loop_detected(&self) {
        self.loops_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            forward_errors: self.forward_errors.load(Ordering::Relaxed),
            loops_detected: self.loops_detected.load(Ordering::Relaxed),
        }
    }
}
