//! Observability counters for the engine
//!
//! Tracks how much audience noise gets dropped (unknown aliases, unknown
//! contributors, inactive-session events) alongside processing and publish
//! volumes. Drops are expected behavior here, but their rates are the first
//! thing to look at when a board seems frozen.

use std::sync::atomic::{AtomicU64, Ordering};

/// Core metrics for the aggregation engine.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Events consumed from the source, regardless of outcome.
    pub events_processed: AtomicU64,
    /// Events discarded while the session was not active.
    pub events_dropped_inactive: AtomicU64,
    /// Scoring events referencing an unregistered contributor.
    pub events_dropped_unknown_contributor: AtomicU64,
    /// Comments whose text resolved to no team.
    pub comments_unresolved: AtomicU64,
    /// Coalesced snapshots published.
    pub snapshots_published: AtomicU64,
    /// Visual events published (burst + gift).
    pub visual_events_published: AtomicU64,
    /// Completed sessions.
    pub sessions_completed: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event_processed(&self) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_inactive(&self) {
        self.events_dropped_inactive.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_unknown_contributor(&self) {
        self.events_dropped_unknown_contributor
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_comment_unresolved(&self) {
        self.comments_unresolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_snapshot_published(&self) {
        self.snapshots_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_visual_event(&self) {
        self.visual_events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_completed(&self) {
        self.sessions_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshots_published(&self) -> u64 {
        self.snapshots_published.load(Ordering::Relaxed)
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed.load(Ordering::Relaxed)
    }
}
