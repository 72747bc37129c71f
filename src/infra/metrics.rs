//! Lock-free metrics collection and periodic reporting
//!
//! Uses atomics for hot-path operations to avoid mutex contention.
//!
//! NOTE: All atomics use Relaxed ordering intentionally—these are statistical
//! counters only. Do NOT use these atomics for coordination or logic decisions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Lock-free metrics collector
///
/// All recording operations are lock-free using atomics.
/// The `report()` method atomically swaps the per-interval counters.
pub struct Metrics {
    /// Total controller events ever processed (monotonic)
    events_total: AtomicU64,
    /// Events since last report (reset on report)
    events_since_report: AtomicU64,
    /// Mode transitions performed (monotonic)
    transitions_total: AtomicU64,
    /// Fixes published on the fused stream (monotonic)
    fixes_emitted_total: AtomicU64,
    /// Acquisition timer expiries observed (monotonic)
    acquisition_timeouts_total: AtomicU64,
    /// Place entered/exited events emitted (monotonic)
    discovery_events_total: AtomicU64,
    /// Collaborator calls that returned an error (monotonic)
    collaborator_errors_total: AtomicU64,
    /// Time of last report
    last_report: parking_lot::Mutex<Instant>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            events_total: AtomicU64::new(0),
            events_since_report: AtomicU64::new(0),
            transitions_total: AtomicU64::new(0),
            fixes_emitted_total: AtomicU64::new(0),
            acquisition_timeouts_total: AtomicU64::new(0),
            discovery_events_total: AtomicU64::new(0),
            collaborator_errors_total: AtomicU64::new(0),
            last_report: parking_lot::Mutex::new(Instant::now()),
        }
    }

    #[inline]
    pub fn record_event_processed(&self) {
        self.events_total.fetch_add(1, Ordering::Relaxed);
        self.events_since_report.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_transition(&self) {
        self.transitions_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_fix_emitted(&self) {
        self.fixes_emitted_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_acquisition_timeout(&self) {
        self.acquisition_timeouts_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_discovery_event(&self) {
        self.discovery_events_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_collaborator_error(&self) {
        self.collaborator_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn events_total(&self) -> u64 {
        self.events_total.load(Ordering::Relaxed)
    }

    pub fn transitions_total(&self) -> u64 {
        self.transitions_total.load(Ordering::Relaxed)
    }

    pub fn fixes_emitted_total(&self) -> u64 {
        self.fixes_emitted_total.load(Ordering::Relaxed)
    }

    pub fn acquisition_timeouts_total(&self) -> u64 {
        self.acquisition_timeouts_total.load(Ordering::Relaxed)
    }

    pub fn discovery_events_total(&self) -> u64 {
        self.discovery_events_total.load(Ordering::Relaxed)
    }

    /// Log a metrics summary and reset the per-interval counters
    pub fn report(&self) {
        let since = self.events_since_report.swap(0, Ordering::Relaxed);

        let mut last = self.last_report.lock();
        let elapsed = last.elapsed().as_secs_f64();
        *last = Instant::now();
        drop(last);

        let events_per_sec = if elapsed > 0.0 { since as f64 / elapsed } else { 0.0 };

        info!(
            events_total = %self.events_total.load(Ordering::Relaxed),
            events_per_sec = %format!("{:.1}", events_per_sec),
            transitions = %self.transitions_total.load(Ordering::Relaxed),
            fixes_emitted = %self.fixes_emitted_total.load(Ordering::Relaxed),
            acquisition_timeouts = %self.acquisition_timeouts_total.load(Ordering::Relaxed),
            discovery_events = %self.discovery_events_total.load(Ordering::Relaxed),
            collaborator_errors = %self.collaborator_errors_total.load(Ordering::Relaxed),
            "metrics_report"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();

        metrics.record_event_processed();
        metrics.record_event_processed();
        metrics.record_transition();
        metrics.record_fix_emitted();
        metrics.record_acquisition_timeout();
        metrics.record_discovery_event();

        assert_eq!(metrics.events_total(), 2);
        assert_eq!(metrics.transitions_total(), 1);
        assert_eq!(metrics.fixes_emitted_total(), 1);
        assert_eq!(metrics.acquisition_timeouts_total(), 1);
        assert_eq!(metrics.discovery_events_total(), 1);
    }

    #[test]
    fn test_report_resets_interval_counter() {
        let metrics = Metrics::new();
        metrics.record_event_processed();
        metrics.report();
        // Monotonic total survives the report
        assert_eq!(metrics.events_total(), 1);
    }
}
