use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;

/// Milliseconds in one day, the unit every elapsed-time threshold is expressed in.
pub const DAY_IN_MILLIS: i64 = 86_400_000;

/// Days in the bucketing year used by the rolling show window.
pub const YEAR_IN_DAYS: i64 = 365;

/// Source of "now" for every time-based decision in the crate.
///
/// Injected at construction instead of read ambiently so tests can simulate the
/// passage of days.
pub trait Clock {
    /// Current wall-clock time as milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Deterministic clock for tests. Cloned handles share the same underlying instant,
/// so a test can keep one handle and advance the ledger's view of time.
#[derive(Debug, Clone, Default)]
pub struct FixedClock(Arc<AtomicI64>);

impl FixedClock {
    /// Clock frozen at the given epoch-ms instant.
    pub fn at(ms: i64) -> Self {
        Self(Arc::new(AtomicI64::new(ms)))
    }

    /// Move the clock to an absolute instant.
    pub fn set(&self, ms: i64) {
        self.0.store(ms, Ordering::Relaxed);
    }

    /// Advance the clock by a number of whole days.
    pub fn advance_days(&self, days: i64) {
        self.0.fetch_add(days * DAY_IN_MILLIS, Ordering::Relaxed);
    }

    /// Advance the clock by an arbitrary number of milliseconds.
    pub fn advance_ms(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}
