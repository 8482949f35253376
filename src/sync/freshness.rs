//! Freshness policy and clock
//!
//! Decides whether a cached record can be trusted without asking the
//! remote store. The clock is injected so tests never depend on wall time.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Default freshness window: 10 minutes.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(10 * 60);

/// True iff `now - record_ts <= window_ms`.
///
/// Pure and total. A record stamped in the future counts as fresh.
pub fn is_fresh(record_ts: i64, now: i64, window_ms: i64) -> bool {
    now.saturating_sub(record_ts) <= window_ms
}

/// Freshness window applied by a sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    window_ms: i64,
}

impl FreshnessPolicy {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    pub fn is_fresh(&self, record_ts: i64, now: i64) -> bool {
        is_fresh(record_ts, now, self.window_ms)
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS_WINDOW)
    }
}

/// Source of "now" in epoch milliseconds.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        crate::data::now_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let by = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.now.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
