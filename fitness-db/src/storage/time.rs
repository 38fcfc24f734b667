//! Time source abstraction.
//!
//! Record timestamps and generated ids come from a `TimeSource`, so tests can
//! pin the clock while production uses the system time.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Abstraction over time operations.
pub trait TimeSource {
    /// Get the current time in whole seconds since Unix epoch.
    fn now_secs(&self) -> i64;
}

/// Real time source using system clock.
///
/// This is the default implementation used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_secs(&self) -> i64 {
        // Before 1970 only on a badly misconfigured clock; report the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
    }
}

/// A time source that only moves when told to.
///
/// Clones share the same clock, so a test can keep a handle while the
/// database owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Arc<AtomicI64>,
}

impl ManualTimeSource {
    #[must_use]
    pub fn new(now_secs: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now_secs)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Set the clock to an absolute value.
    pub fn set(&self, now_secs: i64) {
        self.now.store(now_secs, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
