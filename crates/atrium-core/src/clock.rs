//! Time sources for store stamping.
//!
//! Stores never call `Utc::now()` directly: they draw timestamps from a
//! [`Clock`] behind a [`ClockHandle`], and run every observation through a
//! monotonic tick so `updated_at` strictly increases even when the wall
//! clock stalls or the test clock steps by zero.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// A source of wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests: starts at a fixed instant and advances
/// by a fixed number of milliseconds on every observation.
#[derive(Debug)]
pub struct ManualClock {
    current_ms: AtomicI64,
    step_ms: i64,
}

impl ManualClock {
    #[must_use]
    pub fn starting_at(at: DateTime<Utc>, step: Duration) -> Self {
        Self {
            current_ms: AtomicI64::new(at.timestamp_millis()),
            step_ms: step.num_milliseconds(),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.current_ms.fetch_add(self.step_ms, Ordering::Relaxed);
        DateTime::UNIX_EPOCH + Duration::milliseconds(ms)
    }
}

/// Shared, cheaply clonable handle to a clock. Stores hold one of these;
/// the handle is excluded from snapshots and rebuilt on load.
#[derive(Clone)]
pub struct ClockHandle(Arc<dyn Clock + Send + Sync>);

impl ClockHandle {
    #[must_use]
    pub fn new(clock: impl Clock + Send + Sync + 'static) -> Self {
        Self(Arc::new(clock))
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.0.now()
    }
}

impl Default for ClockHandle {
    fn default() -> Self {
        Self(Arc::new(SystemClock))
    }
}

impl fmt::Debug for ClockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClockHandle(..)")
    }
}
