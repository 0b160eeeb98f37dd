//! Tick timing.
//!
//! The tick itself is driven by the host (a Win32 timer on Windows); this
//! module holds the period and the wall clock used to stamp records.

use std::time::Duration;

/// Length of one aggregation window.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Source of record timestamps.
pub trait Clock {
    /// Current time in whole seconds since the Unix epoch.
    fn unix_timestamp(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}
