//! Per-tick activity accumulator.
//!
//! Two states, idle and active. Accepted events move it to active, the tick
//! flush reads the state and moves it back to idle. Any number of events in
//! one tick collapse into a single "active".

/// Sticky "activity seen since the last flush" flag.
///
/// Only reachable through `&mut self`: input and timer callbacks are
/// dispatched on one thread, so set and flush can never interleave.
#[derive(Debug, Default)]
pub struct ActivityAggregator {
    was_active: bool,
}

impl ActivityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the current tick as active. Idempotent.
    #[inline]
    pub fn set(&mut self) {
        self.was_active = true;
    }

    /// Returns whether the tick was active and starts a new idle tick.
    #[inline]
    pub fn flush_and_reset(&mut self) -> bool {
        std::mem::take(&mut self.was_active)
    }

    /// Reads the flag without resetting it.
    pub fn is_active(&self) -> bool {
        self.was_active
    }
}
