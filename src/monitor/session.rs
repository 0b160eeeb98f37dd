//! The monitor context.
//!
//! Owns everything the core needs (deny list, activity flag, device query,
//! clock and output) and exposes it to the host through [`InputHandler`].

use super::aggregator::ActivityAggregator;
use super::classifier::DeviceQuery;
use super::filter::{EventFilter, Rejection};
use super::tick::Clock;
use super::types::{ActivityRecord, InputEvent};
use crate::output::RecordWriter;
use std::io::{self, Write};

/// Callbacks the host event loop drives.
pub trait InputHandler {
    /// Called once per raw input event.
    fn on_input(&mut self, event: &InputEvent);

    /// Called once per tick. An error ends the run.
    fn on_tick(&mut self) -> io::Result<()>;

    /// Called once when the host is tearing down.
    fn on_shutdown(&mut self);
}

/// Event counts within the current tick, for tracing only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickCounters {
    pub accepted: u64,
    pub rejected: u64,
}

/// Activity detector driven by raw input and ticks.
pub struct ActivityMonitor<Q, C, W: Write> {
    filter: EventFilter,
    aggregator: ActivityAggregator,
    query: Q,
    clock: C,
    writer: RecordWriter<W>,
    counters: TickCounters,
}

impl<Q: DeviceQuery, C: Clock, W: Write> ActivityMonitor<Q, C, W> {
    pub fn new(filter: EventFilter, query: Q, clock: C, out: W) -> Self {
        Self {
            filter,
            aggregator: ActivityAggregator::new(),
            query,
            clock,
            writer: RecordWriter::new(out),
            counters: TickCounters::default(),
        }
    }

    pub fn writer(&self) -> &RecordWriter<W> {
        &self.writer
    }

    /// Whether activity has been seen since the last tick.
    pub fn is_active(&self) -> bool {
        self.aggregator.is_active()
    }

    /// Ends the current tick. Returns the record if the tick was active.
    pub fn tick(&mut self) -> io::Result<Option<ActivityRecord>> {
        let counters = std::mem::take(&mut self.counters);
        if !self.aggregator.flush_and_reset() {
            tracing::trace!(rejected = counters.rejected, "Idle tick");
            return Ok(None);
        }

        let record = ActivityRecord {
            timestamp: self.clock.unix_timestamp(),
        };
        tracing::trace!(
            timestamp = record.timestamp,
            accepted = counters.accepted,
            rejected = counters.rejected,
            "Active tick"
        );
        self.writer.emit(record)?;
        Ok(Some(record))
    }
}

impl<Q: DeviceQuery, C: Clock, W: Write> InputHandler for ActivityMonitor<Q, C, W> {
    fn on_input(&mut self, event: &InputEvent) {
        match self.filter.evaluate(&self.query, event) {
            Ok(info) => {
                self.counters.accepted += 1;
                self.aggregator.set();
                tracing::trace!(
                    device = %event.device,
                    kind = %info.kind,
                    capacity = ?info.capacity,
                    "Activity"
                );
            }
            Err(Rejection::MouseMovement) => {
                self.counters.rejected += 1;
            }
            Err(reason) => {
                self.counters.rejected += 1;
                tracing::debug!(
                    device = %event.device,
                    kind = %event.kind,
                    %reason,
                    "Input ignored"
                );
            }
        }
    }

    fn on_tick(&mut self) -> io::Result<()> {
        self.tick().map(|_| ())
    }

    fn on_shutdown(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(?e, "Failed to flush output on shutdown");
        }
        tracing::info!(records = self.writer.written(), "Activity monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::classifier::tests::FakeQuery;
    use crate::monitor::types::DeviceHandle;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn unix_timestamp(&self) -> i64 {
            self.0
        }
    }

    fn monitor(
        denied: &[u32],
        query: FakeQuery,
    ) -> ActivityMonitor<FakeQuery, FixedClock, Vec<u8>> {
        ActivityMonitor::new(
            EventFilter::new(denied.iter().copied().collect()),
            query,
            FixedClock(1_600_000_000),
            Vec::new(),
        )
    }

    #[test]
    fn test_accepted_event_emits_on_tick() {
        let mut monitor = monitor(&[110], FakeQuery::default().with_keyboard(1, 104));
        monitor.on_input(&InputEvent::keyboard(DeviceHandle(1)));
        assert!(monitor.is_active());

        let record = monitor.tick().unwrap();
        assert_eq!(
            record,
            Some(ActivityRecord {
                timestamp: 1_600_000_000
            })
        );
        assert_eq!(monitor.writer().get_ref().as_slice(), b"1600000000\n");
    }

    #[test]
    fn test_idle_tick_emits_nothing() {
        let mut monitor = monitor(&[], FakeQuery::default().with_mouse(2, 3));
        monitor.on_input(&InputEvent::mouse_move(DeviceHandle(2)));
        monitor.on_tick().unwrap();
        assert!(monitor.writer().get_ref().is_empty());
    }

    #[test]
    fn test_tick_resets_activity() {
        let mut monitor = monitor(&[], FakeQuery::default().with_keyboard(1, 104));
        for _ in 0..3 {
            monitor.on_input(&InputEvent::keyboard(DeviceHandle(1)));
        }
        assert!(monitor.tick().unwrap().is_some());
        assert!(monitor.tick().unwrap().is_none());
        assert_eq!(monitor.writer().written(), 1);
    }

    #[test]
    fn test_counters_reset_every_tick() {
        let mut monitor = monitor(&[5], FakeQuery::default().with_keyboard(1, 5));
        monitor.on_input(&InputEvent::keyboard(DeviceHandle(1)));
        assert_eq!(monitor.counters.rejected, 1);
        monitor.tick().unwrap();
        assert_eq!(monitor.counters, TickCounters::default());
    }
}
