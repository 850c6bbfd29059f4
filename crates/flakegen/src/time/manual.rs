use core::time::Duration;

use portable_atomic::{AtomicI64, Ordering};

use crate::time::TimeSource;

/// A hand-advanced clock for tests and simulations.
///
/// Reports whatever tick it was last set to, regardless of the epoch it is
/// asked about. Updates are atomic, so a clock shared through an
/// [`Arc`](alloc::sync::Arc) can be moved forward (or back) while generators
/// on other threads read it.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use flakegen::{IdGenerator, ManualClock};
///
/// let clock = Arc::new(ManualClock::new(0));
/// let generator = IdGenerator::with_time_source(0, Arc::clone(&clock)).unwrap();
///
/// assert_eq!(generator.next_id().unwrap(), 0);
/// assert_eq!(generator.next_id().unwrap(), 1);
///
/// clock.next_tick();
/// assert_eq!(generator.next_id().unwrap(), 1 << 22);
/// ```
#[derive(Debug)]
pub struct ManualClock {
    tick: AtomicI64,
    tick_duration: Duration,
}

impl ManualClock {
    /// Creates a clock that reports `tick` with one-millisecond ticks.
    pub const fn new(tick: i64) -> Self {
        Self::with_tick_duration(tick, Duration::from_millis(1))
    }

    /// Creates a clock that reports `tick` and claims each tick lasts
    /// `tick_duration`.
    pub const fn with_tick_duration(tick: i64, tick_duration: Duration) -> Self {
        Self {
            tick: AtomicI64::new(tick),
            tick_duration,
        }
    }

    /// The tick currently reported.
    pub fn current(&self) -> i64 {
        self.tick.load(Ordering::Acquire)
    }

    /// Jumps the clock to `tick`.
    pub fn set(&self, tick: i64) {
        self.tick.store(tick, Ordering::Release);
    }

    /// Moves the clock by `ticks`, which may be negative. Returns the new
    /// tick.
    ///
    /// Wraps around at the bounds of `i64`, the same way the stored value
    /// does.
    pub fn advance(&self, ticks: i64) -> i64 {
        self.tick
            .fetch_add(ticks, Ordering::AcqRel)
            .wrapping_add(ticks)
    }

    /// Moves the clock one tick forward. Returns the new tick.
    pub fn next_tick(&self) -> i64 {
        self.advance(1)
    }

    /// Moves the clock one tick back. Returns the new tick.
    pub fn previous_tick(&self) -> i64 {
        self.advance(-1)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TimeSource for ManualClock {
    fn ticks_since(&self, _epoch: Duration) -> i64 {
        self.current()
    }

    fn tick_duration(&self) -> Duration {
        self.tick_duration
    }
}
