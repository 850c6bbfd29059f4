use alloc::sync::Arc;
use core::time::Duration;
use std::{
    sync::{LazyLock, OnceLock},
    thread::{self, JoinHandle},
    time::{Instant, SystemTime},
};

use portable_atomic::{AtomicU64, Ordering};

use crate::time::TimeSource;

static SHARED_CLOCK: LazyLock<MonotonicClock> = LazyLock::new(MonotonicClock::new);

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    elapsed: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A millisecond time source that reads the wall clock once and then only
/// moves forward.
///
/// At construction the clock records the current Unix time. From then on a
/// background thread advances a shared counter from a monotonic timer
/// (`Instant`), so NTP corrections or manual changes to the system clock
/// never make it go backward. Reading the clock is a single atomic load.
///
/// One clock serves any number of generators and epochs: the epoch is
/// subtracted at read time. Cloning shares the ticker; the thread exits once
/// every clone is dropped.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use flakegen::{MonotonicClock, TimeSource, DEFAULT_EPOCH};
///
/// let clock = MonotonicClock::new();
/// let before = clock.ticks_since(DEFAULT_EPOCH);
/// std::thread::sleep(Duration::from_millis(5));
///
/// // The ticker may trail real time slightly, but never goes backward.
/// assert!(clock.ticks_since(DEFAULT_EPOCH) >= before);
/// ```
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    origin_millis: u64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Starts a new clock with its own ticker thread.
    ///
    /// A system clock set before 1970 is treated as 1970-01-01; every
    /// epoch after that then yields negative ticks, which generators reject.
    pub fn new() -> Self {
        let start = Instant::now();
        let origin_millis = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, saturating_millis);

        let inner = Arc::new(SharedTickerInner {
            elapsed: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = saturating_millis(start.elapsed());
                inner_ref.elapsed.store(now_ms, Ordering::Release);

                // Align to the tick after the time actually observed
                tick = now_ms + 1;
            }
        });

        // Only this constructor sets the handle.
        let _ = inner._handle.set(handle);

        Self {
            inner,
            origin_millis,
        }
    }

    /// Returns a clone of the process-wide clock, starting it on first use.
    ///
    /// Generators built without an explicit time source use this clock.
    pub fn shared() -> Self {
        SHARED_CLOCK.clone()
    }

    /// Milliseconds since the Unix epoch, as tracked by this clock.
    pub fn unix_millis(&self) -> u64 {
        self.origin_millis + self.inner.elapsed.load(Ordering::Acquire)
    }

    /// Returns `true` if both handles share the same ticker.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl TimeSource for MonotonicClock {
    /// Milliseconds elapsed between `epoch` and now.
    fn ticks_since(&self, epoch: Duration) -> i64 {
        let now = i64::try_from(self.unix_millis()).unwrap_or(i64::MAX);
        let epoch = i64::try_from(epoch.as_millis()).unwrap_or(i64::MAX);
        now.saturating_sub(epoch)
    }
}

fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
