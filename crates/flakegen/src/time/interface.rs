use alloc::{boxed::Box, sync::Arc};
use core::time::Duration;

/// Default epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// Standard UNIX epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const UNIX_EPOCH: Duration = Duration::ZERO;

/// A source of ticks counted from an epoch.
///
/// This abstraction allows you to plug in a real system clock, a monotonic
/// timer, or a hand-advanced clock in tests. The generator never reads the
/// system clock itself.
///
/// Epochs are expressed as a [`Duration`] since 1970-01-01 UTC. Ticks may be
/// negative if the epoch lies in the future; the generator rejects those.
/// Under normal operation successive reads never decrease.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use flakegen::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn ticks_since(&self, _epoch: Duration) -> i64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.ticks_since(Duration::ZERO), 1234);
/// assert_eq!(time.tick_duration(), Duration::from_millis(1));
/// ```
pub trait TimeSource {
    /// Returns the number of ticks elapsed since `epoch`.
    fn ticks_since(&self, epoch: Duration) -> i64;

    /// Length of one tick. Milliseconds unless overridden.
    fn tick_duration(&self) -> Duration {
        Duration::from_millis(1)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn ticks_since(&self, epoch: Duration) -> i64 {
        (**self).ticks_since(epoch)
    }

    fn tick_duration(&self) -> Duration {
        (**self).tick_duration()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn ticks_since(&self, epoch: Duration) -> i64 {
        (**self).ticks_since(epoch)
    }

    fn tick_duration(&self) -> Duration {
        (**self).tick_duration()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn ticks_since(&self, epoch: Duration) -> i64 {
        (**self).ticks_since(epoch)
    }

    fn tick_duration(&self) -> Duration {
        (**self).tick_duration()
    }
}
