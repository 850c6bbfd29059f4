use alloc::sync::Arc;
use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, Result},
    generator::{IdGeneratorBuilder, Ids, Mutex},
    layout::BitLayout,
    time::{MonotonicClock, TimeSource},
};

/// Tick recorded before the first identifier is issued.
const NO_TICK: i64 = -1;

#[derive(Debug)]
struct State {
    last_tick: i64,
    sequence: u64,
}

/// A thread-safe generator of 64-bit, time-ordered identifiers.
///
/// Every identifier is laid out as `[timestamp | generator id | sequence]`
/// according to the generator's [`BitLayout`]. The timestamp is the tick
/// reported by the [`TimeSource`] relative to the generator's epoch; the
/// sequence disambiguates identifiers issued within one tick.
///
/// The mutable `(last tick, sequence)` pair sits behind a single mutex, so
/// a generator can be shared by reference (or in an [`Arc`]) across threads.
/// Distinct generators share nothing and never contend.
///
/// ## Failure modes
/// - [`Error::SequenceOverflow`]: the sequence segment is full for the
///   current tick. Transient.
/// - [`Error::InvalidSystemClock`]: the clock went backward, or past the end
///   of the timestamp segment. Fatal for this instance.
///
/// # Example
/// ```
/// use flakegen::IdGenerator;
///
/// let generator = IdGenerator::new(7).unwrap();
/// let a = generator.next_id().unwrap();
/// let b = generator.next_id().unwrap();
/// assert!(b > a);
/// assert_eq!((a >> 12) & 0x3FF, 7);
/// ```
#[derive(Debug)]
pub struct IdGenerator<T = MonotonicClock>
where
    T: TimeSource,
{
    generator_id: i32,
    // Pre-shifted generator id segment.
    generator_bits: u64,
    epoch: Duration,
    layout: Arc<BitLayout>,
    time: T,
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<State>,
}

impl IdGenerator<MonotonicClock> {
    /// Starts a builder for a generator with the given id and every other
    /// component defaulted.
    pub fn builder(generator_id: i32) -> IdGeneratorBuilder<MonotonicClock> {
        IdGeneratorBuilder::new(generator_id)
    }

    /// Creates a generator using [`DEFAULT_EPOCH`], [`BitLayout::shared`]
    /// and [`MonotonicClock::shared`].
    ///
    /// # Errors
    ///
    /// [`Error::GeneratorIdOutOfRange`] if `generator_id` does not fit the
    /// default 10-bit segment.
    ///
    /// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
    pub fn new(generator_id: i32) -> Result<Self> {
        Self::builder(generator_id).build()
    }

    /// Creates a generator counting ticks from `epoch`.
    ///
    /// # Errors
    ///
    /// See [`IdGenerator::new`].
    pub fn with_epoch(generator_id: i32, epoch: Duration) -> Result<Self> {
        Self::builder(generator_id).epoch(epoch).build()
    }

    /// Creates a generator counting ticks from `epoch` with a custom layout.
    ///
    /// # Errors
    ///
    /// [`Error::GeneratorIdOutOfRange`] if `generator_id` does not fit the
    /// layout's generator id segment.
    pub fn with_layout(
        generator_id: i32,
        epoch: Duration,
        layout: impl Into<Arc<BitLayout>>,
    ) -> Result<Self> {
        Self::builder(generator_id).epoch(epoch).layout(layout).build()
    }
}

impl<T> IdGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator reading ticks from `time`.
    ///
    /// # Errors
    ///
    /// See [`IdGenerator::new`].
    pub fn with_time_source(generator_id: i32, time: T) -> Result<Self> {
        IdGeneratorBuilder::new(generator_id)
            .time_source(time)
            .build()
    }

    /// Creates a generator from every component explicitly.
    ///
    /// # Errors
    ///
    /// See [`IdGenerator::with_layout`].
    pub fn from_parts(
        generator_id: i32,
        epoch: Duration,
        layout: impl Into<Arc<BitLayout>>,
        time: T,
    ) -> Result<Self> {
        IdGeneratorBuilder::new(generator_id)
            .epoch(epoch)
            .layout(layout)
            .time_source(time)
            .build()
    }

    pub(crate) fn validated(
        generator_id: i32,
        epoch: Duration,
        layout: Arc<BitLayout>,
        time: T,
    ) -> Result<Self> {
        let max = layout.generator_id_mask();
        let masked = match u64::try_from(generator_id) {
            Ok(id) if id <= max => id & max,
            _ => {
                return Err(Error::GeneratorIdOutOfRange {
                    id: generator_id,
                    max: u32::try_from(max).unwrap_or(u32::MAX),
                });
            }
        };
        let state = Mutex::new(State {
            last_tick: NO_TICK,
            sequence: 0,
        });

        Ok(Self {
            // A value that passed the range check is unchanged by the mask.
            generator_id,
            generator_bits: masked << layout.generator_id_shift(),
            epoch,
            layout,
            time,
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
        })
    }

    /// Issues the next identifier.
    ///
    /// Reads the clock and updates the `(last tick, sequence)` pair under the
    /// generator's lock; concurrent callers are serialized and each receives
    /// a distinct identifier.
    ///
    /// - A tick equal to the last one increments the sequence.
    /// - A later tick becomes the new last tick and resets the sequence to 0.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSystemClock`] if the tick is negative, earlier than
    ///   the last tick used, or larger than the layout's timestamp segment
    ///   can hold.
    /// - [`Error::SequenceOverflow`] if the sequence segment is already full
    ///   for the current tick. Retrying once the clock advances succeeds.
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (only without the `parking-lot` feature).
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use flakegen::{BitLayout, Error, IdGenerator, ManualClock, DEFAULT_EPOCH};
    ///
    /// let clock = Arc::new(ManualClock::new(5));
    /// let layout = BitLayout::new(41, 20, 2).unwrap();
    /// let generator =
    ///     IdGenerator::from_parts(0, DEFAULT_EPOCH, layout, Arc::clone(&clock)).unwrap();
    ///
    /// for _ in 0..4 {
    ///     generator.next_id().unwrap();
    /// }
    /// let err = generator.next_id().unwrap_err();
    /// assert!(matches!(err, Error::SequenceOverflow { tick: 5 }));
    /// assert!(err.is_transient());
    ///
    /// clock.next_tick();
    /// assert!(generator.next_id().is_ok());
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<u64> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        // Read under the lock so racing callers cannot observe ticks out of
        // order.
        let tick = self.time.ticks_since(self.epoch);
        let last_tick = state.last_tick;

        let Ok(timestamp) = u64::try_from(tick) else {
            return Err(Self::cold_clock_behind(last_tick, tick));
        };
        if tick < last_tick {
            return Err(Self::cold_clock_behind(last_tick, tick));
        }

        if tick == last_tick {
            if state.sequence >= self.layout.sequence_mask() {
                return Err(Self::cold_sequence_exhausted(tick));
            }
            state.sequence += 1;
        } else {
            if timestamp > self.layout.timestamp_mask() {
                return Err(Self::cold_timestamp_exhausted(last_tick, tick));
            }
            state.last_tick = tick;
            state.sequence = 0;
        }

        Ok((timestamp << self.layout.timestamp_shift()) | self.generator_bits | state.sequence)
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(last_tick: i64, tick: i64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(last_tick, tick, "clock moved backwards");
        Error::InvalidSystemClock { last_tick, tick }
    }

    #[cold]
    #[inline(never)]
    fn cold_timestamp_exhausted(last_tick: i64, tick: i64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(last_tick, tick, "timestamp segment exhausted");
        Error::InvalidSystemClock { last_tick, tick }
    }

    #[cold]
    #[inline(never)]
    fn cold_sequence_exhausted(tick: i64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::debug!(tick, "sequence exhausted");
        Error::SequenceOverflow { tick }
    }

    /// Returns an endless iterator of identifiers backed by this generator.
    ///
    /// See [`Ids`] for how iterators share state.
    pub const fn ids(&self) -> Ids<'_, T> {
        Ids::new(self)
    }

    /// The generator id, masked to the layout's generator id segment.
    pub const fn generator_id(&self) -> i32 {
        self.generator_id
    }

    /// The epoch ticks are counted from, as a duration since 1970-01-01 UTC.
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }

    /// The shared bit layout identifiers are composed with.
    pub const fn layout(&self) -> &Arc<BitLayout> {
        &self.layout
    }

    /// The time source ticks are read from.
    pub const fn time_source(&self) -> &T {
        &self.time
    }

    /// When this generator runs out of timestamp space, as a duration since
    /// 1970-01-01 UTC. `None` if that lies beyond what a [`Duration`] holds.
    pub fn wraparound_date(&self) -> Option<Duration> {
        self.layout
            .wraparound_date(self.epoch, self.time.tick_duration())
    }
}
