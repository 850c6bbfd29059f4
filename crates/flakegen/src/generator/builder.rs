use alloc::sync::Arc;
use core::time::Duration;

use crate::{
    error::{Error, Result},
    generator::IdGenerator,
    layout::BitLayout,
    time::{DEFAULT_EPOCH, MonotonicClock, TimeSource},
};

/// A collaborator that is either defaulted, supplied, or explicitly absent.
enum Slot<T> {
    Default(fn() -> T),
    Given(T),
    Absent,
}

impl<T> Slot<T> {
    fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Given)
    }

    fn resolve(self, name: &'static str) -> Result<T> {
        match self {
            Self::Default(make) => Ok(make()),
            Self::Given(value) => Ok(value),
            Self::Absent => Err(Error::MissingCollaborator(name)),
        }
    }
}

/// Step-by-step construction of an [`IdGenerator`].
///
/// Only the generator id is required. Anything not set falls back to
/// [`DEFAULT_EPOCH`], [`BitLayout::shared`] and [`MonotonicClock::shared`].
/// The `maybe_*` setters take an `Option` for callers that resolve
/// collaborators dynamically; passing `None` makes [`build`] fail rather
/// than fall back to the default.
///
/// # Example
/// ```
/// use core::time::Duration;
/// use flakegen::{BitLayout, IdGenerator, ManualClock};
///
/// let generator = IdGenerator::builder(3)
///     .epoch(Duration::from_millis(946_684_800_000))
///     .layout(BitLayout::new(40, 12, 11).unwrap())
///     .time_source(ManualClock::new(0))
///     .build()
///     .unwrap();
///
/// assert_eq!(generator.next_id().unwrap(), 3 << 11);
/// ```
///
/// [`build`]: IdGeneratorBuilder::build
pub struct IdGeneratorBuilder<T = MonotonicClock> {
    generator_id: i32,
    epoch: Duration,
    layout: Slot<Arc<BitLayout>>,
    time: Slot<T>,
}

impl IdGeneratorBuilder<MonotonicClock> {
    /// Starts a builder for `generator_id` with every other component
    /// defaulted.
    pub fn new(generator_id: i32) -> Self {
        Self {
            generator_id,
            epoch: DEFAULT_EPOCH,
            layout: Slot::Default(BitLayout::shared),
            time: Slot::Default(MonotonicClock::shared),
        }
    }
}

impl<T> IdGeneratorBuilder<T>
where
    T: TimeSource,
{
    /// Sets the epoch, as a duration since 1970-01-01 UTC.
    #[must_use]
    pub fn epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }

    /// Sets the bit layout.
    #[must_use]
    pub fn layout(mut self, layout: impl Into<Arc<BitLayout>>) -> Self {
        self.layout = Slot::Given(layout.into());
        self
    }

    /// Sets the layout, or marks it absent with `None`.
    #[must_use]
    pub fn maybe_layout(mut self, layout: Option<Arc<BitLayout>>) -> Self {
        self.layout = Slot::from_option(layout);
        self
    }

    /// Sets the time source, changing the generator's clock type.
    #[must_use]
    pub fn time_source<S>(self, time: S) -> IdGeneratorBuilder<S>
    where
        S: TimeSource,
    {
        self.with_time_slot(Slot::Given(time))
    }

    /// Sets the time source, or marks it absent with `None`.
    #[must_use]
    pub fn maybe_time_source<S>(self, time: Option<S>) -> IdGeneratorBuilder<S>
    where
        S: TimeSource,
    {
        self.with_time_slot(Slot::from_option(time))
    }

    fn with_time_slot<S>(self, time: Slot<S>) -> IdGeneratorBuilder<S> {
        IdGeneratorBuilder {
            generator_id: self.generator_id,
            epoch: self.epoch,
            layout: self.layout,
            time,
        }
    }

    /// Validates the configuration and creates the generator.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingCollaborator`] if the layout or time source was
    ///   supplied as `None`.
    /// - [`Error::GeneratorIdOutOfRange`] if the generator id is negative or
    ///   larger than the layout's generator id mask.
    pub fn build(self) -> Result<IdGenerator<T>> {
        let layout = self.layout.resolve("layout")?;
        let time = self.time.resolve("time_source")?;
        IdGenerator::validated(self.generator_id, self.epoch, layout, time)
    }
}
