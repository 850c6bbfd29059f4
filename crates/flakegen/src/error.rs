/// Result type used throughout `flakegen`.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakegen` can emit.
///
/// Configuration errors ([`Error::MissingCollaborator`],
/// [`Error::InvalidLayout`], [`Error::GeneratorIdOutOfRange`]) surface at
/// construction time. [`Error::InvalidSystemClock`] and
/// [`Error::SequenceOverflow`] surface from [`IdGenerator::next_id`].
///
/// Nothing is retried internally. Use [`Error::is_transient`] to decide
/// between retrying and giving up.
///
/// [`IdGenerator::next_id`]: crate::IdGenerator::next_id
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A required collaborator was explicitly supplied as absent.
    ///
    /// Only reachable through [`IdGeneratorBuilder::maybe_layout`] and
    /// [`IdGeneratorBuilder::maybe_time_source`] with `None`. Omitting the
    /// call selects the default instead.
    ///
    /// [`IdGeneratorBuilder::maybe_layout`]: crate::IdGeneratorBuilder::maybe_layout
    /// [`IdGeneratorBuilder::maybe_time_source`]: crate::IdGeneratorBuilder::maybe_time_source
    #[error("required collaborator `{0}` was supplied as absent")]
    MissingCollaborator(&'static str),

    /// The segment widths do not describe a valid 63-bit layout.
    #[error("invalid bit layout: {0}")]
    InvalidLayout(#[from] LayoutError),

    /// The generator id is negative or does not fit its segment.
    #[error("generator id {id} is outside 0..={max}")]
    GeneratorIdOutOfRange {
        /// The rejected id, as supplied.
        id: i32,
        /// Largest id the layout can hold.
        max: u32,
    },

    /// The clock reported a tick earlier than the last one used, or a tick
    /// past the end of the timestamp segment.
    ///
    /// Both cases are fatal for issuance: the generator must not be used
    /// again until the clock is fixed or the instance is retired.
    #[error("invalid system clock: tick {tick} unusable after tick {last_tick}")]
    InvalidSystemClock {
        /// Last tick an identifier was issued for, `-1` if none yet.
        last_tick: i64,
        /// The offending tick reported by the time source.
        tick: i64,
    },

    /// More identifiers were requested within one tick than the sequence
    /// segment can hold.
    ///
    /// Transient: the first call after the clock advances succeeds again.
    #[error("sequence exhausted for tick {tick}")]
    SequenceOverflow {
        /// The tick whose sequence space is exhausted.
        tick: i64,
    },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns `true` if the same call may succeed once the clock moves on.
    ///
    /// Only [`Error::SequenceOverflow`] is transient.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::SequenceOverflow { .. })
    }
}

/// Why a set of segment widths was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum LayoutError {
    /// The three widths do not add up to exactly 63 bits.
    #[error("segments use {total} bits, expected exactly 63")]
    BitCount {
        /// Sum of the three widths.
        total: u32,
    },

    /// The generator id or sequence segment is wider than 31 bits.
    #[error("{segment} segment is {bits} bits wide, at most 31 allowed")]
    SegmentTooWide {
        /// Which segment is too wide.
        segment: Segment,
        /// The rejected width.
        bits: u8,
    },
}

/// Names a width-limited segment of an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// The generator id segment.
    GeneratorId,
    /// The per-tick sequence segment.
    Sequence,
}

impl core::fmt::Display for Segment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::GeneratorId => "generator id",
            Self::Sequence => "sequence",
        })
    }
}

#[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn clock_error_message_fits_both_directions() {
        let behind = Error::InvalidSystemClock {
            last_tick: 100,
            tick: 99,
        };
        assert_eq!(
            behind.to_string(),
            "invalid system clock: tick 99 unusable after tick 100"
        );

        let exhausted = Error::InvalidSystemClock {
            last_tick: 7,
            tick: 8,
        };
        assert_eq!(
            exhausted.to_string(),
            "invalid system clock: tick 8 unusable after tick 7"
        );
    }

    #[test]
    fn layout_error_messages() {
        let err = Error::from(LayoutError::SegmentTooWide {
            segment: Segment::Sequence,
            bits: 32,
        });
        assert_eq!(
            err.to_string(),
            "invalid bit layout: sequence segment is 32 bits wide, at most 31 allowed"
        );
        assert_eq!(
            LayoutError::BitCount { total: 62 }.to_string(),
            "segments use 62 bits, expected exactly 63"
        );
    }
}
