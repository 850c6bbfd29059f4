use alloc::sync::Arc;
use core::time::Duration;
use std::sync::LazyLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, LayoutError, Result, Segment};

/// Number of payload bits in an identifier. Bit 63 is never used.
pub const PAYLOAD_BITS: u32 = 63;

/// Widest generator id or sequence segment accepted.
pub const MAX_SEGMENT_BITS: u8 = 31;

static SHARED_DEFAULT: LazyLock<Arc<BitLayout>> =
    LazyLock::new(|| Arc::new(BitLayout::DEFAULT));

/// Describes how the 63 payload bits of an identifier are split into
/// timestamp, generator id and sequence segments.
///
/// From most to least significant bit an identifier reads
/// `[timestamp | generator id | sequence]`. Masks and shifts are derived once
/// at construction; a layout is immutable afterwards and can be shared by any
/// number of generators.
///
/// # Example
///
/// ```
/// use flakegen::BitLayout;
///
/// let layout = BitLayout::new(41, 10, 12).unwrap();
/// assert_eq!(layout, BitLayout::DEFAULT);
/// assert_eq!(layout.timestamp_shift(), 22);
/// assert_eq!(layout.generator_id_mask(), 1023);
///
/// assert!(BitLayout::new(41, 10, 11).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Widths", into = "Widths")
)]
pub struct BitLayout {
    timestamp_bits: u8,
    generator_id_bits: u8,
    sequence_bits: u8,
    timestamp_mask: u64,
    generator_id_mask: u64,
    sequence_mask: u64,
}

impl BitLayout {
    /// 41 timestamp bits, 10 generator id bits and 12 sequence bits.
    ///
    /// With millisecond ticks this covers roughly 69 years from the epoch,
    /// 1024 generators and 4096 identifiers per generator per millisecond.
    pub const DEFAULT: Self = Self::from_widths(41, 10, 12);

    /// Creates a layout from its three segment widths.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::SegmentTooWide`] if `generator_id_bits` or
    ///   `sequence_bits` exceeds 31. This is checked first.
    /// - [`LayoutError::BitCount`] if the widths do not sum to exactly 63.
    pub fn new(timestamp_bits: u8, generator_id_bits: u8, sequence_bits: u8) -> Result<Self> {
        if generator_id_bits > MAX_SEGMENT_BITS {
            return Err(Error::InvalidLayout(LayoutError::SegmentTooWide {
                segment: Segment::GeneratorId,
                bits: generator_id_bits,
            }));
        }
        if sequence_bits > MAX_SEGMENT_BITS {
            return Err(Error::InvalidLayout(LayoutError::SegmentTooWide {
                segment: Segment::Sequence,
                bits: sequence_bits,
            }));
        }
        let total =
            u32::from(timestamp_bits) + u32::from(generator_id_bits) + u32::from(sequence_bits);
        if total != PAYLOAD_BITS {
            return Err(Error::InvalidLayout(LayoutError::BitCount { total }));
        }
        Ok(Self::from_widths(
            timestamp_bits,
            generator_id_bits,
            sequence_bits,
        ))
    }

    // Callers guarantee the widths are valid.
    const fn from_widths(timestamp_bits: u8, generator_id_bits: u8, sequence_bits: u8) -> Self {
        Self {
            timestamp_bits,
            generator_id_bits,
            sequence_bits,
            timestamp_mask: mask(timestamp_bits),
            generator_id_mask: mask(generator_id_bits),
            sequence_mask: mask(sequence_bits),
        }
    }

    /// Returns the process-wide shared instance of [`BitLayout::DEFAULT`].
    ///
    /// Every call hands out a clone of the same [`Arc`], so generators built
    /// with the default layout all point at one value.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED_DEFAULT)
    }

    /// Width of the timestamp segment.
    pub const fn timestamp_bits(&self) -> u8 {
        self.timestamp_bits
    }

    /// Width of the generator id segment.
    pub const fn generator_id_bits(&self) -> u8 {
        self.generator_id_bits
    }

    /// Width of the sequence segment.
    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Largest tick the timestamp segment can hold.
    pub const fn timestamp_mask(&self) -> u64 {
        self.timestamp_mask
    }

    /// Largest generator id the layout can hold.
    pub const fn generator_id_mask(&self) -> u64 {
        self.generator_id_mask
    }

    /// Largest sequence value within one tick.
    pub const fn sequence_mask(&self) -> u64 {
        self.sequence_mask
    }

    /// Left shift applied to the tick.
    pub const fn timestamp_shift(&self) -> u32 {
        self.generator_id_bits as u32 + self.sequence_bits as u32
    }

    /// Left shift applied to the generator id.
    pub const fn generator_id_shift(&self) -> u32 {
        self.sequence_bits as u32
    }

    /// Number of distinct ticks the timestamp segment can represent.
    pub const fn max_intervals(&self) -> u64 {
        1 << self.timestamp_bits
    }

    /// Number of distinct generator ids.
    pub const fn max_generators(&self) -> u64 {
        1 << self.generator_id_bits
    }

    /// Number of identifiers a single generator can issue per tick.
    pub const fn max_sequence_ids(&self) -> u64 {
        1 << self.sequence_bits
    }

    /// Total time the timestamp segment spans when each tick lasts `tick`.
    ///
    /// Returns `None` if the span does not fit in a [`Duration`].
    pub fn wraparound_interval(&self, tick: Duration) -> Option<Duration> {
        const NANOS_PER_SEC: u128 = 1_000_000_000;
        let total = tick
            .as_nanos()
            .checked_mul(u128::from(self.max_intervals()))?;
        let secs = u64::try_from(total / NANOS_PER_SEC).ok()?;
        #[allow(clippy::cast_possible_truncation)]
        let nanos = (total % NANOS_PER_SEC) as u32;
        Some(Duration::new(secs, nanos))
    }

    /// Instant, as a duration since the Unix epoch, at which a generator
    /// counting `tick`-long ticks from `epoch` runs out of timestamp space.
    ///
    /// Returns `None` on overflow.
    pub fn wraparound_date(&self, epoch: Duration, tick: Duration) -> Option<Duration> {
        epoch.checked_add(self.wraparound_interval(tick)?)
    }
}

impl Default for BitLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const fn mask(bits: u8) -> u64 {
    if bits == 0 { 0 } else { u64::MAX >> (64 - bits as u32) }
}

/// Serialized form of a [`BitLayout`]: just the widths, validated on the way
/// back in.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct Widths {
    timestamp_bits: u8,
    generator_id_bits: u8,
    sequence_bits: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<Widths> for BitLayout {
    type Error = Error;

    fn try_from(w: Widths) -> Result<Self> {
        Self::new(w.timestamp_bits, w.generator_id_bits, w.sequence_bits)
    }
}

#[cfg(feature = "serde")]
impl From<BitLayout> for Widths {
    fn from(layout: BitLayout) -> Self {
        Self {
            timestamp_bits: layout.timestamp_bits,
            generator_id_bits: layout.generator_id_bits,
            sequence_bits: layout.sequence_bits,
        }
    }
}
