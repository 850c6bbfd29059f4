use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BitLayout, DEFAULT_EPOCH, IdGenerator, MonotonicClock, Result, TimeSource};

/// Declarative description of a generator, typically loaded from the host
/// application's configuration.
///
/// With the `serde` feature this (de)serializes as:
///
/// ```json
/// {
///   "generator_id": 12,
///   "epoch_millis": 1420070400000,
///   "layout": { "timestamp_bits": 41, "generator_id_bits": 10, "sequence_bits": 12 }
/// }
/// ```
///
/// `epoch_millis` and `layout` are optional and fall back to
/// [`DEFAULT_EPOCH`] and [`BitLayout::shared`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorConfig {
    /// Externally assigned id of this generator.
    pub generator_id: i32,
    /// Epoch in milliseconds since 1970-01-01 UTC.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub epoch_millis: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    /// Segment widths.
    pub layout: Option<BitLayout>,
}

impl GeneratorConfig {
    /// A config with every optional field left to its default.
    pub const fn new(generator_id: i32) -> Self {
        Self {
            generator_id,
            epoch_millis: None,
            layout: None,
        }
    }

    /// The configured epoch, or [`DEFAULT_EPOCH`].
    pub fn epoch(&self) -> Duration {
        self.epoch_millis
            .map_or(DEFAULT_EPOCH, Duration::from_millis)
    }

    /// Builds a generator on the shared [`MonotonicClock`].
    ///
    /// # Errors
    ///
    /// [`Error::GeneratorIdOutOfRange`] if the id does not fit the layout.
    ///
    /// [`Error::GeneratorIdOutOfRange`]: crate::Error::GeneratorIdOutOfRange
    pub fn build(&self) -> Result<IdGenerator<MonotonicClock>> {
        self.build_with(MonotonicClock::shared())
    }

    /// Builds a generator reading ticks from `time`.
    ///
    /// # Errors
    ///
    /// See [`GeneratorConfig::build`].
    pub fn build_with<T>(&self, time: T) -> Result<IdGenerator<T>>
    where
        T: TimeSource,
    {
        let builder = IdGenerator::builder(self.generator_id)
            .epoch(self.epoch())
            .time_source(time);
        match self.layout {
            Some(layout) => builder.layout(layout).build(),
            None => builder.build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ManualClock};
    use alloc::sync::Arc;

    #[test]
    fn defaults_when_omitted() {
        let generator = GeneratorConfig::new(5).build().unwrap();
        assert_eq!(generator.generator_id(), 5);
        assert_eq!(generator.epoch(), DEFAULT_EPOCH);
        assert!(Arc::ptr_eq(generator.layout(), &BitLayout::shared()));
    }

    #[test]
    fn explicit_values_are_used() {
        let layout = BitLayout::new(40, 12, 11).unwrap();
        let config = GeneratorConfig {
            generator_id: 4095,
            epoch_millis: Some(946_684_800_000),
            layout: Some(layout),
        };
        let generator = config.build_with(ManualClock::new(0)).unwrap();
        assert_eq!(generator.epoch(), Duration::from_millis(946_684_800_000));
        assert_eq!(**generator.layout(), layout);
        assert_eq!(generator.next_id().unwrap(), 4095 << 11);
    }

    #[test]
    fn out_of_range_id_is_rejected() {
        let err = GeneratorConfig::new(1024).build().unwrap_err();
        assert_eq!(err, Error::GeneratorIdOutOfRange { id: 1024, max: 1023 });
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_with_optional_fields() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"generator_id":3}"#).unwrap();
        assert_eq!(config, GeneratorConfig::new(3));

        let config: GeneratorConfig = serde_json::from_str(
            r#"{
                "generator_id": 3,
                "epoch_millis": 0,
                "layout": {"timestamp_bits": 21, "generator_id_bits": 21, "sequence_bits": 21}
            }"#,
        )
        .unwrap();
        assert_eq!(config.epoch(), Duration::ZERO);
        assert_eq!(config.layout, Some(BitLayout::new(21, 21, 21).unwrap()));

        let json = serde_json::to_string(&GeneratorConfig::new(9)).unwrap();
        assert_eq!(json, r#"{"generator_id":9}"#);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn invalid_layout_fails_to_deserialize() {
        let result = serde_json::from_str::<GeneratorConfig>(
            r#"{"generator_id": 3, "layout": {"timestamp_bits": 41, "generator_id_bits": 10, "sequence_bits": 11}}"#,
        );
        assert!(result.is_err());
    }
}
