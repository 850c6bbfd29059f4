//! Snowflake-style 64-bit identifiers with a configurable bit layout.
//!
//! An identifier packs three segments into the low 63 bits of a `u64`:
//!
//! ```text
//! | 0 | timestamp (ticks since epoch) | generator id | sequence |
//! ```
//!
//! - [`BitLayout`] decides how wide each segment is (41/10/12 by default).
//! - [`IdGenerator`] owns one generator id and issues identifiers, failing
//!   with [`Error::SequenceOverflow`] when a tick's sequence space runs out
//!   and [`Error::InvalidSystemClock`] when the clock goes backward or past
//!   the end of the timestamp segment.
//! - [`TimeSource`] abstracts the clock. [`MonotonicClock`] is the
//!   production source; [`ManualClock`] is advanced by hand.
//!
//! Generator ids are assigned externally; two generators sharing an id will
//! produce colliding identifiers.
//!
//! # Example
//!
//! ```
//! use flakegen::{Error, IdGenerator};
//!
//! let generator = IdGenerator::new(1).unwrap();
//!
//! let id = loop {
//!     match generator.next_id() {
//!         Ok(id) => break id,
//!         Err(e) if e.is_transient() => std::thread::yield_now(),
//!         Err(e) => panic!("generator retired: {e}"),
//!     }
//! };
//! assert_eq!(id >> 63, 0);
//! ```
//!
//! # Features
//!
//! - `parking-lot`: guard generator state with `parking_lot::Mutex` (no lock
//!   poisoning, so [`Error::LockPoisoned`] disappears).
//! - `cache-padded`: pad generator state to a cache line.
//! - `tracing`: emit spans and events from [`IdGenerator::next_id`].
//! - `serde`: (de)serialize [`BitLayout`] and [`GeneratorConfig`].
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod config;
mod error;
mod generator;
mod layout;
mod time;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::layout::*;
pub use crate::time::*;
