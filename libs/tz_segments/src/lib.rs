// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Cached timezone offset segments for hot-path timestamp conversion.
//!
//! Querying a timezone database for every timestamp is slow when millions of
//! timestamps need converting. This library asks the database once per
//! transition instead and caches the answers.
//!
//! # Architecture
//!
//! 1. **Segments** - maximal tick ranges `[start, end)` over which a zone's
//!    offset and gap/overlap status are constant. Bounds are read either on the
//!    UTC clock or on the zone's wall clock.
//!
//! 2. **Segment stores** - one per (zone, clock). The tick axis is cut into
//!    365-day buckets; a bucket is partitioned into segments on first access
//!    with a week-then-minute scan and published once, lock-free.
//!
//! 3. **Calculators** - one per zone, shared process-wide. Each owns a UTC and
//!    a wall-clock store and converts single tick values.
//!
//! 4. **Conversion iterators** - remember the current segment and only hit the
//!    calculator when a non-decreasing stream of positions leaves it.
//!
//! # Gaps and overlaps
//!
//! Wall-clock times that never happen (spring forward) and that happen twice
//! (fall back) are flagged on their segments and resolve with the zone's
//! standard offset: the wall-clock offset on the winter side of the
//! transition, whether the zone codes that side as regular time or as
//! negative daylight saving. The zone-to-UTC iterator does better for sequential input:
//! it keeps the pre-transition offset on entering an overlap and switches when
//! it sees the clock fly back.
//!
//! # Ticks
//!
//! One tick is 100ns and tick zero is `0001-01-01T00:00:00`. See [`ticks`].
//!
//! # Example
//!
//! ```
//! use chrono_tz::Tz;
//! use tz_segments::{ticks, Clock, ConversionIterator, TimeZoneCalculator};
//!
//! let new_york = TimeZoneCalculator::get(Tz::America__New_York);
//! let utc = ticks::from_unix_seconds(1704067200); // 2024-01-01 00:00:00 UTC
//! let segment = new_york.get_segment(utc, Clock::Utc);
//! assert_eq!(segment.offset, -5 * ticks::TICKS_PER_HOUR);
//!
//! let mut to_tokyo = ConversionIterator::create(Tz::UTC, Tz::Asia__Tokyo).unwrap();
//! for hour in 0..48 {
//!     let at = utc + hour * ticks::TICKS_PER_HOUR;
//!     assert_eq!(to_tokyo.get_ticks(at), at + 9 * ticks::TICKS_PER_HOUR);
//! }
//! ```

mod calculator;
pub mod config;
mod conversion;
mod error;
mod publish;
mod rules;
mod segment;
mod store;
pub mod ticks;

pub use calculator::TimeZoneCalculator;
pub use config::SearchConfig;
pub use conversion::{ConversionIterator, DualZoneIterator, FromUtcIterator, ToUtcIterator};
pub use error::{Error, Result};
pub use rules::{OffsetState, ZoneRules};
pub use segment::{Clock, Segment, SegmentRef};
pub use store::SegmentStore;
