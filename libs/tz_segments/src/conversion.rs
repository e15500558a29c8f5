// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Sequential conversion iterators.
//!
//! A conversion iterator remembers the segment its last position fell in and
//! only goes back to the calculator once a new position leaves it, which makes
//! converting an ascending stream of timestamps O(1) per element.
//!
//! **Positions must be non-decreasing.** The only permitted decrease is the
//! wall clock flying back inside an overlap when converting zone-local ticks to
//! UTC. Anything else returns stale results; debug builds assert on it.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use chrono_tz::Tz;

use crate::{
    calculator::TimeZoneCalculator,
    error::{Error, Result},
    rules::ZoneRules,
    segment::{Clock, Segment, SegmentRef},
    ticks::{self, TICKS_PER_SECOND},
};

/// Zone-local ticks to UTC ticks.
pub struct ToUtcIterator<R = Tz> {
    calculator: Arc<TimeZoneCalculator<R>>,
    difference: i64,
    segment: Option<Segment>,
    previous: i64,
    awaiting_fly_back: bool,
}

impl ToUtcIterator<Tz> {
    pub fn new(from: Tz) -> Self {
        Self::with_calculator(TimeZoneCalculator::get(from))
    }

    pub fn from_zone(&self) -> Tz {
        self.calculator.zone()
    }

    pub fn to_zone(&self) -> Tz {
        Tz::UTC
    }
}

impl<R: ZoneRules> ToUtcIterator<R> {
    /// Iterates over the wall clock of an existing calculator.
    pub fn with_calculator(calculator: Arc<TimeZoneCalculator<R>>) -> Self {
        Self {
            calculator,
            difference: 0,
            segment: None,
            previous: i64::MIN,
            awaiting_fly_back: false,
        }
    }

    /// UTC minus zone-local ticks at the last position.
    #[inline]
    pub fn difference(&self) -> i64 {
        self.difference
    }

    /// Moves to `position` (zone-local ticks). Returns `true` if the cached
    /// difference had to be recomputed.
    ///
    /// On entering an overlap the wall clock is assumed to still be on the
    /// pre-transition offset. The first decrease in position while inside the
    /// overlap is the clock flying back; from then on the overlap's own
    /// (standard) offset applies.
    #[inline]
    pub fn advance(&mut self, position: i64) -> bool {
        if self.awaiting_fly_back && position < self.previous {
            self.awaiting_fly_back = false;
            if let Some(segment) = &self.segment {
                self.difference = -segment.offset;
            }
            self.previous = position;
            return true;
        }

        debug_assert!(
            position >= self.previous,
            "conversion iterator positions must be non-decreasing: {} after {}",
            position,
            self.previous
        );
        self.previous = position;

        if let Some(segment) = &self.segment {
            if position < segment.end {
                return false;
            }
        }

        let entered = self.calculator.get_segment(position, Clock::Local);
        let continues_overlap = entered.is_overlap
            && matches!(self.segment, Some(s) if s.is_overlap && s.end == entered.start);
        if !continues_overlap {
            if entered.is_overlap {
                self.difference = -offset_before_overlap(&entered);
                self.awaiting_fly_back = true;
            } else {
                self.difference = -entered.offset;
                self.awaiting_fly_back = false;
            }
        }
        self.segment = Some(entered.segment());
        true
    }

    #[inline]
    pub fn get_ticks(&mut self, position: i64) -> i64 {
        self.advance(position);
        position + self.difference
    }

    pub fn get_date_time(&mut self, position: i64) -> NaiveDateTime {
        ticks::to_naive(self.get_ticks(position))
    }

    pub fn get_instant(&mut self, position: i64) -> DateTime<FixedOffset> {
        let utc = self.get_ticks(position);
        DateTime::from_naive_utc_and_offset(ticks::to_naive(utc), fixed_offset(0))
    }
}

/// UTC ticks to zone-local ticks.
pub struct FromUtcIterator {
    calculator: Arc<TimeZoneCalculator>,
    difference: i64,
    start: i64,
    end: i64,
}

impl FromUtcIterator {
    pub fn new(to: Tz) -> Self {
        Self {
            calculator: TimeZoneCalculator::get(to),
            difference: 0,
            start: i64::MIN,
            end: i64::MIN,
        }
    }

    pub fn from_zone(&self) -> Tz {
        Tz::UTC
    }

    pub fn to_zone(&self) -> Tz {
        self.calculator.zone()
    }

    /// Zone-local minus UTC ticks, i.e. the zone's offset at the last position.
    #[inline]
    pub fn difference(&self) -> i64 {
        self.difference
    }

    #[inline]
    pub fn advance(&mut self, position: i64) -> bool {
        debug_assert!(
            position >= self.start,
            "conversion iterator positions must be non-decreasing: {} before segment start {}",
            position,
            self.start
        );
        if position < self.end {
            return false;
        }
        let segment = self.calculator.get_segment(position, Clock::Utc);
        self.difference = segment.offset;
        self.start = segment.start;
        self.end = segment.end;
        true
    }

    /// Forgets the tracked segment so the next `advance` queries again.
    #[inline]
    fn rewind(&mut self) {
        self.start = i64::MIN;
        self.end = i64::MIN;
    }

    #[inline]
    pub fn get_ticks(&mut self, position: i64) -> i64 {
        self.advance(position);
        position + self.difference
    }

    pub fn get_date_time(&mut self, position: i64) -> NaiveDateTime {
        ticks::to_naive(self.get_ticks(position))
    }

    pub fn get_instant(&mut self, position: i64) -> DateTime<FixedOffset> {
        self.advance(position);
        DateTime::from_naive_utc_and_offset(
            ticks::to_naive(position),
            fixed_offset(self.difference),
        )
    }
}

/// Zone-local ticks in one zone to zone-local ticks in another, via UTC.
pub struct DualZoneIterator {
    to_utc: ToUtcIterator,
    from_utc: FromUtcIterator,
    difference: i64,
}

impl DualZoneIterator {
    pub fn new(from: Tz, to: Tz) -> Self {
        Self {
            to_utc: ToUtcIterator::new(from),
            from_utc: FromUtcIterator::new(to),
            difference: 0,
        }
    }

    pub fn from_zone(&self) -> Tz {
        self.to_utc.from_zone()
    }

    pub fn to_zone(&self) -> Tz {
        self.from_utc.to_zone()
    }

    #[inline]
    pub fn difference(&self) -> i64 {
        self.difference
    }

    /// Moves to `position` (source wall-clock ticks).
    ///
    /// A gap resolves with the pre-transition offset, so the first real wall
    /// time after it maps to an earlier instant than the gap did. The UTC side
    /// is re-queried when that happens.
    #[inline]
    pub fn advance(&mut self, position: i64) -> bool {
        let changed = self.to_utc.advance(position);
        let utc = position + self.to_utc.difference();
        if utc < self.from_utc.start {
            self.from_utc.rewind();
        }
        let changed = self.from_utc.advance(utc) || changed;
        if changed {
            self.difference = self.to_utc.difference() + self.from_utc.difference();
        }
        changed
    }

    #[inline]
    pub fn get_ticks(&mut self, position: i64) -> i64 {
        self.advance(position);
        position + self.difference
    }

    pub fn get_date_time(&mut self, position: i64) -> NaiveDateTime {
        ticks::to_naive(self.get_ticks(position))
    }

    pub fn get_instant(&mut self, position: i64) -> DateTime<FixedOffset> {
        self.advance(position);
        let utc = position + self.to_utc.difference();
        DateTime::from_naive_utc_and_offset(
            ticks::to_naive(utc),
            fixed_offset(self.from_utc.difference()),
        )
    }
}

/// Any of the three iterators, picked by [`ConversionIterator::create`].
pub enum ConversionIterator {
    ToUtc(ToUtcIterator),
    FromUtc(FromUtcIterator),
    Dual(DualZoneIterator),
}

impl ConversionIterator {
    /// An iterator converting `from` wall-clock ticks into `to` wall-clock
    /// ticks. Either side being UTC gives the single-hop variant.
    ///
    /// Aliases of UTC such as `Etc/UTC` or `Zulu` count as UTC, so two of them
    /// are the same zone.
    pub fn create(from: Tz, to: Tz) -> Result<Self> {
        if from == to || (is_utc(from) && is_utc(to)) {
            return Err(Error::SameZone(from.name()));
        }
        if is_utc(from) {
            return Ok(ConversionIterator::FromUtc(FromUtcIterator::new(to)));
        }
        if is_utc(to) {
            return Ok(ConversionIterator::ToUtc(ToUtcIterator::new(from)));
        }
        Ok(ConversionIterator::Dual(DualZoneIterator::new(from, to)))
    }

    pub fn to_utc(from: Tz) -> Result<ToUtcIterator> {
        if is_utc(from) {
            return Err(Error::AlreadyUtc(from.name()));
        }
        Ok(ToUtcIterator::new(from))
    }

    pub fn from_utc(to: Tz) -> Result<FromUtcIterator> {
        if is_utc(to) {
            return Err(Error::AlreadyUtc(to.name()));
        }
        Ok(FromUtcIterator::new(to))
    }

    pub fn from_zone(&self) -> Tz {
        match self {
            ConversionIterator::ToUtc(it) => it.from_zone(),
            ConversionIterator::FromUtc(it) => it.from_zone(),
            ConversionIterator::Dual(it) => it.from_zone(),
        }
    }

    pub fn to_zone(&self) -> Tz {
        match self {
            ConversionIterator::ToUtc(it) => it.to_zone(),
            ConversionIterator::FromUtc(it) => it.to_zone(),
            ConversionIterator::Dual(it) => it.to_zone(),
        }
    }

    #[inline]
    pub fn difference(&self) -> i64 {
        match self {
            ConversionIterator::ToUtc(it) => it.difference(),
            ConversionIterator::FromUtc(it) => it.difference(),
            ConversionIterator::Dual(it) => it.difference(),
        }
    }

    #[inline]
    pub fn advance(&mut self, position: i64) -> bool {
        match self {
            ConversionIterator::ToUtc(it) => it.advance(position),
            ConversionIterator::FromUtc(it) => it.advance(position),
            ConversionIterator::Dual(it) => it.advance(position),
        }
    }

    #[inline]
    pub fn get_ticks(&mut self, position: i64) -> i64 {
        self.advance(position);
        position + self.difference()
    }

    pub fn get_date_time(&mut self, position: i64) -> NaiveDateTime {
        ticks::to_naive(self.get_ticks(position))
    }

    pub fn get_instant(&mut self, position: i64) -> DateTime<FixedOffset> {
        match self {
            ConversionIterator::ToUtc(it) => it.get_instant(position),
            ConversionIterator::FromUtc(it) => it.get_instant(position),
            ConversionIterator::Dual(it) => it.get_instant(position),
        }
    }
}

impl From<ToUtcIterator> for ConversionIterator {
    fn from(it: ToUtcIterator) -> Self {
        ConversionIterator::ToUtc(it)
    }
}

impl From<FromUtcIterator> for ConversionIterator {
    fn from(it: FromUtcIterator) -> Self {
        ConversionIterator::FromUtc(it)
    }
}

impl From<DualZoneIterator> for ConversionIterator {
    fn from(it: DualZoneIterator) -> Self {
        ConversionIterator::Dual(it)
    }
}

/// Offset of the closest segment before `overlap` that is not itself part of
/// an overlap.
fn offset_before_overlap<R: ZoneRules>(overlap: &SegmentRef<'_, R>) -> i64 {
    let mut segment = overlap.previous();
    while segment.is_overlap {
        segment = segment.previous();
    }
    segment.offset
}

/// UTC itself or one of its database aliases.
pub(crate) fn is_utc(tz: Tz) -> bool {
    matches!(
        tz.name(),
        "UTC" | "Etc/UTC" | "Etc/UCT" | "Etc/Universal" | "Etc/Zulu" | "UCT" | "Universal" | "Zulu"
    )
}

fn fixed_offset(offset_ticks: i64) -> FixedOffset {
    i32::try_from(offset_ticks / TICKS_PER_SECOND)
        .ok()
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}
