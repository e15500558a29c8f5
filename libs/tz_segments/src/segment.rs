// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, ops::Deref, str::FromStr, sync::Arc};

use crate::{
    error::Error,
    rules::ZoneRules,
    store::{Bucket, SegmentStore},
};

/// The clock a tick value is read on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clock {
    /// Absolute time.
    Utc,
    /// Wall-clock time in the zone that owns the segment.
    Local,
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clock::Utc => f.write_str("utc"),
            Clock::Local => f.write_str("local"),
        }
    }
}

impl FromStr for Clock {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utc" => Ok(Clock::Utc),
            "local" | "zone" | "timezone" => Ok(Clock::Local),
            _ => Err(Error::UnknownClock(s.to_string())),
        }
    }
}

/// A maximal span `[start, end)` over which a zone's offset and gap/overlap
/// status do not change.
///
/// `start` and `end` are read on `clock`. A bucket boundary always closes a
/// segment, so two neighbours may carry identical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub clock: Clock,
    /// Inclusive.
    pub start: i64,
    /// Exclusive. Also the start of the next segment.
    pub end: i64,
    /// Ticks added to UTC to get zone-local time. Gaps carry the offset from
    /// before the transition and overlaps the offset from after it.
    pub offset: i64,
    /// Local clock only: these wall-clock times never happen.
    pub is_gap: bool,
    /// Local clock only: these wall-clock times happen twice.
    pub is_overlap: bool,
}

impl Segment {
    #[inline]
    pub fn contains(&self, ticks: i64) -> bool {
        self.start <= ticks && ticks < self.end
    }

    #[inline]
    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Gap or overlap.
    #[inline]
    pub fn is_anomalous(&self) -> bool {
        self.is_gap || self.is_overlap
    }
}

/// A cached segment plus the handle needed to walk to its neighbours.
///
/// Neighbours are resolved by position inside the owning bucket, falling
/// through to the adjacent bucket at the edges.
pub struct SegmentRef<'a, R: ZoneRules> {
    store: &'a SegmentStore<R>,
    bucket: Arc<Bucket>,
    index: usize,
}

impl<'a, R: ZoneRules> SegmentRef<'a, R> {
    pub(crate) fn new(store: &'a SegmentStore<R>, bucket: Arc<Bucket>, index: usize) -> Self {
        Self {
            store,
            bucket,
            index,
        }
    }

    #[inline]
    pub fn segment(&self) -> Segment {
        self.bucket.segments[self.index]
    }

    /// The segment starting at this one's `end`.
    pub fn next(&self) -> SegmentRef<'a, R> {
        // Buckets are ordered newest first.
        match self.index.checked_sub(1) {
            Some(index) => SegmentRef::new(self.store, Arc::clone(&self.bucket), index),
            None => self.store.segment_at(self.end),
        }
    }

    /// The segment ending at this one's `start`.
    pub fn previous(&self) -> SegmentRef<'a, R> {
        let index = self.index + 1;
        if index < self.bucket.segments.len() {
            SegmentRef::new(self.store, Arc::clone(&self.bucket), index)
        } else {
            self.store.segment_at(self.start - 1)
        }
    }

    /// Index of the bucket this segment was built in.
    pub fn bucket_index(&self) -> i64 {
        self.bucket.index
    }
}

impl<R: ZoneRules> Deref for SegmentRef<'_, R> {
    type Target = Segment;

    #[inline]
    fn deref(&self) -> &Segment {
        &self.bucket.segments[self.index]
    }
}

impl<R: ZoneRules> Clone for SegmentRef<'_, R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            bucket: Arc::clone(&self.bucket),
            index: self.index,
        }
    }
}

impl<R: ZoneRules> fmt::Debug for SegmentRef<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentRef")
            .field("zone", &self.store.rules().id())
            .field("bucket", &self.bucket.index)
            .field("segment", &**self)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock() {
        assert_eq!("utc".parse::<Clock>().unwrap(), Clock::Utc);
        assert_eq!("UTC".parse::<Clock>().unwrap(), Clock::Utc);
        assert_eq!("Local".parse::<Clock>().unwrap(), Clock::Local);
        assert_eq!("timezone".parse::<Clock>().unwrap(), Clock::Local);
        assert_eq!(
            "tai".parse::<Clock>(),
            Err(Error::UnknownClock("tai".to_string()))
        );
    }

    #[test]
    fn test_clock_display_round_trips() {
        for clock in [Clock::Utc, Clock::Local] {
            assert_eq!(clock.to_string().parse::<Clock>().unwrap(), clock);
        }
    }

    #[test]
    fn test_contains_is_half_open() {
        let segment = Segment {
            clock: Clock::Utc,
            start: 10,
            end: 20,
            offset: 0,
            is_gap: false,
            is_overlap: false,
        };
        assert!(segment.contains(10));
        assert!(segment.contains(19));
        assert!(!segment.contains(20));
        assert!(!segment.contains(9));
        assert_eq!(segment.len(), 10);
        assert!(!segment.is_empty());
    }
}
