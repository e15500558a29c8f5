// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Per-(zone, clock) segment cache.
//!
//! The tick axis is cut into year-sized buckets. The first query landing in a
//! bucket partitions the whole bucket with a coarse-to-fine scan:
//!
//! 1. Probe one coarse step (a week by default) ahead of the current segment
//!    end. Same state: extend the segment and repeat.
//! 2. Different state: the transition is inside the last step. Walk forward
//!    one fine step (a minute by default) at a time until the state flips and
//!    start a new segment at that tick.
//! 3. The bucket end closes whatever segment is open.
//!
//! Most zones have at most two transitions a year, so a bucket costs about
//! fifty coarse probes plus a bounded fine walk per transition.

use std::sync::Arc;

use tracing::{debug, error};

use crate::{
    config::SearchConfig,
    publish::PublishMap,
    rules::{OffsetState, ZoneRules},
    segment::{Clock, Segment, SegmentRef},
    ticks,
};

/// The partition of one bucket, newest segment first so that the first
/// segment starting at or before a tick is the one containing it.
pub(crate) struct Bucket {
    pub(crate) index: i64,
    pub(crate) segments: Vec<Segment>,
}

pub struct SegmentStore<R> {
    rules: R,
    clock: Clock,
    config: SearchConfig,
    buckets: PublishMap<i64, Arc<Bucket>>,
}

impl<R: ZoneRules> SegmentStore<R> {
    pub fn new(rules: R, clock: Clock) -> Self {
        Self::with_config(rules, clock, *SearchConfig::global())
    }

    pub fn with_config(rules: R, clock: Clock, config: SearchConfig) -> Self {
        Self {
            rules,
            clock,
            config,
            buckets: PublishMap::new(),
        }
    }

    #[inline]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[inline]
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Number of buckets built so far.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The segment containing `ticks`, building its bucket if needed.
    ///
    /// # Panics
    ///
    /// If the built bucket does not cover `ticks`. That is a bug in bucket
    /// construction, not a caller error.
    pub fn segment_at(&self, ticks: i64) -> SegmentRef<'_, R> {
        let bucket = self.bucket(ticks::bucket_index(ticks));
        match bucket.segments.iter().position(|s| s.start <= ticks) {
            Some(index) => SegmentRef::new(self, bucket, index),
            None => {
                error!(
                    "No segment contains tick {} ({} clock, zone {}, bucket {})",
                    ticks,
                    self.clock,
                    self.rules.id(),
                    bucket.index
                );
                panic!(
                    "segment partition broken: tick {} not covered by bucket {} of {} ({})",
                    ticks,
                    bucket.index,
                    self.rules.id(),
                    self.clock
                );
            },
        }
    }

    /// Chronological copy of the segments in bucket `index`.
    pub fn segments_in_bucket(&self, index: i64) -> Vec<Segment> {
        let bucket = self.bucket(index);
        bucket.segments.iter().rev().copied().collect()
    }

    fn bucket(&self, index: i64) -> Arc<Bucket> {
        self.buckets
            .get_or_publish(index, || Arc::new(self.build(index)))
    }

    fn build(&self, index: i64) -> Bucket {
        let (bucket_start, bucket_end) = ticks::bucket_bounds(index);
        let coarse_step = self.config.coarse_step();
        let fine_step = self.config.fine_step();

        let mut segments = Vec::with_capacity(4);
        let mut state = self.query(bucket_start);
        let mut start = bucket_start;
        let mut end = bucket_start;

        while end < bucket_end {
            let probe = end.saturating_add(coarse_step).min(bucket_end);
            if self.query(probe) == state {
                end = probe;
                continue;
            }

            loop {
                end = end.saturating_add(fine_step).min(bucket_end);
                if end == bucket_end {
                    break;
                }
                let next = self.query(end);
                if next != state {
                    segments.push(self.segment(start, end, state));
                    start = end;
                    state = next;
                    break;
                }
            }
        }
        segments.push(self.segment(start, bucket_end, state));
        segments.reverse();

        debug!(
            "Built {} segment(s) for {} ({} clock) bucket {}",
            segments.len(),
            self.rules.id(),
            self.clock,
            index
        );

        Bucket { index, segments }
    }

    #[inline]
    fn query(&self, ticks: i64) -> OffsetState {
        self.rules.offset_state(ticks, self.clock)
    }

    fn segment(&self, start: i64, end: i64, state: OffsetState) -> Segment {
        Segment {
            clock: self.clock,
            start,
            end,
            offset: state.offset,
            is_gap: state.is_gap,
            is_overlap: state.is_overlap,
        }
    }
}
