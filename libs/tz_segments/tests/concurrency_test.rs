// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{
    sync::{Arc, Barrier},
    thread,
};

use chrono_tz::Tz;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tz_segments::{
    ticks, Clock, ConversionIterator, SearchConfig, Segment, SegmentStore, TimeZoneCalculator,
};

const THREADS: usize = 8;

#[test]
fn test_racing_threads_see_one_partition() {
    let store =
        SegmentStore::with_config(Tz::Europe__Berlin, Clock::Local, SearchConfig::default());
    let barrier = Barrier::new(THREADS);
    let at = ticks::from_unix_seconds(1_700_000_000);
    let bucket = ticks::bucket_index(at);
    let (start, end) = ticks::bucket_bounds(bucket);

    let seen: Vec<Vec<Segment>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let store = &store;
                let barrier = &barrier;
                s.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(i as u64);
                    barrier.wait();
                    let mut segments: Vec<Segment> = (0..1_000)
                        .map(|_| store.segment_at(rng.gen_range(start..end)).segment())
                        .collect();
                    segments.sort_by_key(|segment| segment.start);
                    segments.dedup();
                    segments
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(store.bucket_count(), 1);
    let partition = store.segments_in_bucket(bucket);
    assert_eq!(partition.first().unwrap().start, start);
    assert_eq!(partition.last().unwrap().end, end);
    for segments in seen {
        for segment in segments {
            assert!(partition.contains(&segment));
        }
    }
}

#[test]
fn test_shared_calculator_across_threads() {
    let barrier = Barrier::new(THREADS);
    let calculators: Vec<Arc<TimeZoneCalculator>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    TimeZoneCalculator::get(Tz::America__Halifax)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for calculator in &calculators[1..] {
        assert!(Arc::ptr_eq(&calculators[0], calculator));
    }
    assert!(Arc::ptr_eq(
        &calculators[0],
        &TimeZoneCalculator::get_by_name("America/Halifax").unwrap()
    ));
}

#[test]
fn test_iterators_per_thread() {
    let start = ticks::from_unix_seconds(1_577_836_800); // 2020-01-01
    let step = 11 * ticks::TICKS_PER_MINUTE;
    thread::scope(|s| {
        for zone in [Tz::Europe__Dublin, Tz::America__Denver, Tz::Pacific__Auckland] {
            s.spawn(move || {
                let calculator = TimeZoneCalculator::get(zone);
                let mut it = ConversionIterator::create(Tz::UTC, zone).unwrap();
                for i in 0..100_000 {
                    let utc = start + i * step;
                    assert_eq!(it.get_ticks(utc), calculator.to_zone_ticks(utc));
                }
            });
        }
    });
}
