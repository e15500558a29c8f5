// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Comparison tests between chrono-tz and the cached segments.
//!
//! Every offset answered from a segment must match what chrono-tz reports for
//! the same instant.

use chrono::{DateTime, NaiveDate, Offset};
use chrono_tz::Tz;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tz_segments::{
    ticks::{self, TICKS_PER_MINUTE, TICKS_PER_SECOND},
    Clock, TimeZoneCalculator,
};

const ZONES: [&str; 16] = [
    "America/New_York",
    "America/Chicago",
    "America/Los_Angeles",
    "America/Sao_Paulo",
    "America/St_Johns",
    "Europe/London",
    "Europe/Paris",
    "Europe/Moscow",
    "Asia/Tokyo",
    "Asia/Kolkata",
    "Asia/Kathmandu",
    "Asia/Tehran",
    "Australia/Sydney",
    "Australia/Adelaide",
    "Australia/Lord_Howe",
    "Pacific/Auckland",
];

/// Offset in ticks using chrono-tz
fn chrono_tz_offset(tz: Tz, timestamp_secs: i64) -> i64 {
    let utc = DateTime::from_timestamp(timestamp_secs, 0).unwrap();
    let local = utc.with_timezone(&tz);
    i64::from(local.offset().fix().local_minus_utc()) * TICKS_PER_SECOND
}

fn assert_offsets_match(tz: Tz, timestamp_secs: i64, label: &str) {
    let calculator = TimeZoneCalculator::get(tz);
    let ours = calculator.offset_at_utc(ticks::from_unix_seconds(timestamp_secs));
    let chrono = chrono_tz_offset(tz, timestamp_secs);
    assert_eq!(
        chrono,
        ours,
        "Offset mismatch for {} at {} (ts={}): chrono-tz={}, segments={}",
        tz.name(),
        label,
        timestamp_secs,
        chrono,
        ours
    );
}

fn test_timezone_comprehensive(tz_name: &str) {
    let tz: Tz = tz_name.parse().unwrap();
    for year in [
        1970, 1975, 1980, 1985, 1990, 1995, 2000, 2005, 2006, 2007, 2008, 2010, 2015, 2020, 2024,
        2030,
    ] {
        for (month, day) in [
            (1, 1),
            (2, 15),
            (3, 10),
            (3, 31),
            (4, 15),
            (6, 15),
            (7, 15),
            (9, 1),
            (10, 1),
            (10, 31),
            (11, 15),
            (12, 31),
        ] {
            for hour in [0, 6, 12, 18] {
                let ts = NaiveDate::from_ymd_opt(year, month, day)
                    .unwrap()
                    .and_hms_opt(hour, 0, 0)
                    .unwrap()
                    .and_utc()
                    .timestamp();
                let label = format!("{}-{:02}-{:02} {:02}:00", year, month, day, hour);
                assert_offsets_match(tz, ts, &label);
            }
        }
    }
}

#[test]
fn test_all_zones_across_years() {
    for zone in ZONES {
        test_timezone_comprehensive(zone);
    }
}

#[test]
fn test_transition_minutes() {
    // Every UTC-clock segment boundary must be a real transition: chrono-tz
    // agrees on both sides of it.
    for zone in ZONES {
        let tz: Tz = zone.parse().unwrap();
        let calculator = TimeZoneCalculator::get(tz);
        let from = ticks::from_unix_seconds(946_684_800); // 2000-01-01
        let until = ticks::from_unix_seconds(1_893_456_000); // 2030-01-01
        let mut segment = calculator.get_segment(from, Clock::Utc);
        while segment.end < until {
            let boundary = ticks::to_unix_seconds(segment.end);
            let next = segment.next();
            assert_eq!(
                segment.offset,
                chrono_tz_offset(tz, boundary - 1),
                "{} before {}",
                zone,
                boundary
            );
            assert_eq!(
                next.offset,
                chrono_tz_offset(tz, boundary),
                "{} at {}",
                zone,
                boundary
            );
            segment = next;
        }
    }
}

#[test]
fn test_random_instants_match_chrono_tz() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let low = 0; // 1970-01-01
    let high = 2_208_988_800; // 2040-01-01
    for _ in 0..20_000 {
        let tz: Tz = ZONES[rng.gen_range(0..ZONES.len())].parse().unwrap();
        let ts = rng.gen_range(low..high);
        assert_offsets_match(tz, ts, "random instant");
    }
}

#[test]
fn test_random_ticks_are_covered_once() {
    let mut rng = StdRng::seed_from_u64(42);
    let low = ticks::from_unix_seconds(-2_208_988_800); // 1900-01-01
    let high = ticks::from_unix_seconds(4_102_444_800); // 2100-01-01
    for _ in 0..5_000 {
        let tz: Tz = ZONES[rng.gen_range(0..ZONES.len())].parse().unwrap();
        let clock = if rng.gen_bool(0.5) { Clock::Utc } else { Clock::Local };
        let at = rng.gen_range(low..high);
        let calculator = TimeZoneCalculator::get(tz);
        let segment = calculator.get_segment(at, clock);
        assert!(segment.contains(at), "{} {} tick {}", tz.name(), clock, at);
        assert_eq!(segment.next().start, segment.end);
        assert_eq!(segment.previous().end, segment.start);
    }
}

#[test]
fn test_round_trip_outside_anomalies() {
    let mut rng = StdRng::seed_from_u64(7);
    let low = ticks::from_unix_seconds(0);
    let high = ticks::from_unix_seconds(2_208_988_800);
    let mut checked = 0;
    while checked < 10_000 {
        let tz: Tz = ZONES[rng.gen_range(0..ZONES.len())].parse().unwrap();
        let calculator = TimeZoneCalculator::get(tz);
        let utc = rng.gen_range(low..high) / TICKS_PER_MINUTE * TICKS_PER_MINUTE;
        let local = calculator.to_zone_ticks(utc);
        let local_segment = calculator.get_segment(local, Clock::Local);
        if local_segment.is_anomalous() {
            continue;
        }
        assert_eq!(calculator.to_utc_ticks(local), utc, "{} at {}", tz.name(), utc);
        assert_eq!(local_segment.offset, calculator.offset_at_utc(utc));
        checked += 1;
    }
}
