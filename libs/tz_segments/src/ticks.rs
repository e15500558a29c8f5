// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Tick arithmetic.
//!
//! A tick is 100 nanoseconds. Tick zero is `0001-01-01T00:00:00` on whichever
//! clock the value is expressed in, so the same `i64` can mean a UTC instant or
//! a wall-clock reading in some zone. The meaning is carried alongside the value
//! as a [`Clock`](crate::Clock).

use chrono::{DateTime, NaiveDateTime};

pub const TICKS_PER_SECOND: i64 = 10_000_000;
pub const TICKS_PER_MINUTE: i64 = 60 * TICKS_PER_SECOND;
pub const TICKS_PER_HOUR: i64 = 60 * TICKS_PER_MINUTE;
pub const TICKS_PER_DAY: i64 = 24 * TICKS_PER_HOUR;

/// Ticks at `1970-01-01T00:00:00`.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// Width of one cache bucket. Roughly a year, aligned to tick zero.
pub const BUCKET_TICKS: i64 = 365 * TICKS_PER_DAY;

const NANOS_PER_TICK: i64 = 100;

/// Bucket containing `ticks`.
#[inline]
pub fn bucket_index(ticks: i64) -> i64 {
    ticks.div_euclid(BUCKET_TICKS)
}

/// Half-open tick range `[start, end)` covered by bucket `index`.
#[inline]
pub fn bucket_bounds(index: i64) -> (i64, i64) {
    let start = index.saturating_mul(BUCKET_TICKS);
    (start, start.saturating_add(BUCKET_TICKS))
}

/// Reads `ticks` as a calendar datetime.
///
/// Values chrono cannot represent clamp to [`NaiveDateTime::MIN`] or
/// [`NaiveDateTime::MAX`].
pub fn to_naive(ticks: i64) -> NaiveDateTime {
    let unix = ticks.saturating_sub(UNIX_EPOCH_TICKS);
    let secs = unix.div_euclid(TICKS_PER_SECOND);
    let nanos = (unix.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK) as u32;
    match DateTime::from_timestamp(secs, nanos) {
        Some(dt) => dt.naive_utc(),
        None if ticks < 0 => NaiveDateTime::MIN,
        None => NaiveDateTime::MAX,
    }
}

/// Ticks for a calendar datetime, or `None` if it does not fit in an `i64`.
pub fn from_naive(dt: &NaiveDateTime) -> Option<i64> {
    let utc = dt.and_utc();
    utc.timestamp()
        .checked_mul(TICKS_PER_SECOND)?
        .checked_add(i64::from(utc.timestamp_subsec_nanos()) / NANOS_PER_TICK)?
        .checked_add(UNIX_EPOCH_TICKS)
}

#[inline]
pub fn from_unix_seconds(secs: i64) -> i64 {
    secs.saturating_mul(TICKS_PER_SECOND)
        .saturating_add(UNIX_EPOCH_TICKS)
}

#[inline]
pub fn to_unix_seconds(ticks: i64) -> i64 {
    ticks.saturating_sub(UNIX_EPOCH_TICKS).div_euclid(TICKS_PER_SECOND)
}
