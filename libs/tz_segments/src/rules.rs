// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The timezone database boundary.
//!
//! Segment construction only ever asks one question: what offset applies at
//! this tick, and is the tick a gap or an overlap. [`ZoneRules`] is that
//! question; [`chrono_tz::Tz`] answers it from the bundled IANA database.

use chrono::{LocalResult, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::{
    segment::Clock,
    ticks::{self, TICKS_PER_SECOND},
};

/// Offset and anomaly status at a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetState {
    /// Ticks added to UTC to get zone-local time. Gaps carry the offset from
    /// before the transition and overlaps the one from after it, which is the
    /// standard offset in zones that observe daylight saving in summer.
    pub offset: i64,
    pub is_gap: bool,
    pub is_overlap: bool,
}

impl OffsetState {
    #[inline]
    pub fn regular(offset: i64) -> Self {
        Self {
            offset,
            is_gap: false,
            is_overlap: false,
        }
    }
}

/// Source of truth for a single zone.
///
/// UTC-clock queries must never report a gap or an overlap. Answers must be
/// stable for the lifetime of the process since built segments are cached
/// forever.
pub trait ZoneRules: Send + Sync {
    /// Stable identifier, used for cache keys and diagnostics.
    fn id(&self) -> &str;

    fn offset_state(&self, ticks: i64, clock: Clock) -> OffsetState;
}

impl ZoneRules for Tz {
    fn id(&self) -> &str {
        self.name()
    }

    fn offset_state(&self, ticks: i64, clock: Clock) -> OffsetState {
        let at = ticks::to_naive(ticks);
        match clock {
            Clock::Utc => OffsetState::regular(seconds_to_ticks(
                self.offset_from_utc_datetime(&at).fix().local_minus_utc(),
            )),
            Clock::Local => match self.offset_from_local_datetime(&at) {
                LocalResult::Single(offset) => {
                    OffsetState::regular(seconds_to_ticks(offset.fix().local_minus_utc()))
                },
                // Some zones code winter time as negative DST, so
                // `base_utc_offset` is not the winter offset there.
                LocalResult::Ambiguous(_, later) => OffsetState {
                    offset: seconds_to_ticks(later.fix().local_minus_utc()),
                    is_gap: false,
                    is_overlap: true,
                },
                LocalResult::None => {
                    // Read the wall time as UTC and step back a day: that
                    // instant is before the transition for any real offset.
                    let before = at.checked_sub_signed(TimeDelta::days(1)).unwrap_or(at);
                    let offset = self.offset_from_utc_datetime(&before).fix();
                    OffsetState {
                        offset: seconds_to_ticks(offset.local_minus_utc()),
                        is_gap: true,
                        is_overlap: false,
                    }
                },
            },
        }
    }
}

#[inline]
fn seconds_to_ticks(seconds: i32) -> i64 {
    i64::from(seconds) * TICKS_PER_SECOND
}
