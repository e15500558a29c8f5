// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Per-zone entry point.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::{
    config::SearchConfig,
    conversion::is_utc,
    error::{Error, Result},
    publish::PublishMap,
    rules::ZoneRules,
    segment::{Clock, SegmentRef},
    store::SegmentStore,
    ticks,
};

/// One calculator per zone name, for the lifetime of the process.
static CALCULATORS: Lazy<PublishMap<&'static str, Arc<TimeZoneCalculator>>> =
    Lazy::new(PublishMap::new);

/// Fast offset lookups for a single zone.
///
/// Holds one segment store keyed by UTC ticks and one keyed by zone-local
/// ticks. Use [`TimeZoneCalculator::get`] to share the process-wide instance.
pub struct TimeZoneCalculator<R = Tz> {
    utc: SegmentStore<R>,
    local: SegmentStore<R>,
}

impl TimeZoneCalculator<Tz> {
    /// The shared calculator for `tz`, created on first use.
    pub fn get(tz: Tz) -> Arc<TimeZoneCalculator> {
        let name = tz.name();
        CALCULATORS.get_or_publish(name, || {
            debug!("Creating timezone calculator for {}", name);
            Arc::new(TimeZoneCalculator::new(tz))
        })
    }

    /// Like [`get`](Self::get), looking the zone up by its IANA name.
    pub fn get_by_name(name: &str) -> Result<Arc<TimeZoneCalculator>> {
        let tz: Tz = name
            .parse()
            .map_err(|_| Error::UnknownZone(name.to_string()))?;
        Ok(Self::get(tz))
    }

    /// Converts `ticks` read on `from`'s wall clock to `to`'s wall clock,
    /// going through UTC. Ambiguous and nonexistent source times resolve with
    /// the standard offset.
    pub fn convert(from: Tz, to: Tz, ticks: i64) -> i64 {
        if from == to {
            return ticks;
        }
        let utc_ticks = if is_utc(from) {
            ticks
        } else {
            Self::get(from).to_utc_ticks(ticks)
        };
        if is_utc(to) {
            utc_ticks
        } else {
            Self::get(to).to_zone_ticks(utc_ticks)
        }
    }

    #[inline]
    pub fn zone(&self) -> Tz {
        *self.utc.rules()
    }
}

impl<R: ZoneRules + Clone> TimeZoneCalculator<R> {
    /// A calculator using the process-wide search configuration. Building one
    /// directly does not register it in the cache behind [`get`](TimeZoneCalculator::get).
    pub fn new(rules: R) -> Self {
        Self::with_config(rules, *SearchConfig::global())
    }

    pub fn with_config(rules: R, config: SearchConfig) -> Self {
        Self {
            utc: SegmentStore::with_config(rules.clone(), Clock::Utc, config),
            local: SegmentStore::with_config(rules, Clock::Local, config),
        }
    }
}

impl<R: ZoneRules> TimeZoneCalculator<R> {
    pub fn rules(&self) -> &R {
        self.utc.rules()
    }

    /// The segment active at `ticks` read on `clock`. Its bounds are
    /// expressed on the same clock.
    #[inline]
    pub fn get_segment(&self, ticks: i64, clock: Clock) -> SegmentRef<'_, R> {
        self.store(clock).segment_at(ticks)
    }

    pub fn segment_at_utc(&self, instant: &DateTime<Utc>) -> Option<SegmentRef<'_, R>> {
        let ticks = ticks::from_naive(&instant.naive_utc())?;
        Some(self.utc.segment_at(ticks))
    }

    #[inline]
    pub fn offset_at_utc(&self, utc_ticks: i64) -> i64 {
        self.utc.segment_at(utc_ticks).offset
    }

    #[inline]
    pub fn to_zone_ticks(&self, utc_ticks: i64) -> i64 {
        utc_ticks + self.utc.segment_at(utc_ticks).offset
    }

    /// Wall-clock ticks to UTC. Times inside a gap or an overlap use the
    /// segment's standard offset.
    #[inline]
    pub fn to_utc_ticks(&self, zone_ticks: i64) -> i64 {
        zone_ticks - self.local.segment_at(zone_ticks).offset
    }

    #[inline]
    pub fn store(&self, clock: Clock) -> &SegmentStore<R> {
        match clock {
            Clock::Utc => &self.utc,
            Clock::Local => &self.local,
        }
    }
}
