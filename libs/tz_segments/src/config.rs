// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Boundary search tuning.

use std::env;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::ticks::{TICKS_PER_DAY, TICKS_PER_MINUTE, TICKS_PER_SECOND};

pub const ENV_TZ_SEGMENTS_COARSE_STEP_MINUTES: &str = "TZ_SEGMENTS_COARSE_STEP_MINUTES";
pub const ENV_TZ_SEGMENTS_FINE_STEP_SECONDS: &str = "TZ_SEGMENTS_FINE_STEP_SECONDS";

const DEFAULT_COARSE_STEP: i64 = 7 * TICKS_PER_DAY;
const DEFAULT_FINE_STEP: i64 = TICKS_PER_MINUTE;

static GLOBAL: Lazy<SearchConfig> = Lazy::new(SearchConfig::from_env);

/// Step sizes used while partitioning a bucket into segments.
///
/// The coarse step bounds how far apart two transitions must be for both to be
/// found; the fine step is the resolution at which a transition is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    coarse_step: i64,
    fine_step: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            coarse_step: DEFAULT_COARSE_STEP,
            fine_step: DEFAULT_FINE_STEP,
        }
    }
}

impl SearchConfig {
    /// Steps are in ticks. Non-positive values fall back to the defaults and a
    /// coarse step below the fine step is raised to it.
    pub fn new(coarse_step: i64, fine_step: i64) -> Self {
        let fine_step = if fine_step > 0 {
            fine_step
        } else {
            DEFAULT_FINE_STEP
        };
        let coarse_step = if coarse_step > 0 {
            coarse_step
        } else {
            DEFAULT_COARSE_STEP
        };
        Self {
            coarse_step: coarse_step.max(fine_step),
            fine_step,
        }
    }

    /// Configuration shared by every calculator handed out by
    /// [`TimeZoneCalculator::get`](crate::TimeZoneCalculator::get). Read from
    /// the environment once.
    pub fn global() -> &'static SearchConfig {
        &GLOBAL
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let coarse = read_positive(&lookup, ENV_TZ_SEGMENTS_COARSE_STEP_MINUTES)
            .and_then(|minutes| minutes.checked_mul(TICKS_PER_MINUTE))
            .unwrap_or(DEFAULT_COARSE_STEP);
        let fine = read_positive(&lookup, ENV_TZ_SEGMENTS_FINE_STEP_SECONDS)
            .and_then(|seconds| seconds.checked_mul(TICKS_PER_SECOND))
            .unwrap_or(DEFAULT_FINE_STEP);
        Self::new(coarse, fine)
    }

    #[inline]
    pub fn coarse_step(&self) -> i64 {
        self.coarse_step
    }

    #[inline]
    pub fn fine_step(&self) -> i64 {
        self.fine_step
    }
}

fn read_positive<F>(lookup: &F, name: &str) -> Option<i64>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name)?;
    match value.trim().parse::<i64>() {
        Ok(parsed) if parsed > 0 => Some(parsed),
        _ => {
            warn!("Ignoring {}={:?}, expected a positive integer", name, value);
            None
        },
    }
}
