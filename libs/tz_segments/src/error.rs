// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Usage errors reported at construction time.
//!
//! Ambiguous and nonexistent wall-clock times are resolved, never rejected, so
//! they have no variant here. A point query that finds no segment in a built
//! bucket means the partition is broken; that panics instead.

/// Errors returned by the fallible constructors of this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("cannot convert {0} to itself, the source and destination timezones must differ")]
    SameZone(&'static str),
    #[error("{0} is already UTC, use the ticks directly")]
    AlreadyUtc(&'static str),
    #[error("Invalid timezone: {0}")]
    UnknownZone(String),
    #[error("Unknown clock kind: {0}")]
    UnknownClock(String),
}

pub type Result<T> = std::result::Result<T, Error>;
