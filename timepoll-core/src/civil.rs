/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! The fixed civil offset between the organizer's wall clock and storage.
//!
//! Slots are authored in one civil zone and persisted as UTC instants. Every
//! conversion in either direction goes through a single [`CivilOffset`]
//! value, so moving to a different zone only means constructing a different
//! offset.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

const SECONDS_PER_MINUTE: i32 = 60;
const JST_MINUTES: i32 = 9 * 60;

/// A fixed UTC offset with no daylight-saving rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilOffset(FixedOffset);

impl CivilOffset {
    /// Japan Standard Time, UTC+09:00.
    pub fn jst() -> Self {
        Self::from_minutes(JST_MINUTES).unwrap_or_else(Self::utc)
    }

    /// Plain UTC.
    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    /// Offset east of UTC in minutes. Returns `None` outside ±24h.
    pub fn from_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(SECONDS_PER_MINUTE)
            .and_then(FixedOffset::east_opt)
            .map(Self)
    }

    pub fn minutes(&self) -> i32 {
        self.0.local_minus_utc() / SECONDS_PER_MINUTE
    }

    /// Civil date and time to the instant that is stored. `None` when the
    /// shifted instant falls outside chrono's representable range.
    pub fn to_storage(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        let shift = Duration::seconds(i64::from(self.0.local_minus_utc()));
        date.and_time(time)
            .checked_sub_signed(shift)
            .map(|utc| DateTime::from_naive_utc_and_offset(utc, Utc))
    }

    /// Stored instant back to the civil wall clock.
    pub fn to_civil(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.0).naive_local()
    }
}

impl Default for CivilOffset {
    fn default() -> Self {
        Self::jst()
    }
}

impl std::fmt::Display for CivilOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
