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

//! Slot generation and canonical slot keys.
//!
//! A meeting offers a grid of 30-minute windows: every selected calendar date
//! crossed with one hour range. [`SlotWindows`] walks that grid lazily.
//! [`SlotKey`] is the one string every component uses to correlate a window,
//! whether it was just generated, read back from storage, or named in a
//! participant's response.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::civil::CivilOffset;

/// Length of every slot.
pub const SLOT_MINUTES: u32 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("hour range must start before it ends ({start} is not before {end})")]
    EmptyHourRange { start: NaiveTime, end: NaiveTime },
    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("invalid slot key {0:?}, expected YYYY-MM-DD HH:MM-HH:MM")]
    InvalidKey(String),
    #[error("slot must last 30 minutes, got {minutes}")]
    InvalidDuration { minutes: i64 },
    #[error("slot starting at {0} crosses civil midnight")]
    CrossesMidnight(DateTime<Utc>),
    #[error("slot boundary {0} is not on a whole minute")]
    Unaligned(DateTime<Utc>),
    #[error("slot {0} is not part of the generated grid")]
    NotInGrid(SlotKey),
    #[error("date {0} is outside the supported calendar range")]
    OutOfRange(NaiveDate),
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn slot_duration() -> Duration {
    Duration::minutes(i64::from(SLOT_MINUTES))
}

fn parse_time(text: &str) -> Result<NaiveTime, SlotError> {
    NaiveTime::parse_from_str(text.trim(), TIME_FORMAT)
        .map_err(|_| SlotError::InvalidTime(text.to_string()))
}

/// Daily `[start, end)` window within which slots are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourRange {
    #[serde(serialize_with = "hhmm::serialize")]
    start: NaiveTime,
    #[serde(serialize_with = "hhmm::serialize")]
    end: NaiveTime,
}

impl HourRange {
    /// Seconds are truncated; only whole minutes take part in slot arithmetic.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, SlotError> {
        let start = start.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(start);
        let end = end.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(end);
        if start >= end {
            return Err(SlotError::EmptyHourRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a pair of `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, SlotError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Number of whole slots that fit; a trailing partial slot is dropped.
    pub fn windows_per_day(&self) -> usize {
        ((minute_of_day(self.end) - minute_of_day(self.start)) / SLOT_MINUTES) as usize
    }

    fn window(&self, date: NaiveDate, index: usize) -> SlotWindow {
        let start = self.start + Duration::minutes(i64::from(SLOT_MINUTES) * index as i64);
        SlotWindow {
            date,
            start,
            end: start + slot_duration(),
        }
    }
}

/// One 30-minute window on one civil date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotWindow {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl SlotWindow {
    pub fn key(&self) -> SlotKey {
        SlotKey(format!(
            "{} {}",
            self.date.format(DATE_FORMAT),
            self.display_time()
        ))
    }

    /// `HH:MM-HH:MM`, zero padded.
    pub fn display_time(&self) -> String {
        format!(
            "{:02}:{:02}-{:02}:{:02}",
            self.start.hour(),
            self.start.minute(),
            self.end.hour(),
            self.end.minute()
        )
    }

    /// The `(start, end)` instants this window is persisted as.
    pub fn to_instants(
        &self,
        offset: CivilOffset,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), SlotError> {
        let out_of_range = || SlotError::OutOfRange(self.date);
        let start = offset
            .to_storage(self.date, self.start)
            .ok_or_else(out_of_range)?;
        let end = start
            .checked_add_signed(slot_duration())
            .ok_or_else(out_of_range)?;
        Ok((start, end))
    }

    /// Rebuild a window from persisted instants, validating its shape.
    pub fn from_instants(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        offset: CivilOffset,
    ) -> Result<Self, SlotError> {
        for instant in [start, end] {
            if instant.second() != 0 || instant.nanosecond() != 0 {
                return Err(SlotError::Unaligned(instant));
            }
        }

        let length = end - start;
        if length != slot_duration() {
            return Err(SlotError::InvalidDuration {
                minutes: length.num_minutes(),
            });
        }

        let civil_start = offset.to_civil(start);
        let civil_end = offset.to_civil(end);
        if civil_start.date() != civil_end.date() {
            return Err(SlotError::CrossesMidnight(start));
        }

        Ok(Self {
            date: civil_start.date(),
            start: civil_start.time(),
            end: civil_end.time(),
        })
    }
}

impl FromStr for SlotWindow {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SlotError::InvalidKey(s.to_string());

        let (date, times) = s.split_once(' ').ok_or_else(invalid)?;
        let (start, end) = times.split_once('-').ok_or_else(invalid)?;

        let window = SlotWindow {
            date: NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid())?,
            start: NaiveTime::parse_from_str(start, TIME_FORMAT).map_err(|_| invalid())?,
            end: NaiveTime::parse_from_str(end, TIME_FORMAT).map_err(|_| invalid())?,
        };

        // Only the zero-padded spelling of a real 30-minute window is canonical.
        if window.start >= window.end
            || window.end - window.start != slot_duration()
            || window.key().as_str() != s
        {
            return Err(invalid());
        }
        Ok(window)
    }
}

/// Canonical `YYYY-MM-DD HH:MM-HH:MM` identifier of a slot window.
///
/// Keys order lexicographically in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotKey(String);

impl SlotKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<SlotWindow> for SlotKey {
    fn from(window: SlotWindow) -> Self {
        window.key()
    }
}

impl FromStr for SlotKey {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SlotWindow>().map(|w| w.key())
    }
}

impl TryFrom<String> for SlotKey {
    type Error = SlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotKey> for String {
    fn from(key: SlotKey) -> Self {
        key.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lazy walk over `dates × hour range`.
///
/// Dates are visited in ascending order with duplicates coalesced; windows
/// are ascending within each date. Cloning restarts from the current
/// position, so a fresh clone of a new generator replays the whole grid.
#[derive(Debug, Clone)]
pub struct SlotWindows {
    dates: Vec<NaiveDate>,
    range: HourRange,
    per_day: usize,
    position: usize,
}

impl SlotWindows {
    pub fn new<I>(dates: I, range: HourRange) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let dates: Vec<NaiveDate> = dates.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        Self {
            dates,
            per_day: range.windows_per_day(),
            range,
            position: 0,
        }
    }

    pub fn range(&self) -> HourRange {
        self.range
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    fn total(&self) -> usize {
        self.dates.len() * self.per_day
    }

    /// Keep only the windows named in `keys`, in grid order.
    ///
    /// Every key must belong to the grid; an empty key list selects nothing.
    pub fn select(self, keys: &[SlotKey]) -> Result<Vec<SlotWindow>, SlotError> {
        let wanted: HashSet<&SlotKey> = keys.iter().collect();
        let windows: Vec<SlotWindow> = self.collect();
        let offered: HashSet<SlotKey> = windows.iter().map(SlotWindow::key).collect();

        if let Some(missing) = keys.iter().find(|key| !offered.contains(*key)) {
            return Err(SlotError::NotInGrid(missing.clone()));
        }

        Ok(windows
            .into_iter()
            .filter(|window| wanted.contains(&window.key()))
            .collect())
    }
}

impl Iterator for SlotWindows {
    type Item = SlotWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.total() {
            return None;
        }
        let date = self.dates[self.position / self.per_day];
        let window = self.range.window(date, self.position % self.per_day);
        self.position += 1;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SlotWindows {}

impl std::iter::FusedIterator for SlotWindows {}

/// Serialize times as `HH:MM`.
pub(crate) mod hhmm {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = format!("{:02}:{:02}", time.hour(), time.minute());
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, super::TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}
