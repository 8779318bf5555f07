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

//! Schedule assembly: persisted slots and participants in, render-ready grid out.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::availability::{Availability, Consensus, Tier};
use crate::civil::CivilOffset;
use crate::slot::{SlotError, SlotKey, SlotWindow};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("stored slot {id} is malformed: {source}")]
    InvalidSlot {
        id: Uuid,
        #[source]
        source: SlotError,
    },
}

/// A slot row as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRecord {
    pub id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseRecord {
    pub slot_id: Uuid,
    pub availability: Availability,
}

/// A participant row with every response it submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub id: Uuid,
    pub name: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub responses: Vec<ResponseRecord>,
}

/// One unique window of a meeting together with its representative row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSlot {
    pub id: Uuid,
    pub key: SlotKey,
    pub window: SlotWindow,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Deduplicated, chronologically sorted slots plus an index from every
/// persisted slot id (duplicates included) to its key.
#[derive(Debug, Clone, Default)]
pub struct SlotIndex {
    pub slots: Vec<CanonicalSlot>,
    keys: HashMap<Uuid, SlotKey>,
}

impl SlotIndex {
    pub fn key_of(&self, slot_id: &Uuid) -> Option<&SlotKey> {
        self.keys.get(slot_id)
    }

    /// Representative slot id for `key`.
    pub fn id_of(&self, key: &SlotKey) -> Option<Uuid> {
        self.slots.iter().find(|slot| &slot.key == key).map(|slot| slot.id)
    }
}

/// Collapse slots persisted more than once and sort by start instant.
///
/// The first record seen for a `(start, end)` pair is the representative.
pub fn canonical_slots(
    records: &[SlotRecord],
    offset: CivilOffset,
) -> Result<SlotIndex, AssemblyError> {
    let mut seen: HashMap<(DateTime<Utc>, DateTime<Utc>), SlotKey> = HashMap::new();
    let mut index = SlotIndex::default();

    for record in records {
        let window = SlotWindow::from_instants(record.start, record.end, offset).map_err(
            |source| AssemblyError::InvalidSlot {
                id: record.id,
                source,
            },
        )?;

        let key = seen
            .entry((record.start, record.end))
            .or_insert_with(|| {
                let key = window.key();
                index.slots.push(CanonicalSlot {
                    id: record.id,
                    key: key.clone(),
                    window,
                    start: record.start,
                    end: record.end,
                });
                key
            })
            .clone();
        index.keys.insert(record.id, key);
    }

    index.slots.sort_by_key(|slot| slot.start);
    Ok(index)
}

/// A response column of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub participant_id: Uuid,
    pub name: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub key: SlotKey,
    pub date: NaiveDate,
    pub display_time: String,
    pub slot_id: Uuid,
    /// Presentation hint: the previous row is on a different date.
    pub starts_new_day: bool,
    pub tier: Tier,
    pub contributors: u32,
    pub ratio: Option<f64>,
    /// `cells[i]` is the answer of `columns[i]`, `None` when absent.
    pub cells: Vec<Option<Availability>>,
}

/// The render-ready availability grid of one meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schedule {
    /// Newest participant first.
    pub columns: Vec<Column>,
    pub rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn assemble(
        slots: &[SlotRecord],
        participants: &[ParticipantRecord],
        offset: CivilOffset,
    ) -> Result<Self, AssemblyError> {
        let index = canonical_slots(slots, offset)?;
        Ok(Self::from_index(&index, participants))
    }

    /// Build the grid over already canonicalized slots.
    pub fn from_index(index: &SlotIndex, participants: &[ParticipantRecord]) -> Self {
        let mut ordered: Vec<&ParticipantRecord> = participants.iter().collect();
        ordered.sort_by_key(|p| (p.created_at, p.id));
        ordered.reverse();

        // participant position -> key -> answer; the first answer per key wins
        let answers: Vec<HashMap<&SlotKey, Availability>> = ordered
            .iter()
            .map(|participant| {
                let mut by_key = HashMap::new();
                for response in &participant.responses {
                    if let Some(key) = index.key_of(&response.slot_id) {
                        by_key.entry(key).or_insert(response.availability);
                    }
                }
                by_key
            })
            .collect();

        let mut previous_date = None;
        let rows = index
            .slots
            .iter()
            .map(|slot| {
                let cells: Vec<Option<Availability>> = answers
                    .iter()
                    .map(|by_key| by_key.get(&slot.key).copied())
                    .collect();
                let consensus = Consensus::from_scores(cells.iter().flatten().copied());
                let date = slot.window.date;
                let starts_new_day = previous_date != Some(date);
                previous_date = Some(date);

                ScheduleRow {
                    key: slot.key.clone(),
                    date,
                    display_time: slot.window.display_time(),
                    slot_id: slot.id,
                    starts_new_day,
                    tier: consensus.tier(),
                    contributors: consensus.contributors(),
                    ratio: consensus.ratio(),
                    cells,
                }
            })
            .collect();

        let columns = ordered
            .into_iter()
            .map(|p| Column {
                participant_id: p.id,
                name: p.name.clone(),
                comment: p.comment.clone(),
                created_at: p.created_at,
            })
            .collect();

        Self { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{HourRange, SlotWindows};
    use chrono::{Duration, TimeZone};
    use crate::availability::Availability::{Available as OK, Maybe as MAYBE, Unavailable as NG};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn slot_at(hour: u32, minute: u32) -> SlotRecord {
        let start = Utc.with_ymd_and_hms(2025, 4, 1, hour, minute, 0).unwrap();
        SlotRecord {
            id: Uuid::new_v4(),
            start,
            end: start + Duration::minutes(30),
        }
    }

    fn participant(name: &str, age_minutes: i64, responses: Vec<ResponseRecord>) -> ParticipantRecord {
        ParticipantRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            comment: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
                - Duration::minutes(age_minutes),
            responses,
        }
    }

    fn answer(slot: &SlotRecord, availability: Availability) -> ResponseRecord {
        ResponseRecord {
            slot_id: slot.id,
            availability,
        }
    }

    fn persisted(dates: &[NaiveDate], start: &str, end: &str) -> Vec<SlotRecord> {
        let range = HourRange::parse(start, end).unwrap();
        SlotWindows::new(dates.iter().copied(), range)
            .map(|window| {
                let (start, end) = window.to_instants(CivilOffset::jst()).unwrap();
                SlotRecord {
                    id: Uuid::new_v4(),
                    start,
                    end,
                }
            })
            .collect()
    }

    #[test]
    fn duplicate_windows_collapse_into_one_row() {
        let first = slot_at(1, 0);
        let copy = SlotRecord {
            id: Uuid::new_v4(),
            ..first.clone()
        };
        let schedule = Schedule::assemble(&[first.clone(), copy], &[], CivilOffset::jst()).unwrap();

        assert_eq!(schedule.rows.len(), 1);
        assert_eq!(schedule.rows[0].slot_id, first.id);
        assert_eq!(schedule.rows[0].key.as_str(), "2025-04-01 10:00-10:30");
        assert_eq!(schedule.rows[0].tier, Tier::Neutral);
        assert_eq!(schedule.rows[0].ratio, None);
    }

    #[test]
    fn rows_follow_start_instant_not_store_order() {
        let slots = vec![slot_at(3, 0), slot_at(1, 0), slot_at(2, 30), slot_at(1, 30)];
        let schedule = Schedule::assemble(&slots, &[], CivilOffset::jst()).unwrap();

        let times: Vec<&str> = schedule.rows.iter().map(|r| r.display_time.as_str()).collect();
        assert_eq!(times, ["10:00-10:30", "10:30-11:00", "11:30-12:00", "12:00-12:30"]);
    }

    #[test]
    fn responses_to_either_copy_count_in_the_merged_row() {
        let first = slot_at(1, 0);
        let copy = SlotRecord {
            id: Uuid::new_v4(),
            ..first.clone()
        };
        let participants = vec![
            participant("a", 10, vec![answer(&first, OK)]),
            participant("b", 5, vec![answer(&copy, NG)]),
        ];
        let schedule =
            Schedule::assemble(&[first, copy], &participants, CivilOffset::jst()).unwrap();

        assert_eq!(schedule.rows.len(), 1);
        assert_eq!(schedule.rows[0].contributors, 2);
        assert_eq!(schedule.rows[0].cells, vec![Some(NG), Some(OK)]);
        assert_eq!(schedule.rows[0].tier, Tier::Moderate);
    }

    #[test]
    fn columns_are_newest_first() {
        let slot = slot_at(1, 0);
        let participants = vec![
            participant("oldest", 30, vec![answer(&slot, OK)]),
            participant("middle", 20, vec![answer(&slot, MAYBE)]),
            participant("newest", 10, vec![answer(&slot, NG)]),
        ];
        let schedule = Schedule::assemble(&[slot], &participants, CivilOffset::jst()).unwrap();

        let names: Vec<&str> = schedule.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["newest", "middle", "oldest"]);
        assert_eq!(schedule.rows[0].cells, vec![Some(NG), Some(MAYBE), Some(OK)]);
    }

    #[test]
    fn silent_participants_do_not_dilute_the_ratio() {
        let morning = slot_at(1, 0);
        let later = slot_at(1, 30);
        let participants = vec![
            participant("a", 10, vec![answer(&morning, OK), answer(&later, OK)]),
            participant("b", 5, vec![answer(&later, OK)]),
        ];
        let schedule =
            Schedule::assemble(&[morning, later], &participants, CivilOffset::jst()).unwrap();

        assert_eq!(schedule.rows[0].cells, vec![None, Some(OK)]);
        assert_eq!(schedule.rows[0].contributors, 1);
        assert_eq!(schedule.rows[0].tier, Tier::Full);
        assert_eq!(schedule.rows[1].contributors, 2);
    }

    #[test]
    fn responses_for_unknown_slots_are_ignored() {
        let slot = slot_at(1, 0);
        let stray = ResponseRecord {
            slot_id: Uuid::new_v4(),
            availability: NG,
        };
        let participants = vec![participant("a", 1, vec![stray, answer(&slot, OK)])];
        let schedule = Schedule::assemble(&[slot], &participants, CivilOffset::jst()).unwrap();

        assert_eq!(schedule.rows[0].tier, Tier::Full);
    }

    #[test]
    fn new_day_flag_marks_date_changes() {
        let slots = persisted(&[date(2025, 5, 2), date(2025, 5, 1)], "09:00", "10:00");
        let schedule = Schedule::assemble(&slots, &[], CivilOffset::jst()).unwrap();

        let flags: Vec<bool> = schedule.rows.iter().map(|r| r.starts_new_day).collect();
        assert_eq!(flags, [true, false, true, false]);
        assert_eq!(schedule.rows[0].date, date(2025, 5, 1));
        assert_eq!(schedule.rows[2].date, date(2025, 5, 2));
    }

    #[test]
    fn early_morning_slots_keep_their_civil_date() {
        // 00:00 JST is 15:00 UTC on the previous day
        let slots = persisted(&[date(2025, 5, 2)], "00:00", "00:30");
        assert_eq!(slots[0].start.date_naive(), date(2025, 5, 1));

        let schedule = Schedule::assemble(&slots, &[], CivilOffset::jst()).unwrap();
        assert_eq!(schedule.rows[0].key.as_str(), "2025-05-02 00:00-00:30");
    }

    #[test]
    fn malformed_slot_aborts_assembly() {
        let mut slot = slot_at(1, 0);
        slot.end = slot.start + Duration::minutes(45);
        let id = slot.id;
        let err = Schedule::assemble(&[slot_at(2, 0), slot], &[], CivilOffset::jst()).unwrap_err();

        assert!(matches!(
            err,
            AssemblyError::InvalidSlot {
                id: bad,
                source: SlotError::InvalidDuration { minutes: 45 },
            } if bad == id
        ));
    }

    #[test]
    fn two_dates_one_hour_all_ok_is_full_everywhere() {
        let slots = persisted(&[date(2025, 6, 10), date(2025, 6, 11)], "10:00", "11:00");
        assert_eq!(slots.len(), 4);

        let responses = slots.iter().map(|slot| answer(slot, OK)).collect();
        let participants = vec![participant("taro", 0, responses)];
        let schedule = Schedule::assemble(&slots, &participants, CivilOffset::jst()).unwrap();

        assert_eq!(schedule.columns.len(), 1);
        assert_eq!(schedule.rows.len(), 4);
        for row in &schedule.rows {
            assert_eq!(row.tier, Tier::Full);
            assert_eq!(row.cells, vec![Some(OK)]);
        }
        let keys: Vec<&str> = schedule.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "2025-06-10 10:00-10:30",
                "2025-06-10 10:30-11:00",
                "2025-06-11 10:00-10:30",
                "2025-06-11 10:30-11:00",
            ]
        );
    }
}
