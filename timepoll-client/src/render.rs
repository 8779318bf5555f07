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

//! Plain-text view of a schedule grid.

use timepoll_core::{Schedule, Tier};

const UNANSWERED: &str = "-";

fn tier_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Full => "full",
        Tier::NoConflicts => "no conflicts",
        Tier::High => "high",
        Tier::Moderate => "moderate",
        Tier::Low => "low",
        Tier::Neutral => "",
    }
}

/// One header line with the participant names, then one line per slot:
/// the key, each participant's symbol (newest first) and the tier.
/// A blank line separates days.
pub fn grid_text(schedule: &Schedule) -> String {
    let mut header = vec!["slot"];
    header.extend(schedule.columns.iter().map(|column| column.name.as_str()));
    header.push("tier");

    let mut lines = vec![header.join(" | ")];
    for (index, row) in schedule.rows.iter().enumerate() {
        if row.starts_new_day && index > 0 {
            lines.push(String::new());
        }
        let mut fields = vec![row.key.as_str()];
        fields.extend(
            row.cells
                .iter()
                .map(|cell| cell.map_or(UNANSWERED, |availability| availability.symbol())),
        );
        fields.push(tier_label(row.tier));
        lines.push(fields.join(" | "));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use timepoll_core::{
        Availability, CivilOffset, HourRange, ParticipantRecord, ResponseRecord, SlotRecord,
        SlotWindows,
    };
    use uuid::Uuid;

    #[test]
    fn rows_show_symbols_newest_participant_first() {
        let range = HourRange::parse("10:00", "10:30").unwrap();
        let dates = [
            chrono::NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 10, 2).unwrap(),
        ];
        let slots: Vec<SlotRecord> = SlotWindows::new(dates, range)
            .map(|window| {
                let (start, end) = window.to_instants(CivilOffset::jst()).unwrap();
                SlotRecord {
                    id: Uuid::new_v4(),
                    start,
                    end,
                }
            })
            .collect();

        let participant = |name: &str, minute: u32, answers: Vec<ResponseRecord>| ParticipantRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            comment: None,
            created_at: Utc.with_ymd_and_hms(2025, 9, 1, 12, minute, 0).unwrap(),
            responses: answers,
        };
        let early = participant(
            "aki",
            0,
            vec![ResponseRecord {
                slot_id: slots[0].id,
                availability: Availability::Maybe,
            }],
        );
        let late = participant(
            "ren",
            5,
            vec![
                ResponseRecord {
                    slot_id: slots[0].id,
                    availability: Availability::Available,
                },
                ResponseRecord {
                    slot_id: slots[1].id,
                    availability: Availability::Unavailable,
                },
            ],
        );

        let schedule = Schedule::assemble(&slots, &[early, late], CivilOffset::jst()).unwrap();
        assert_eq!(
            grid_text(&schedule),
            "slot | ren | aki | tier\n\
             2025-10-01 10:00-10:30 | ◯ | △ | no conflicts\n\
             \n\
             2025-10-02 10:00-10:30 | ✕ | - | low"
        );
    }

    #[test]
    fn empty_schedule_is_just_the_header() {
        assert_eq!(grid_text(&Schedule::default()), "slot | tier");
    }
}
