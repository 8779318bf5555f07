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

//! In-process store. Nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use timepoll_core::{Availability, ParticipantRecord, ResponseRecord, SlotRecord};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MeetingRecord, NewResponse, NewSlot, Store, StoreError};

#[derive(Debug, Clone)]
struct StoredSlot {
    meeting_id: Uuid,
    record: SlotRecord,
}

#[derive(Debug, Clone)]
struct StoredParticipant {
    meeting_id: Uuid,
    id: Uuid,
    name: String,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    meetings: HashMap<Uuid, MeetingRecord>,
    slots: Vec<StoredSlot>,
    participants: Vec<StoredParticipant>,
    responses: Vec<NewResponse>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing creation time, so insertion order is never a tie.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn require_meeting(&self, meeting_id: Uuid) -> Result<(), StoreError> {
        if self.meetings.contains_key(&meeting_id) {
            Ok(())
        } else {
            Err(StoreError::MissingRow {
                table: "meetings",
                id: meeting_id,
            })
        }
    }

    /// Reject the whole batch when any row points at a missing slot or
    /// participant, or pairs a participant with another meeting's slot.
    fn check_responses(
        &self,
        responses: &[NewResponse],
        pending: Option<&StoredParticipant>,
    ) -> Result<(), StoreError> {
        let slots: HashMap<Uuid, Uuid> = self
            .slots
            .iter()
            .map(|s| (s.record.id, s.meeting_id))
            .collect();
        let participants: HashMap<Uuid, Uuid> = self
            .participants
            .iter()
            .chain(pending)
            .map(|p| (p.id, p.meeting_id))
            .collect();

        for response in responses {
            let slot_meeting = slots.get(&response.slot_id).ok_or(StoreError::MissingRow {
                table: "slots",
                id: response.slot_id,
            })?;
            let participant_meeting =
                participants
                    .get(&response.participant_id)
                    .ok_or(StoreError::MissingRow {
                        table: "participants",
                        id: response.participant_id,
                    })?;
            if slot_meeting != participant_meeting {
                return Err(StoreError::ForeignSlot {
                    slot_id: response.slot_id,
                    participant_id: response.participant_id,
                });
            }
        }
        Ok(())
    }

    fn new_participant(
        &mut self,
        meeting_id: Uuid,
        name: &str,
        comment: Option<&str>,
    ) -> StoredParticipant {
        StoredParticipant {
            meeting_id,
            id: Uuid::new_v4(),
            name: name.to_string(),
            comment: comment.map(str::to_string),
            created_at: self.stamp(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_meeting(
        &self,
        title: &str,
        description: Option<&str>,
        access_token: &str,
    ) -> Result<MeetingRecord, StoreError> {
        let mut tables = self.inner.write().await;
        let meeting = MeetingRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.map(str::to_string),
            access_token: access_token.to_string(),
            created_at: tables.stamp(),
        };
        tables.meetings.insert(meeting.id, meeting.clone());
        Ok(meeting)
    }

    async fn get_meeting(&self, meeting_id: Uuid) -> Result<Option<MeetingRecord>, StoreError> {
        Ok(self.inner.read().await.meetings.get(&meeting_id).cloned())
    }

    async fn create_slots(&self, meeting_id: Uuid, slots: &[NewSlot]) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;
        tables.require_meeting(meeting_id)?;
        tables.slots.extend(slots.iter().map(|slot| StoredSlot {
            meeting_id,
            record: SlotRecord {
                id: Uuid::new_v4(),
                start: slot.start,
                end: slot.end,
            },
        }));
        Ok(())
    }

    async fn list_slots(&self, meeting_id: Uuid) -> Result<Vec<SlotRecord>, StoreError> {
        let tables = self.inner.read().await;
        let mut slots: Vec<SlotRecord> = tables
            .slots
            .iter()
            .filter(|s| s.meeting_id == meeting_id)
            .map(|s| s.record.clone())
            .collect();
        slots.sort_by_key(|s| s.start);
        Ok(slots)
    }

    async fn create_participant(
        &self,
        meeting_id: Uuid,
        name: &str,
        comment: Option<&str>,
    ) -> Result<Uuid, StoreError> {
        let mut tables = self.inner.write().await;
        tables.require_meeting(meeting_id)?;
        let participant = tables.new_participant(meeting_id, name, comment);
        let id = participant.id;
        tables.participants.push(participant);
        Ok(id)
    }

    async fn create_responses(&self, responses: &[NewResponse]) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;
        tables.check_responses(responses, None)?;
        tables.responses.extend_from_slice(responses);
        Ok(())
    }

    async fn list_participants_with_responses(
        &self,
        meeting_id: Uuid,
    ) -> Result<Vec<ParticipantRecord>, StoreError> {
        let tables = self.inner.read().await;
        let mut participants: Vec<ParticipantRecord> = tables
            .participants
            .iter()
            .filter(|p| p.meeting_id == meeting_id)
            .map(|p| ParticipantRecord {
                id: p.id,
                name: p.name.clone(),
                comment: p.comment.clone(),
                created_at: p.created_at,
                responses: tables
                    .responses
                    .iter()
                    .filter(|r| r.participant_id == p.id)
                    .map(|r| ResponseRecord {
                        slot_id: r.slot_id,
                        availability: r.availability,
                    })
                    .collect(),
            })
            .collect();
        participants.sort_by_key(|p| p.created_at);
        Ok(participants)
    }

    async fn submit_participant(
        &self,
        meeting_id: Uuid,
        name: &str,
        comment: Option<&str>,
        choices: &[(Uuid, Availability)],
    ) -> Result<Uuid, StoreError> {
        let mut tables = self.inner.write().await;
        tables.require_meeting(meeting_id)?;

        let participant = tables.new_participant(meeting_id, name, comment);
        let responses: Vec<NewResponse> = choices
            .iter()
            .map(|&(slot_id, availability)| NewResponse {
                slot_id,
                participant_id: participant.id,
                availability,
            })
            .collect();

        // Both rows land under the same write guard, or neither does.
        tables.check_responses(&responses, Some(&participant))?;
        let id = participant.id;
        tables.participants.push(participant);
        tables.responses.extend(responses);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slot(hour: u32) -> NewSlot {
        let start = Utc.with_ymd_and_hms(2025, 8, 1, hour, 0, 0).unwrap();
        NewSlot {
            start,
            end: start + Duration::minutes(30),
        }
    }

    #[tokio::test]
    async fn slots_are_listed_by_start() {
        let store = MemoryStore::new();
        let meeting = store.create_meeting("Sync", None, "abc").await.unwrap();
        store
            .create_slots(meeting.id, &[slot(5), slot(1), slot(3)])
            .await
            .unwrap();

        let hours: Vec<u32> = store
            .list_slots(meeting.id)
            .await
            .unwrap()
            .iter()
            .map(|s| chrono::Timelike::hour(&s.start))
            .collect();
        assert_eq!(hours, [1, 3, 5]);
    }

    #[tokio::test]
    async fn slots_for_unknown_meeting_are_rejected() {
        let store = MemoryStore::new();
        let err = store.create_slots(Uuid::new_v4(), &[slot(1)]).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingRow { table: "meetings", .. }));
    }

    #[tokio::test]
    async fn failed_submission_leaves_no_participant() {
        let store = MemoryStore::new();
        let meeting = store.create_meeting("Sync", None, "abc").await.unwrap();
        store.create_slots(meeting.id, &[slot(1)]).await.unwrap();
        let real = store.list_slots(meeting.id).await.unwrap()[0].id;

        let err = store
            .submit_participant(
                meeting.id,
                "hana",
                None,
                &[(real, Availability::Available), (Uuid::new_v4(), Availability::Maybe)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingRow { table: "slots", .. }));
        assert!(store
            .list_participants_with_responses(meeting.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn participants_come_back_oldest_first_with_responses() {
        let store = MemoryStore::new();
        let meeting = store.create_meeting("Sync", Some("weekly"), "abc").await.unwrap();
        store.create_slots(meeting.id, &[slot(1)]).await.unwrap();
        let slot_id = store.list_slots(meeting.id).await.unwrap()[0].id;

        let first = store
            .submit_participant(meeting.id, "a", None, &[(slot_id, Availability::Maybe)])
            .await
            .unwrap();
        let second = store
            .submit_participant(meeting.id, "b", Some("late"), &[(slot_id, Availability::Unavailable)])
            .await
            .unwrap();

        let participants = store.list_participants_with_responses(meeting.id).await.unwrap();
        assert_eq!(participants.len(), 2);
        assert_eq!(participants[0].id, first);
        assert_eq!(participants[1].id, second);
        assert!(participants[0].created_at < participants[1].created_at);
        assert_eq!(participants[1].comment.as_deref(), Some("late"));
        assert_eq!(
            participants[1].responses,
            vec![ResponseRecord {
                slot_id,
                availability: Availability::Unavailable
            }]
        );
    }

    #[tokio::test]
    async fn responses_cannot_cross_meetings() {
        let store = MemoryStore::new();
        let ours = store.create_meeting("Ours", None, "abc").await.unwrap();
        let theirs = store.create_meeting("Theirs", None, "def").await.unwrap();
        store.create_slots(theirs.id, &[slot(4)]).await.unwrap();
        let foreign = store.list_slots(theirs.id).await.unwrap()[0].id;

        let err = store
            .submit_participant(ours.id, "mio", None, &[(foreign, Availability::Available)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignSlot { slot_id, .. } if slot_id == foreign));
        assert!(store
            .list_participants_with_responses(ours.id)
            .await
            .unwrap()
            .is_empty());

        let participant_id = store.create_participant(ours.id, "mio", None).await.unwrap();
        let err = store
            .create_responses(&[NewResponse {
                slot_id: foreign,
                participant_id,
                availability: Availability::Maybe,
            }])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignSlot { .. }));
    }

    #[tokio::test]
    async fn separate_participant_and_response_calls_work() {
        let store = MemoryStore::new();
        let meeting = store.create_meeting("Sync", None, "abc").await.unwrap();
        store.create_slots(meeting.id, &[slot(2)]).await.unwrap();
        let slot_id = store.list_slots(meeting.id).await.unwrap()[0].id;

        let participant_id = store.create_participant(meeting.id, "ken", None).await.unwrap();
        store
            .create_responses(&[NewResponse {
                slot_id,
                participant_id,
                availability: Availability::Available,
            }])
            .await
            .unwrap();

        let participants = store.list_participants_with_responses(meeting.id).await.unwrap();
        assert_eq!(participants[0].responses.len(), 1);
    }
}
