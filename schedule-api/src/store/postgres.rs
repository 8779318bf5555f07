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

//! PostgreSQL adapter.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use timepoll_core::{Availability, ParticipantRecord, ResponseRecord, SlotRecord};
use uuid::Uuid;

use super::{decode_availability, MeetingRecord, NewResponse, NewSlot, Store, StoreError};
use crate::config::DatabaseConfig;

/// Row returned from the `meetings` table.
#[derive(Debug, sqlx::FromRow)]
struct MeetingRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    access_token: String,
    created_at: DateTime<Utc>,
}

impl From<MeetingRow> for MeetingRecord {
    fn from(row: MeetingRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            access_token: row.access_token,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SlotRow {
    id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ParticipantRow {
    id: Uuid,
    name: String,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ResponseRow {
    participant_id: Uuid,
    slot_id: Uuid,
    availability: i16,
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await?;
        tracing::info!("Connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Apply the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Batch insert through `UNNEST` so the whole batch is one statement. The
/// meeting comes from each participant row; the composite foreign keys then
/// reject a slot of any other meeting, and rows naming an unknown participant
/// drop out of the join and surface as a partial batch.
async fn insert_responses<'e, E>(executor: E, responses: &[NewResponse]) -> Result<(), StoreError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    if responses.is_empty() {
        return Ok(());
    }

    let ids: Vec<Uuid> = responses.iter().map(|_| Uuid::new_v4()).collect();
    let slot_ids: Vec<Uuid> = responses.iter().map(|r| r.slot_id).collect();
    let participant_ids: Vec<Uuid> = responses.iter().map(|r| r.participant_id).collect();
    let scores: Vec<i16> = responses.iter().map(|r| r.availability.score()).collect();

    let written = sqlx::query(
        r#"
        INSERT INTO responses (id, meeting_id, slot_id, participant_id, availability)
        SELECT batch.id, p.meeting_id, batch.slot_id, batch.participant_id, batch.availability
        FROM UNNEST($1::uuid[], $2::uuid[], $3::uuid[], $4::smallint[])
            AS batch(id, slot_id, participant_id, availability)
        JOIN participants p ON p.id = batch.participant_id
        "#,
    )
    .bind(&ids)
    .bind(&slot_ids)
    .bind(&participant_ids)
    .bind(&scores)
    .execute(executor)
    .await?
    .rows_affected();

    if written != responses.len() as u64 {
        return Err(StoreError::PartialBatch {
            expected: responses.len(),
            written,
        });
    }
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    async fn create_meeting(
        &self,
        title: &str,
        description: Option<&str>,
        access_token: &str,
    ) -> Result<MeetingRecord, StoreError> {
        let row = sqlx::query_as::<_, MeetingRow>(
            r#"
            INSERT INTO meetings (id, title, description, access_token)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, access_token, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .bind(access_token)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn get_meeting(&self, meeting_id: Uuid) -> Result<Option<MeetingRecord>, StoreError> {
        let row = sqlx::query_as::<_, MeetingRow>(
            r#"
            SELECT id, title, description, access_token, created_at
            FROM meetings
            WHERE id = $1
            "#,
        )
        .bind(meeting_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(MeetingRecord::from))
    }

    async fn create_slots(&self, meeting_id: Uuid, slots: &[NewSlot]) -> Result<(), StoreError> {
        if slots.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = slots.iter().map(|_| Uuid::new_v4()).collect();
        let starts: Vec<DateTime<Utc>> = slots.iter().map(|s| s.start).collect();
        let ends: Vec<DateTime<Utc>> = slots.iter().map(|s| s.end).collect();

        let written = sqlx::query(
            r#"
            INSERT INTO slots (id, meeting_id, start_time, end_time)
            SELECT id, $2, start_time, end_time
            FROM UNNEST($1::uuid[], $3::timestamptz[], $4::timestamptz[])
                AS batch(id, start_time, end_time)
            "#,
        )
        .bind(&ids)
        .bind(meeting_id)
        .bind(&starts)
        .bind(&ends)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if written != slots.len() as u64 {
            return Err(StoreError::PartialBatch {
                expected: slots.len(),
                written,
            });
        }
        Ok(())
    }

    async fn list_slots(&self, meeting_id: Uuid) -> Result<Vec<SlotRecord>, StoreError> {
        let rows = sqlx::query_as::<_, SlotRow>(
            r#"
            SELECT id, start_time, end_time
            FROM slots
            WHERE meeting_id = $1
            ORDER BY start_time ASC, created_at ASC
            "#,
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SlotRecord {
                id: row.id,
                start: row.start_time,
                end: row.end_time,
            })
            .collect())
    }

    async fn create_participant(
        &self,
        meeting_id: Uuid,
        name: &str,
        comment: Option<&str>,
    ) -> Result<Uuid, StoreError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO participants (id, meeting_id, name, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(meeting_id)
        .bind(name)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn create_responses(&self, responses: &[NewResponse]) -> Result<(), StoreError> {
        insert_responses(&self.pool, responses).await
    }

    async fn list_participants_with_responses(
        &self,
        meeting_id: Uuid,
    ) -> Result<Vec<ParticipantRecord>, StoreError> {
        let participants = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT id, name, comment, created_at
            FROM participants
            WHERE meeting_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = participants.iter().map(|p| p.id).collect();
        let responses = sqlx::query_as::<_, ResponseRow>(
            r#"
            SELECT participant_id, slot_id, availability
            FROM responses
            WHERE participant_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_participant: HashMap<Uuid, Vec<ResponseRecord>> = HashMap::new();
        for row in responses {
            by_participant
                .entry(row.participant_id)
                .or_default()
                .push(ResponseRecord {
                    slot_id: row.slot_id,
                    availability: decode_availability(row.availability)?,
                });
        }

        Ok(participants
            .into_iter()
            .map(|row| ParticipantRecord {
                responses: by_participant.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                comment: row.comment,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn submit_participant(
        &self,
        meeting_id: Uuid,
        name: &str,
        comment: Option<&str>,
        choices: &[(Uuid, Availability)],
    ) -> Result<Uuid, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (participant_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO participants (id, meeting_id, name, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(meeting_id)
        .bind(name)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await?;

        let responses: Vec<NewResponse> = choices
            .iter()
            .map(|&(slot_id, availability)| NewResponse {
                slot_id,
                participant_id,
                availability,
            })
            .collect();

        // Dropping `tx` on error rolls the participant back.
        insert_responses(&mut *tx, &responses).await?;
        tx.commit().await?;

        Ok(participant_id)
    }
}
