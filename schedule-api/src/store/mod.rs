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

//! Persistence port for meetings, slots, participants and responses.
//!
//! Handlers only talk to [`Store`]. [`PgStore`] backs it with PostgreSQL,
//! [`MemoryStore`] keeps everything in process for local runs and tests.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use timepoll_core::{Availability, ParticipantRecord, SlotRecord};
use uuid::Uuid;

use crate::config::Config;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("stored data is malformed: {0}")]
    Ingest(String),
    #[error("batch insert wrote {written} of {expected} rows")]
    PartialBatch { expected: usize, written: u64 },
    #[error("{table} row {id} does not exist")]
    MissingRow { table: &'static str, id: Uuid },
    #[error("slot {slot_id} does not belong to the meeting of participant {participant_id}")]
    ForeignSlot { slot_id: Uuid, participant_id: Uuid },
}

/// A meeting row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}

/// A slot to insert, as UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewResponse {
    pub slot_id: Uuid,
    pub participant_id: Uuid,
    pub availability: Availability,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_meeting(
        &self,
        title: &str,
        description: Option<&str>,
        access_token: &str,
    ) -> Result<MeetingRecord, StoreError>;

    async fn get_meeting(&self, meeting_id: Uuid) -> Result<Option<MeetingRecord>, StoreError>;

    /// Insert every slot or none of them.
    async fn create_slots(&self, meeting_id: Uuid, slots: &[NewSlot]) -> Result<(), StoreError>;

    /// Ordered by start instant.
    async fn list_slots(&self, meeting_id: Uuid) -> Result<Vec<SlotRecord>, StoreError>;

    async fn create_participant(
        &self,
        meeting_id: Uuid,
        name: &str,
        comment: Option<&str>,
    ) -> Result<Uuid, StoreError>;

    /// Insert every response or none of them.
    async fn create_responses(&self, responses: &[NewResponse]) -> Result<(), StoreError>;

    /// Ordered by creation time, oldest first.
    async fn list_participants_with_responses(
        &self,
        meeting_id: Uuid,
    ) -> Result<Vec<ParticipantRecord>, StoreError>;

    /// Create a participant together with its responses as one unit. On
    /// error nothing of the submission is visible.
    async fn submit_participant(
        &self,
        meeting_id: Uuid,
        name: &str,
        comment: Option<&str>,
        choices: &[(Uuid, Availability)],
    ) -> Result<Uuid, StoreError>;
}

/// Decode a stored availability score.
pub(crate) fn decode_availability(score: i16) -> Result<Availability, StoreError> {
    Availability::try_from(score).map_err(|e| StoreError::Ingest(e.to_string()))
}

/// Open the configured store: PostgreSQL when a database is configured,
/// otherwise an empty in-memory store.
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>, StoreError> {
    match &config.database {
        Some(database) => {
            let store = PgStore::connect(database).await?;
            if database.run_migrations {
                store.migrate().await?;
                tracing::info!("Database migrations applied");
            }
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running with in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
