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

//! Response types for the schedule REST API.
//!
//! Every endpoint returns an [`APIResponse<T>`] envelope:
//! - On success: `{ "success": true,  "result": <T> }`
//! - On failure: `{ "success": false, "result": <APIError> }`

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use timepoll_core::{Schedule, SlotKey};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Generic envelope
// ---------------------------------------------------------------------------

/// Top-level API response envelope.
///
/// # Success example
///
/// ```json
/// { "success": true, "result": { "meeting_id": "5b0c…", "slot_count": 4, ... } }
/// ```
///
/// # Error example
///
/// ```json
/// { "success": false, "result": { "code": "MEETING_NOT_FOUND", "message": "..." } }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct APIResponse<A: Serialize> {
    pub success: bool,
    pub result: A,
}

impl<A: Serialize> APIResponse<A> {
    /// Wrap a successful result.
    pub fn ok(result: A) -> Self {
        Self {
            success: true,
            result,
        }
    }
}

impl APIResponse<crate::error::APIError> {
    /// Wrap an error result.
    pub fn error(err: crate::error::APIError) -> Self {
        Self {
            success: false,
            result: err,
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoint-specific response payloads
// ---------------------------------------------------------------------------

/// Response payload for `POST /api/v1/meetings` (201 Created).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateMeetingResponse {
    pub meeting_id: Uuid,
    /// Identity token stored with the meeting.
    pub access_token: String,
    /// Link to hand out to participants.
    pub participant_url: String,
    pub slot_count: usize,
}

/// Response payload for `GET /api/v1/meetings/{meeting_id}`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MeetingInfoResponse {
    pub meeting_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unix timestamp in seconds when the meeting was created.
    pub created_at: i64,
}

/// One offered slot inside [`ListSlotsResponse`].
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SlotSummary {
    pub slot_id: Uuid,
    pub key: SlotKey,
    pub date: NaiveDate,
    /// `HH:MM-HH:MM` in the civil zone.
    pub display_time: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Response payload for `GET /api/v1/meetings/{meeting_id}/slots`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListSlotsResponse {
    pub meeting_id: Uuid,
    pub slots: Vec<SlotSummary>,
}

/// Response payload for `GET /api/v1/meetings/{meeting_id}/schedule`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScheduleResponse {
    pub meeting_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub schedule: Schedule,
}

/// Response payload for `POST /api/v1/meetings/{meeting_id}/participants` (201 Created).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubmitParticipantResponse {
    pub participant_id: Uuid,
    /// The grid including the new participant. `None` when the answers were
    /// saved but the grid could not be rebuilt; fetch it again with
    /// `GET /api/v1/meetings/{meeting_id}/schedule`.
    pub schedule: Option<ScheduleResponse>,
}
