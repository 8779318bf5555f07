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

//! Axum router configuration for the schedule API.

pub mod meetings;
pub mod participants;
pub mod schedule;

use axum::{
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::MeetingRecord;

/// Build the full application router with all schedule API routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Organizer flow
        .route("/api/v1/meetings", post(meetings::create_meeting))
        .route("/api/v1/meetings/{meeting_id}", get(meetings::get_meeting))
        .route(
            "/api/v1/meetings/{meeting_id}/slots",
            get(meetings::list_slots),
        )
        // Participant flow
        .route(
            "/api/v1/meetings/{meeting_id}/schedule",
            get(schedule::get_schedule),
        )
        .route(
            "/api/v1/meetings/{meeting_id}/participants",
            post(participants::submit_participant),
        )
}

fn parse_meeting_id(meeting_id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(meeting_id.trim()).map_err(|_| AppError::invalid_meeting_id("must be a UUID"))
}

/// Resolve the path segment to an existing meeting.
pub(crate) async fn load_meeting(
    state: &AppState,
    meeting_id: &str,
) -> Result<MeetingRecord, AppError> {
    let id = parse_meeting_id(meeting_id)?;
    state
        .store
        .get_meeting(id)
        .await?
        .ok_or_else(|| AppError::meeting_not_found(meeting_id))
}
