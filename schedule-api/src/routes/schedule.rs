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

//! Read path of the participant flow.

use axum::{
    extract::{Path, State},
    Json,
};
use timepoll_core::Schedule;
use timepoll_types::responses::{APIResponse, ScheduleResponse};

use super::load_meeting;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::MeetingRecord;

/// Fetch slots and participants and build the grid. Either fetch failing
/// fails the whole call.
pub(crate) async fn assemble(
    state: &AppState,
    meeting: MeetingRecord,
) -> Result<ScheduleResponse, AppError> {
    let slots = state.store.list_slots(meeting.id).await?;
    let participants = state
        .store
        .list_participants_with_responses(meeting.id)
        .await?;

    let schedule = Schedule::assemble(&slots, &participants, state.civil_offset)?;
    tracing::debug!(
        meeting_id = %meeting.id,
        stored_slots = slots.len(),
        rows = schedule.rows.len(),
        columns = schedule.columns.len(),
        "Assembled schedule"
    );

    Ok(ScheduleResponse {
        meeting_id: meeting.id,
        title: meeting.title,
        description: meeting.description,
        schedule,
    })
}

/// GET /api/v1/meetings/{meeting_id}/schedule
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<APIResponse<ScheduleResponse>>, AppError> {
    let meeting = load_meeting(&state, &meeting_id).await?;
    let response = assemble(&state, meeting).await?;
    Ok(Json(APIResponse::ok(response)))
}
