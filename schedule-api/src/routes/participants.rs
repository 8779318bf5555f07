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

//! Handler for submitting a participant's answers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use timepoll_core::{canonical_slots, Availability, SlotKey};
use timepoll_types::{
    requests::SubmitParticipantRequest,
    responses::{APIResponse, SubmitParticipantResponse},
};
use uuid::Uuid;

use super::{load_meeting, meetings::optional_text, schedule};
use crate::error::AppError;
use crate::state::AppState;

const MAX_NAME_CHARS: usize = 6;
const MAX_COMMENT_CHARS: usize = 40;

/// Field checks, done before the store is touched.
fn check_fields(body: &SubmitParticipantRequest) -> Result<Vec<(SlotKey, Availability)>, AppError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name is required"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::validation(&format!(
            "name cannot exceed {MAX_NAME_CHARS} characters"
        )));
    }
    if let Some(comment) = optional_text(body.comment.as_deref()) {
        if comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::validation(&format!(
                "comment cannot exceed {MAX_COMMENT_CHARS} characters"
            )));
        }
    }
    if body.choices.is_empty() {
        return Err(AppError::validation("answer at least one slot"));
    }

    body.choices
        .iter()
        .map(|(key, availability)| {
            key.parse::<SlotKey>()
                .map(|key| (key, *availability))
                .map_err(|e| AppError::validation(&e.to_string()))
        })
        .collect()
}

/// POST /api/v1/meetings/{meeting_id}/participants
pub async fn submit_participant(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    payload: Result<Json<SubmitParticipantRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<APIResponse<SubmitParticipantResponse>>), AppError> {
    let Json(body) = payload?;
    let choices = check_fields(&body)?;

    let meeting = load_meeting(&state, &meeting_id).await?;
    let slots = state.store.list_slots(meeting.id).await?;
    let index = canonical_slots(&slots, state.civil_offset)?;

    let resolved: Vec<(Uuid, Availability)> = choices
        .iter()
        .map(|(key, availability)| {
            index
                .id_of(key)
                .map(|slot_id| (slot_id, *availability))
                .ok_or_else(|| AppError::unknown_slot(key.as_str()))
        })
        .collect::<Result<_, _>>()?;

    let participant_id = state
        .store
        .submit_participant(
            meeting.id,
            body.name.trim(),
            optional_text(body.comment.as_deref()),
            &resolved,
        )
        .await?;

    tracing::info!(
        meeting_id = %meeting.id,
        participant_id = %participant_id,
        responses = resolved.len(),
        "Participant submitted"
    );

    // The answers are committed; a failed refresh must not read as a failed save.
    let schedule = match schedule::assemble(&state, meeting).await {
        Ok(schedule) => Some(schedule),
        Err(err) => {
            tracing::warn!(
                participant_id = %participant_id,
                code = %err.body.code,
                "Saved participant but could not rebuild the schedule"
            );
            None
        }
    };
    Ok((
        StatusCode::CREATED,
        Json(APIResponse::ok(SubmitParticipantResponse {
            participant_id,
            schedule,
        })),
    ))
}
