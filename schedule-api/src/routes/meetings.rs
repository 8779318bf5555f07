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

//! Handlers for the organizer flow: creating a meeting and reading it back.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use rand::Rng;
use timepoll_core::{canonical_slots, CivilOffset, HourRange, SlotKey, SlotWindow, SlotWindows};
use timepoll_types::{
    requests::CreateMeetingRequest,
    responses::{
        APIResponse, CreateMeetingResponse, ListSlotsResponse, MeetingInfoResponse, SlotSummary,
    },
};

use super::load_meeting;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::NewSlot;

const MAX_TITLE_CHARS: usize = 255;
const MAX_DESCRIPTION_CHARS: usize = 1000;
const ACCESS_TOKEN_LEN: usize = 9;
const MAX_DATES: usize = 62;
/// Every half hour of every allowed date.
const MAX_SELECTED_CELLS: usize = MAX_DATES * 48;

fn generate_access_token() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..ACCESS_TOKEN_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Trimmed, `None` when blank.
pub(crate) fn optional_text(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|s| !s.is_empty())
}

/// Validate the request and materialize its slot windows. No store access.
fn plan_meeting(body: &CreateMeetingRequest) -> Result<Vec<SlotWindow>, AppError> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::validation(&format!(
            "title cannot exceed {MAX_TITLE_CHARS} characters"
        )));
    }
    if let Some(description) = optional_text(body.description.as_deref()) {
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(AppError::validation(&format!(
                "description cannot exceed {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
    }
    if body.dates.is_empty() {
        return Err(AppError::validation("select at least one date"));
    }
    if body.dates.len() > MAX_DATES {
        return Err(AppError::validation(&format!(
            "a meeting can offer at most {MAX_DATES} dates"
        )));
    }

    let range = HourRange::parse(&body.start_time, &body.end_time)
        .map_err(|e| AppError::validation(&e.to_string()))?;
    let grid = SlotWindows::new(body.dates.iter().copied(), range);

    let windows = match &body.slots {
        Some(keys) if keys.len() > MAX_SELECTED_CELLS => {
            return Err(AppError::validation(&format!(
                "at most {MAX_SELECTED_CELLS} cells can be selected"
            )));
        }
        Some(keys) => {
            let keys = keys
                .iter()
                .map(|key| key.parse::<SlotKey>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AppError::validation(&e.to_string()))?;
            grid.select(&keys)
                .map_err(|e| AppError::validation(&e.to_string()))?
        }
        None => grid.collect(),
    };

    if windows.is_empty() {
        return Err(AppError::validation(
            "the hour range must contain at least one 30-minute slot",
        ));
    }
    Ok(windows)
}

/// Convert planned windows to stored instants. A date whose shifted instant
/// chrono cannot represent is a validation failure.
fn storage_slots(windows: &[SlotWindow], offset: CivilOffset) -> Result<Vec<NewSlot>, AppError> {
    windows
        .iter()
        .map(|window| {
            let (start, end) = window
                .to_instants(offset)
                .map_err(|e| AppError::validation(&e.to_string()))?;
            Ok(NewSlot { start, end })
        })
        .collect()
}

/// POST /api/v1/meetings
pub async fn create_meeting(
    State(state): State<AppState>,
    payload: Result<Json<CreateMeetingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<APIResponse<CreateMeetingResponse>>), AppError> {
    let Json(body) = payload?;
    let windows = plan_meeting(&body)?;
    let slots = storage_slots(&windows, state.civil_offset)?;

    let access_token = generate_access_token();
    let meeting = state
        .store
        .create_meeting(
            body.title.trim(),
            optional_text(body.description.as_deref()),
            &access_token,
        )
        .await?;

    state.store.create_slots(meeting.id, &slots).await?;

    tracing::info!(
        meeting_id = %meeting.id,
        slot_count = slots.len(),
        "Created meeting"
    );

    let meeting_id = meeting.id.to_string();
    let response = CreateMeetingResponse {
        meeting_id: meeting.id,
        access_token: meeting.access_token,
        participant_url: state.participant_url(&meeting_id),
        slot_count: slots.len(),
    };

    Ok((StatusCode::CREATED, Json(APIResponse::ok(response))))
}

/// GET /api/v1/meetings/{meeting_id}
pub async fn get_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<APIResponse<MeetingInfoResponse>>, AppError> {
    let meeting = load_meeting(&state, &meeting_id).await?;

    Ok(Json(APIResponse::ok(MeetingInfoResponse {
        meeting_id: meeting.id,
        title: meeting.title,
        description: meeting.description,
        created_at: meeting.created_at.timestamp(),
    })))
}

/// GET /api/v1/meetings/{meeting_id}/slots
pub async fn list_slots(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<APIResponse<ListSlotsResponse>>, AppError> {
    let meeting = load_meeting(&state, &meeting_id).await?;
    let records = state.store.list_slots(meeting.id).await?;
    let index = canonical_slots(&records, state.civil_offset)?;

    let slots = index
        .slots
        .into_iter()
        .map(|slot| SlotSummary {
            slot_id: slot.id,
            date: slot.window.date,
            display_time: slot.window.display_time(),
            key: slot.key,
            start: slot.start,
            end: slot.end,
        })
        .collect();

    Ok(Json(APIResponse::ok(ListSlotsResponse {
        meeting_id: meeting.id,
        slots,
    })))
}
