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

//! Organizer endpoints: create a meeting, read it and its slots.

use timepoll_types::{
    requests::CreateMeetingRequest,
    responses::{CreateMeetingResponse, ListSlotsResponse, MeetingInfoResponse},
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::{parse_api_response, ScheduleApiClient};

impl ScheduleApiClient {
    /// Create a meeting and its slot grid.
    ///
    /// Calls `POST /api/v1/meetings`.
    pub async fn create_meeting(
        &self,
        request: &CreateMeetingRequest,
    ) -> Result<CreateMeetingResponse, ApiError> {
        log::debug!("creating meeting {:?}", request.title);
        let response = self.post("/api/v1/meetings").json(request).send().await?;
        parse_api_response(response).await
    }

    /// Calls `GET /api/v1/meetings/{meeting_id}`.
    pub async fn get_meeting(&self, meeting_id: Uuid) -> Result<MeetingInfoResponse, ApiError> {
        let path = format!("/api/v1/meetings/{meeting_id}");
        let response = self.get(&path).send().await?;
        parse_api_response(response).await
    }

    /// Deduplicated slots in chronological order.
    ///
    /// Calls `GET /api/v1/meetings/{meeting_id}/slots`.
    pub async fn list_slots(&self, meeting_id: Uuid) -> Result<ListSlotsResponse, ApiError> {
        let path = format!("/api/v1/meetings/{meeting_id}/slots");
        let response = self.get(&path).send().await?;
        parse_api_response(response).await
    }
}
