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

//! Participant endpoints: read the grid, submit answers.

use timepoll_core::ResponseDraft;
use timepoll_types::{
    requests::SubmitParticipantRequest,
    responses::{ScheduleResponse, SubmitParticipantResponse},
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::{parse_api_response, ScheduleApiClient};

/// Turn a finished draft into a submission body.
pub fn submission_from_draft(
    name: &str,
    comment: Option<&str>,
    draft: ResponseDraft,
) -> SubmitParticipantRequest {
    SubmitParticipantRequest {
        name: name.to_string(),
        comment: comment.map(str::to_string),
        choices: draft
            .into_choices()
            .into_iter()
            .map(|(key, availability)| (key.into(), availability))
            .collect(),
    }
}

impl ScheduleApiClient {
    /// Calls `GET /api/v1/meetings/{meeting_id}/schedule`.
    pub async fn get_schedule(&self, meeting_id: Uuid) -> Result<ScheduleResponse, ApiError> {
        let path = format!("/api/v1/meetings/{meeting_id}/schedule");
        let response = self.get(&path).send().await?;
        parse_api_response(response).await
    }

    /// Submit a participant's answers. A successful response means the
    /// answers are saved; its `schedule` is `None` when the server could not
    /// rebuild the grid, in which case call [`Self::get_schedule`] rather
    /// than submitting again.
    ///
    /// Calls `POST /api/v1/meetings/{meeting_id}/participants`.
    pub async fn submit_participant(
        &self,
        meeting_id: Uuid,
        request: &SubmitParticipantRequest,
    ) -> Result<SubmitParticipantResponse, ApiError> {
        log::debug!(
            "submitting {} answers for meeting {meeting_id}",
            request.choices.len()
        );
        let path = format!("/api/v1/meetings/{meeting_id}/participants");
        let response = self.post(&path).json(request).send().await?;
        parse_api_response(response).await
    }
}
