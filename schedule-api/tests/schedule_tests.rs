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

//! Integration tests for the participant flow: reading the grid and submitting answers.


use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use test_helpers::*;
use timepoll_core::{Availability, Tier};
use timepoll_types::{
    responses::{APIResponse, ScheduleResponse, SubmitParticipantResponse},
    APIError,
};
use schedule_api::store::Store;
use tower::ServiceExt;
use uuid::Uuid;

const KEYS: [&str; 4] = [
    "2025-10-01 10:00-10:30",
    "2025-10-01 10:30-11:00",
    "2025-10-02 10:00-10:30",
    "2025-10-02 10:30-11:00",
];

fn all(label: &str) -> serde_json::Value {
    KEYS.iter()
        .map(|key| (key.to_string(), serde_json::json!(label)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

async fn submit(app: &Router, meeting_id: Uuid, body: serde_json::Value) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/meetings/{meeting_id}/participants"),
            body,
        ))
        .await
        .unwrap()
}

async fn schedule(app: &Router, meeting_id: Uuid) -> ScheduleResponse {
    let resp = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/meetings/{meeting_id}/schedule")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: APIResponse<ScheduleResponse> = response_json(resp).await;
    assert!(body.success);
    body.result
}

// ── Schedule ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_schedule_is_neutral() {
    let app = build_app();
    let created = create_meeting(&app, two_day_meeting()).await;

    let grid = schedule(&app, created.meeting_id).await;
    assert_eq!(grid.title, "Design review");
    assert!(grid.schedule.columns.is_empty());
    assert_eq!(grid.schedule.rows.len(), 4);
    for row in &grid.schedule.rows {
        assert_eq!(row.tier, Tier::Neutral);
        assert_eq!(row.ratio, None);
        assert!(row.cells.is_empty());
    }
    let new_day: Vec<bool> = grid.schedule.rows.iter().map(|r| r.starts_new_day).collect();
    assert_eq!(new_day, [true, false, true, false]);
}

#[tokio::test]
async fn test_all_ok_submission_makes_every_row_full() {
    let app = build_app();
    let created = create_meeting(&app, two_day_meeting()).await;

    let resp = submit(
        &app,
        created.meeting_id,
        serde_json::json!({"name": "taro", "choices": all("OK")}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: APIResponse<SubmitParticipantResponse> = response_json(resp).await;

    let grid = body.result.schedule.expect("refreshed grid").schedule;
    assert_eq!(grid.columns.len(), 1);
    assert_eq!(grid.columns[0].participant_id, body.result.participant_id);
    assert_eq!(grid.columns[0].name, "taro");
    assert_eq!(grid.rows.len(), 4);
    for row in &grid.rows {
        assert_eq!(row.tier, Tier::Full);
        assert_eq!(row.cells, vec![Some(Availability::Available)]);
    }
    let keys: Vec<&str> = grid.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, KEYS);
}

#[tokio::test]
async fn test_mixed_answers_produce_tiers_and_newest_first_columns() {
    let app = build_app();
    let created = create_meeting(&app, two_day_meeting()).await;

    let first = serde_json::json!({"name": "a", "choices": all("OK")});
    let second = serde_json::json!({
        "name": "b",
        "comment": "only mornings",
        "choices": {
            KEYS[0]: "MAYBE",
            KEYS[1]: "NG",
            KEYS[2]: "OK",
        }
    });
    assert_eq!(submit(&app, created.meeting_id, first).await.status(), StatusCode::CREATED);
    assert_eq!(submit(&app, created.meeting_id, second).await.status(), StatusCode::CREATED);

    let grid = schedule(&app, created.meeting_id).await.schedule;
    let names: Vec<&str> = grid.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["b", "a"]);
    assert_eq!(grid.columns[0].comment.as_deref(), Some("only mornings"));

    let tiers: Vec<Tier> = grid.rows.iter().map(|r| r.tier).collect();
    // {3,1}, {3,0}, {3,3}, {3}
    assert_eq!(tiers, [Tier::NoConflicts, Tier::Moderate, Tier::Full, Tier::Full]);
    assert_eq!(grid.rows[3].cells, vec![None, Some(Availability::Available)]);
    assert_eq!(grid.rows[3].contributors, 1);
}

// ── Submission validation ────────────────────────────────────────────────

#[tokio::test]
async fn test_submission_validation_errors() {
    let app = build_app();
    let created = create_meeting(&app, two_day_meeting()).await;

    let cases = [
        serde_json::json!({"name": "", "choices": all("OK")}),
        serde_json::json!({"name": "toolong", "choices": all("OK")}),
        serde_json::json!({"name": "ken", "comment": "x".repeat(41), "choices": all("OK")}),
        serde_json::json!({"name": "ken", "choices": {}}),
        serde_json::json!({"name": "ken", "choices": {"2025-10-01 10:00": "OK"}}),
    ];
    for case in cases {
        let resp = submit(&app, created.meeting_id, case.clone()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "case {case}");
        let body: APIResponse<APIError> = response_json(resp).await;
        assert_eq!(body.result.code, "VALIDATION_ERROR", "case {case}");
    }

    assert!(schedule(&app, created.meeting_id).await.schedule.columns.is_empty());
}

#[tokio::test]
async fn test_submission_for_slot_outside_meeting() {
    let app = build_app();
    let created = create_meeting(&app, two_day_meeting()).await;

    let resp = submit(
        &app,
        created.meeting_id,
        serde_json::json!({"name": "ken", "choices": {"2025-10-03 10:00-10:30": "OK"}}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: APIResponse<APIError> = response_json(resp).await;
    assert_eq!(body.result.code, "UNKNOWN_SLOT");
}

#[tokio::test]
async fn test_submission_rejects_unknown_label() {
    let app = build_app();
    let created = create_meeting(&app, two_day_meeting()).await;

    let resp = submit(
        &app,
        created.meeting_id,
        serde_json::json!({"name": "ken", "choices": {KEYS[0]: "YES"}}),
    )
    .await;
    assert!(resp.status().is_client_error());
    let body: APIResponse<APIError> = response_json(resp).await;
    assert_eq!(body.result.code, "INVALID_REQUEST");
}

#[tokio::test]
async fn test_submission_to_missing_meeting() {
    let app = build_app();
    let resp = submit(
        &app,
        Uuid::new_v4(),
        serde_json::json!({"name": "ken", "choices": all("OK")}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Store failures ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_schedule_aborts_when_a_fetch_fails() {
    for failure in [Failure::ListSlots, Failure::ListParticipants] {
        let app = build_app_with(Arc::new(FailingStore::new(failure)));
        let created = create_meeting(&app, two_day_meeting()).await;

        let resp = app
            .clone()
            .oneshot(get_request(&format!(
                "/api/v1/meetings/{}/schedule",
                created.meeting_id
            )))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{failure:?}");
        let body: APIResponse<APIError> = response_json(resp).await;
        assert!(!body.success);
        assert_eq!(body.result.code, "STORE_ERROR");
    }
}

#[tokio::test]
async fn test_failed_submission_registers_nobody() {
    let store = Arc::new(FailingStore::new(Failure::Submit));
    let app = build_app_with(store.clone());
    let created = create_meeting(&app, two_day_meeting()).await;

    let resp = submit(
        &app,
        created.meeting_id,
        serde_json::json!({"name": "ken", "choices": all("OK")}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let grid = schedule(&app, created.meeting_id).await;
    assert!(grid.schedule.columns.is_empty());
}

#[tokio::test]
async fn test_saved_submission_survives_a_failed_refresh() {
    let store = Arc::new(FailingStore::new(Failure::ListParticipants));
    let app = build_app_with(store.clone());
    let created = create_meeting(&app, two_day_meeting()).await;

    let resp = submit(
        &app,
        created.meeting_id,
        serde_json::json!({"name": "ken", "choices": all("OK")}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: APIResponse<SubmitParticipantResponse> = response_json(resp).await;
    assert!(body.success);
    assert!(body.result.schedule.is_none());

    let saved = store
        .inner
        .list_participants_with_responses(created.meeting_id)
        .await
        .unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, body.result.participant_id);
    assert_eq!(saved[0].responses.len(), KEYS.len());
}
