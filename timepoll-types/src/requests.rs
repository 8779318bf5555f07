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

//! Request types for the schedule REST API.
//!
//! These types define the shape of request bodies. They are used by both the
//! server (for deserialization) and clients (for serialization).
//!
//! Slot keys travel as plain strings so the server can report a malformed or
//! foreign key as a validation error instead of a decode failure.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use timepoll_core::Availability;

/// Request body for `POST /api/v1/meetings`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateMeetingRequest {
    /// Required, at most 255 characters.
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Candidate calendar dates in the organizer's civil zone.
    pub dates: Vec<NaiveDate>,

    /// Daily range start, `HH:MM`.
    pub start_time: String,

    /// Daily range end, `HH:MM`, exclusive.
    pub end_time: String,

    /// Restrict the generated grid to these slot keys. Omit to offer every
    /// window of `dates × start_time..end_time`.
    #[serde(default)]
    pub slots: Option<Vec<String>>,
}

/// Request body for `POST /api/v1/meetings/{meeting_id}/participants`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubmitParticipantRequest {
    /// Display name, 1 to 6 characters.
    pub name: String,

    /// Optional free text, at most 40 characters.
    #[serde(default)]
    pub comment: Option<String>,

    /// Answer per slot key (`"YYYY-MM-DD HH:MM-HH:MM"`).
    pub choices: BTreeMap<String, Availability>,
}
