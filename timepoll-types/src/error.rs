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

//! API error types.
//!
//! Every failed API response is returned as `APIResponse<APIError>` with `success: false`.

use serde::{Deserialize, Serialize};

/// Structured error returned in the `result` field of a failed [`super::APIResponse`].
///
/// `code` is machine readable (e.g. `"MEETING_NOT_FOUND"`), `message` is meant
/// for display, and `engineering_error` carries debug detail such as the
/// underlying database error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct APIError {
    /// Machine-readable error code (e.g. `"VALIDATION_ERROR"`, `"UNKNOWN_SLOT"`).
    pub code: String,

    /// Human-readable error message.
    pub message: String,

    /// Optional engineering-level detail for debugging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engineering_error: Option<String>,
}

impl APIError {
    /// A required field is missing or a value is out of bounds.
    pub fn validation(detail: &str) -> Self {
        Self {
            code: "VALIDATION_ERROR".to_string(),
            message: detail.to_string(),
            engineering_error: None,
        }
    }

    /// The request body could not be decoded.
    pub fn invalid_request(detail: &str) -> Self {
        Self {
            code: "INVALID_REQUEST".to_string(),
            message: "Request body is not valid".to_string(),
            engineering_error: Some(detail.to_string()),
        }
    }

    pub fn invalid_meeting_id(detail: &str) -> Self {
        Self {
            code: "INVALID_MEETING_ID".to_string(),
            message: format!("Invalid meeting ID: {detail}"),
            engineering_error: None,
        }
    }

    pub fn meeting_not_found(meeting_id: &str) -> Self {
        Self {
            code: "MEETING_NOT_FOUND".to_string(),
            message: format!("Meeting '{meeting_id}' not found"),
            engineering_error: None,
        }
    }

    pub fn unknown_slot(key: &str) -> Self {
        Self {
            code: "UNKNOWN_SLOT".to_string(),
            message: format!("Slot '{key}' is not offered by this meeting"),
            engineering_error: None,
        }
    }

    /// A store call failed; the operation was aborted as a whole.
    pub fn store_error(detail: &str) -> Self {
        Self {
            code: "STORE_ERROR".to_string(),
            message: "Could not reach the schedule store, please try again".to_string(),
            engineering_error: Some(detail.to_string()),
        }
    }
}

impl std::fmt::Display for APIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for APIError {}
