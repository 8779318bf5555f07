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

//! Error types for the schedule API client.

use thiserror::Error;
use timepoll_types::APIError;

/// Errors returned by [`ScheduleApiClient`](crate::ScheduleApiClient) methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The meeting does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(APIError),

    /// A submitted answer names a slot the meeting does not offer.
    #[error("Unknown slot: {0}")]
    UnknownSlot(APIError),

    /// The request failed validation (HTTP 4xx).
    #[error("Rejected: {0}")]
    Rejected(APIError),

    /// The server could not reach its store; nothing was saved.
    #[error("Store unavailable: {0}")]
    Store(APIError),

    /// Any other failure, with the raw status and body.
    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    /// A network or transport error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
