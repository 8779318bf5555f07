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

//! Cross-platform REST client for the timepoll schedule API.
//!
//! Works on WASM (browser), desktop, and mobile targets via [`reqwest`].
//!
//! # Example
//!
//! ```no_run
//! use timepoll_client::ScheduleApiClient;
//!
//! # async fn example(meeting_id: uuid::Uuid) -> Result<(), timepoll_client::ApiError> {
//! let client = ScheduleApiClient::new("http://localhost:8081");
//! let grid = client.get_schedule(meeting_id).await?;
//! println!("{}", timepoll_client::render::grid_text(&grid.schedule));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod meetings;
pub mod participants;
pub mod render;

pub use error::ApiError;
pub use timepoll_types;

use reqwest::Client;
use timepoll_types::{APIError, APIResponse};

/// A typed REST client for the schedule API.
///
/// All methods return strongly-typed responses from [`timepoll_types`] and
/// map HTTP errors to [`ApiError`].
#[derive(Debug, Clone)]
pub struct ScheduleApiClient {
    base_url: String,
    http: Client,
}

impl ScheduleApiClient {
    /// Create a new client pointing at the given base URL, e.g.
    /// `"http://localhost:8081"`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.post(self.url(path))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Parse a standard `APIResponse<T>` body, returning `T` on success or
/// mapping the error to [`ApiError`].
pub(crate) async fn parse_api_response<T: serde::de::DeserializeOwned + serde::Serialize>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    match status {
        200 | 201 => {
            let wrapper: APIResponse<T> = response.json().await?;
            Ok(wrapper.result)
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            let err = error_from_body(status, text);
            log::warn!("schedule API call failed: {err}");
            Err(err)
        }
    }
}

/// Map a failed response to [`ApiError`], using the `APIError` envelope
/// when the body carries one.
pub(crate) fn error_from_body(status: u16, body: String) -> ApiError {
    let parsed = serde_json::from_str::<APIResponse<APIError>>(&body)
        .ok()
        .filter(|wrapper| !wrapper.success)
        .map(|wrapper| wrapper.result);

    match (status, parsed) {
        (404, Some(error)) => ApiError::NotFound(error),
        (400, Some(error)) if error.code == "UNKNOWN_SLOT" => ApiError::UnknownSlot(error),
        (400..=499, Some(error)) => ApiError::Rejected(error),
        (500..=599, Some(error)) if error.code == "STORE_ERROR" => ApiError::Store(error),
        _ => ApiError::ServerError { status, body },
    }
}
