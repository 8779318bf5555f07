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

//! Shared application state passed to every Axum handler via `State`.

use std::sync::Arc;

use timepoll_core::CivilOffset;

use crate::config::Config;
use crate::store::Store;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Base URL for participant links, without a trailing slash.
    pub public_url: String,
    pub civil_offset: CivilOffset,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            store,
            public_url: config.public_url.clone(),
            civil_offset: config.civil_offset,
        }
    }

    pub fn participant_url(&self, meeting_id: &str) -> String {
        format!("{}/participant/{meeting_id}", self.public_url)
    }
}
