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

//! In-progress participant answers.
//!
//! A [`ResponseDraft`] is a value: every event consumes the draft and returns
//! the next one. Pressing a choice on a row starts a paint gesture; entering
//! further rows while pressed copies that choice onto them until release.

use std::collections::BTreeMap;

use crate::availability::Availability;
use crate::slot::SlotKey;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseDraft {
    choices: BTreeMap<SlotKey, Availability>,
    brush: Option<Availability>,
}

impl ResponseDraft {
    /// Every offered key starts out available.
    pub fn new<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = SlotKey>,
    {
        Self {
            choices: keys
                .into_iter()
                .map(|key| (key, Availability::Available))
                .collect(),
            brush: None,
        }
    }

    pub fn get(&self, key: &SlotKey) -> Option<Availability> {
        self.choices.get(key).copied()
    }

    pub fn is_painting(&self) -> bool {
        self.brush.is_some()
    }

    /// Set one key; unknown keys leave the draft unchanged.
    pub fn set(mut self, key: &SlotKey, availability: Availability) -> Self {
        if let Some(choice) = self.choices.get_mut(key) {
            *choice = availability;
        }
        self
    }

    /// Start painting `availability`, beginning with `key`.
    pub fn press(self, key: &SlotKey, availability: Availability) -> Self {
        let mut next = self.set(key, availability);
        next.brush = Some(availability);
        next
    }

    /// Pointer moved onto `key`.
    pub fn enter(self, key: &SlotKey) -> Self {
        match self.brush {
            Some(brush) => self.set(key, brush),
            None => self,
        }
    }

    pub fn release(mut self) -> Self {
        self.brush = None;
        self
    }

    pub fn choices(&self) -> impl Iterator<Item = (&SlotKey, Availability)> + '_ {
        self.choices.iter().map(|(key, choice)| (key, *choice))
    }

    pub fn into_choices(self) -> BTreeMap<SlotKey, Availability> {
        self.choices
    }
}
