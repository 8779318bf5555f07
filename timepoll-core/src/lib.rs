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

//! Scheduling core for timepoll.
//!
//! Turns candidate dates and an hour range into canonical 30-minute slots,
//! and turns stored responses into a consensus grid. Everything here is
//! synchronous and free of I/O; storage and transport live in other crates.

pub mod availability;
pub mod civil;
pub mod draft;
pub mod schedule;
pub mod slot;

pub use availability::{Availability, Consensus, InvalidScore, Tier};
pub use civil::CivilOffset;
pub use draft::ResponseDraft;
pub use schedule::{
    canonical_slots, AssemblyError, CanonicalSlot, Column, ParticipantRecord, ResponseRecord,
    Schedule, ScheduleRow, SlotIndex, SlotRecord,
};
pub use slot::{HourRange, SlotError, SlotKey, SlotWindow, SlotWindows, SLOT_MINUTES};
