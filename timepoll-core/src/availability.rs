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

//! Per-slot availability scores and the consensus tier derived from them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A participant's answer for one slot.
///
/// On the wire the answer is a label (`"OK"`, `"MAYBE"`, `"NG"`); in storage
/// it is the numeric [`score`](Self::score).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "NG")]
    Unavailable,
    #[serde(rename = "MAYBE")]
    Maybe,
    #[serde(rename = "OK")]
    Available,
}

/// Highest score a single answer can contribute.
pub const MAX_SCORE: i16 = 3;

impl Availability {
    pub const fn score(self) -> i16 {
        match self {
            Self::Unavailable => 0,
            Self::Maybe => 1,
            Self::Available => MAX_SCORE,
        }
    }

    /// Grid symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Unavailable => "✕",
            Self::Maybe => "△",
            Self::Available => "◯",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("availability score must be 0, 1 or 3, got {0}")]
pub struct InvalidScore(pub i16);

impl TryFrom<i16> for Availability {
    type Error = InvalidScore;

    fn try_from(score: i16) -> Result<Self, Self::Error> {
        match score {
            0 => Ok(Self::Unavailable),
            1 => Ok(Self::Maybe),
            MAX_SCORE => Ok(Self::Available),
            other => Err(InvalidScore(other)),
        }
    }
}

impl From<Availability> for i16 {
    fn from(availability: Availability) -> Self {
        availability.score()
    }
}

/// Display bucket for one slot's consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Every contributor answered OK.
    Full,
    /// Only OK and MAYBE answers.
    NoConflicts,
    High,
    Moderate,
    Low,
    /// Nobody answered.
    Neutral,
}

/// Aggregate of the answers given for one slot.
///
/// Only participants that answered the slot contribute; the result depends on
/// the multiset of answers alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Consensus {
    contributors: u32,
    total_score: u32,
    has_conflict: bool,
}

impl Consensus {
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = Availability>,
    {
        scores.into_iter().collect()
    }

    pub fn contributors(&self) -> u32 {
        self.contributors
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    fn max_score(&self) -> u64 {
        u64::from(self.contributors) * MAX_SCORE as u64
    }

    /// `total / (3 × contributors)`, undefined without contributors.
    pub fn ratio(&self) -> Option<f64> {
        if self.contributors == 0 {
            return None;
        }
        Some(f64::from(self.total_score) / self.max_score() as f64)
    }

    /// First matching rule wins: full, no conflicts, > 0.7, ≥ 0.4, low.
    ///
    /// Thresholds are compared on integers, `10 × total` against
    /// `7 × max` and `4 × max`.
    pub fn tier(&self) -> Tier {
        if self.contributors == 0 {
            return Tier::Neutral;
        }

        let total = u64::from(self.total_score);
        let max = self.max_score();

        if total == max {
            Tier::Full
        } else if !self.has_conflict {
            Tier::NoConflicts
        } else if total * 10 > max * 7 {
            Tier::High
        } else if total * 10 >= max * 4 {
            Tier::Moderate
        } else {
            Tier::Low
        }
    }
}

impl FromIterator<Availability> for Consensus {
    fn from_iter<T: IntoIterator<Item = Availability>>(iter: T) -> Self {
        iter.into_iter().fold(Self::default(), |acc, answer| Self {
            contributors: acc.contributors + 1,
            total_score: acc.total_score + answer.score() as u32,
            has_conflict: acc.has_conflict || answer == Availability::Unavailable,
        })
    }
}
