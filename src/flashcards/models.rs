//! Data models for the flashcard system

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Lowest ease a card can reach
pub const MIN_EASE: f64 = 1.3;

/// Highest ease a card can reach
pub const MAX_EASE: f64 = 5.0;

/// Ease given to new cards when no difficulty model is available
pub const DEFAULT_EASE: f64 = 2.5;

/// Interval (minutes) at or above which a review counts as a mature review
pub const MATURE_INTERVAL: u32 = 1440;

/// Clamp an ease factor into the allowed range
pub fn clamp_ease(ease: f64) -> f64 {
    ease.clamp(MIN_EASE, MAX_EASE)
}

/// Stage of a card's learning progress.
///
/// The on-disk encoding is kept compatible with existing card files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// First learning pass
    #[default]
    #[serde(rename = "1")]
    Learning,
    /// Answered correctly once, or recovered after a lapse
    #[serde(rename = "2")]
    Young,
    /// Answered correctly on consecutive viewings
    #[serde(rename = "3")]
    Mature,
    #[serde(rename = "again 1")]
    RelapsedFromLearning,
    #[serde(rename = "again 2")]
    RelapsedFromYoung,
    #[serde(rename = "again 3")]
    RelapsedFromMature,
}

impl Phase {
    /// Phase after a correct answer
    pub fn after_correct(self) -> Self {
        match self {
            Phase::Learning => Phase::Young,
            Phase::Young => Phase::Mature,
            Phase::Mature => Phase::Mature,
            Phase::RelapsedFromLearning
            | Phase::RelapsedFromYoung
            | Phase::RelapsedFromMature => Phase::Young,
        }
    }

    /// Phase after an "again" answer. Relapsed phases stay where they are.
    pub fn after_again(self) -> Self {
        match self {
            Phase::Learning => Phase::RelapsedFromLearning,
            Phase::Young => Phase::RelapsedFromYoung,
            Phase::Mature => Phase::RelapsedFromMature,
            relapsed => relapsed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Learning => "learning",
            Phase::Young => "young",
            Phase::Mature => "mature",
            Phase::RelapsedFromLearning => "relapsed (learning)",
            Phase::RelapsedFromYoung => "relapsed (young)",
            Phase::RelapsedFromMature => "relapsed (mature)",
        }
    }
}

/// A flashcard with its scheduling state.
///
/// The question is the natural key: no two cards share one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Card {
    pub deck: String,
    pub question: String,
    pub answer: String,
    pub ease: f64,
    #[serde(with = "due_format")]
    pub due: NaiveDateTime,
    /// Minutes until the card is due again
    pub interval: u32,
    pub phase: Phase,
}

impl Card {
    pub fn new(deck: String, question: String, answer: String, ease: f64, now: NaiveDateTime) -> Self {
        Self {
            deck,
            question,
            answer,
            ease: clamp_ease(ease),
            due: now,
            interval: 0,
            phase: Phase::Learning,
        }
    }

    /// Due on or before `today`. Only the date is compared, never the time of day.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.due.date() <= today
    }

    /// Whether a review of this card right now would be a mature review
    pub fn is_mature_review(&self) -> bool {
        self.interval >= MATURE_INTERVAL
    }

    /// Length of the answer in characters, the regression input
    pub fn answer_len(&self) -> usize {
        self.answer.chars().count()
    }

    pub(crate) fn reschedule(&mut self, interval: u32, now: NaiveDateTime) {
        self.interval = interval;
        self.due = now + Duration::minutes(interval as i64);
    }
}

/// Answer given during a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Again,
}

/// One entry of the mature-review outcome log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReviewOutcomeRecord {
    pub outcome: Outcome,
    pub date: NaiveDate,
}

impl ReviewOutcomeRecord {
    pub fn new(outcome: Outcome, date: NaiveDate) -> Self {
        Self { outcome, date }
    }
}

/// Summary figures for the whole collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub due_cards: usize,
    /// Percentage over every recorded mature review, `None` without history
    pub retention_rate: Option<f64>,
    /// Percentage over the last 30 days, `None` without history in that window
    pub retention_rate_30_days: Option<f64>,
}

/// Timestamp format used in card files, e.g. `2024-03-01 18:22:05.123456`
pub(crate) mod due_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub fn serialize<S: Serializer>(due: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&due.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
