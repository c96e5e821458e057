//! Collaborator interfaces used by the scheduler
//!
//! The scheduler never touches files directly; it is handed implementations
//! of these traits. File-backed versions live in [`super::storage`],
//! [`super::history`] and [`super::settings`].

use chrono::NaiveDate;

use super::models::{Card, Outcome};
use super::storage::Result;

/// Persistent set of cards, keyed by question
pub trait CardStore {
    fn list_all(&self) -> Result<Vec<Card>>;

    fn find_by_question(&self, question: &str) -> Result<Option<Card>> {
        Ok(self.list_all()?.into_iter().find(|c| c.question == question))
    }

    /// Insert the card, or replace the stored card with the same question
    fn upsert(&self, card: &Card) -> Result<()>;

    /// Remove the card with this card's question. Missing cards are ignored.
    fn delete(&self, card: &Card) -> Result<()>;

    /// Replace the whole record set in one step
    fn replace_all(&self, cards: &[Card]) -> Result<()>;
}

/// Append-only log of mature review outcomes
pub trait ReviewHistoryStore {
    fn record(&self, outcome: Outcome, date: NaiveDate) -> Result<()>;

    fn record_correct(&self, date: NaiveDate) -> Result<()> {
        self.record(Outcome::Correct, date)
    }

    fn record_again(&self, date: NaiveDate) -> Result<()> {
        self.record(Outcome::Again, date)
    }

    /// Percentage of correct outcomes, `None` when there are no records.
    ///
    /// With `since_days`, only records dated strictly after
    /// `today - since_days` are counted.
    fn retention_rate(&self, since_days: Option<u32>, today: NaiveDate) -> Result<Option<f64>>;
}

/// User-configurable scheduling settings
pub trait SettingsStore {
    /// Target retention percentage, 50 to 99
    fn target_retention_rate(&self) -> Result<u8>;
}
