//! Scheduling engine
//!
//! Every call re-reads what it needs from the injected stores, applies the
//! pure rules in [`super::algorithm`], and writes the result back. Nothing is
//! cached between calls.

use chrono::{Local, NaiveDate, NaiveDateTime};

use super::algorithm;
use super::models::{Card, Outcome, ReviewStats};
use super::regression;
use super::storage::{FlashcardError, Result};
use super::store::{CardStore, ReviewHistoryStore, SettingsStore};

/// Window (days) of the retention rate that gates the ease bonus
pub const RETENTION_WINDOW_DAYS: u32 = 30;

/// Source of the current local time
pub type Clock = fn() -> NaiveDateTime;

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub struct SchedulingEngine<C, H, S> {
    cards: C,
    history: H,
    settings: S,
    clock: Clock,
}

impl<C, H, S> SchedulingEngine<C, H, S>
where
    C: CardStore,
    H: ReviewHistoryStore,
    S: SettingsStore,
{
    pub fn new(cards: C, history: H, settings: S) -> Self {
        Self {
            cards,
            history,
            settings,
            clock: local_now,
        }
    }

    /// Replace the clock, mainly for tests
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn cards(&self) -> &C {
        &self.cards
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Load the stored version of a card; the caller's copy may be stale
    fn stored(&self, question: &str) -> Result<Card> {
        self.cards
            .find_by_question(question)?
            .ok_or_else(|| FlashcardError::CardNotFound(question.to_string()))
    }

    // ==================== Study ====================

    /// The card to study next, preferring `preferred_deck` when it has due cards
    pub fn next_card(&self, preferred_deck: Option<&str>) -> Result<Option<Card>> {
        let cards = self.cards.list_all()?;
        let today = self.now().date();
        Ok(algorithm::select_next_card(&cards, preferred_deck, today).cloned())
    }

    /// Number of cards due today, optionally only in one deck
    pub fn due_count(&self, deck: Option<&str>) -> Result<usize> {
        let cards = self.cards.list_all()?;
        Ok(algorithm::due_cards(&cards, deck, self.now().date()).len())
    }

    /// Record a correct answer for a card
    pub fn apply_correct(&self, card: &Card) -> Result<Card> {
        let stored = self.stored(&card.question)?;
        let now = self.now();
        let today = now.date();

        let mature = stored.is_mature_review();
        let mut ease_bonus = false;
        if mature {
            let target = self.settings.target_retention_rate()?;
            let retention = self.history.retention_rate(Some(RETENTION_WINDOW_DAYS), today)?;
            ease_bonus = retention.map_or(false, |rate| rate >= target as f64);
            log::debug!(
                "Mature review of {:?}: retention {:?}, target {}%, bonus {}",
                stored.question,
                retention,
                target,
                ease_bonus
            );
        }

        let next = algorithm::apply_correct(&stored, ease_bonus, now);
        self.cards.upsert(&next)?;
        if mature {
            self.log_or_restore(&stored, Outcome::Correct, today)?;
        }

        Ok(next)
    }

    /// Record an "again" answer for a card
    pub fn apply_again(&self, card: &Card) -> Result<Card> {
        let stored = self.stored(&card.question)?;
        let now = self.now();

        let next = algorithm::apply_again(&stored, now);
        self.cards.upsert(&next)?;
        if stored.is_mature_review() {
            self.log_or_restore(&stored, Outcome::Again, now.date())?;
        }

        Ok(next)
    }

    /// Log a mature review outcome. If the log can't be written the card is
    /// put back the way it was, so a failed review changes nothing.
    fn log_or_restore(&self, previous: &Card, outcome: Outcome, date: NaiveDate) -> Result<()> {
        let err = match self.history.record(outcome, date) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        if let Err(restore_err) = self.cards.upsert(previous) {
            log::warn!("Failed to restore card {:?}: {}", previous.question, restore_err);
        }
        Err(err)
    }

    /// Apply an outcome to the card with this question
    pub fn answer(&self, question: &str, outcome: Outcome) -> Result<Card> {
        let card = self.stored(question)?;
        match outcome {
            Outcome::Correct => self.apply_correct(&card),
            Outcome::Again => self.apply_again(&card),
        }
    }

    // ==================== Card management ====================

    /// Create a new card, starting from an ease predicted from the collection
    pub fn add_card(&self, deck: &str, question: &str, answer: &str) -> Result<Card> {
        if question.trim().is_empty() {
            return Err(FlashcardError::EmptyQuestion);
        }

        let cards = self.cards.list_all()?;
        if cards.iter().any(|c| c.question == question) {
            return Err(FlashcardError::DuplicateQuestion(question.to_string()));
        }

        let model = regression::fit_cards(&cards);
        let ease = regression::estimate_initial_ease(answer.chars().count(), model.as_ref());

        let card = Card::new(deck.to_string(), question.to_string(), answer.to_string(), ease, self.now());
        self.cards.upsert(&card)?;

        log::info!("Added card to deck {:?} with ease {:.2}", deck, card.ease);
        Ok(card)
    }

    /// Change a card's question and answer, keeping its schedule
    pub fn edit_card(&self, question: &str, new_question: &str, new_answer: &str) -> Result<Card> {
        if new_question.trim().is_empty() {
            return Err(FlashcardError::EmptyQuestion);
        }

        let mut cards = self.cards.list_all()?;
        if new_question != question && cards.iter().any(|c| c.question == new_question) {
            return Err(FlashcardError::DuplicateQuestion(new_question.to_string()));
        }
        let card = cards
            .iter_mut()
            .find(|c| c.question == question)
            .ok_or_else(|| FlashcardError::CardNotFound(question.to_string()))?;

        card.question = new_question.to_string();
        card.answer = new_answer.to_string();
        let edited = card.clone();

        // The key may have changed, so the whole set is rewritten
        self.cards.replace_all(&cards)?;
        Ok(edited)
    }

    /// Move a single card to another deck
    pub fn move_card(&self, question: &str, deck: &str) -> Result<Card> {
        let mut card = self.stored(question)?;
        card.deck = deck.to_string();
        self.cards.upsert(&card)?;
        Ok(card)
    }

    pub fn delete_card(&self, question: &str) -> Result<Card> {
        let card = self.stored(question)?;
        self.cards.delete(&card)?;
        log::info!("Deleted card from deck {:?}", card.deck);
        Ok(card)
    }

    /// Cards whose question or answer contains `query`, ignoring case.
    /// An empty query matches every card.
    pub fn search(&self, query: &str) -> Result<Vec<Card>> {
        let query = query.to_lowercase();
        Ok(self
            .cards
            .list_all()?
            .into_iter()
            .filter(|c| c.question.to_lowercase().contains(&query) || c.answer.to_lowercase().contains(&query))
            .collect())
    }

    pub fn stats(&self) -> Result<ReviewStats> {
        let cards = self.cards.list_all()?;
        let today = self.now().date();

        Ok(ReviewStats {
            total_cards: cards.len(),
            due_cards: algorithm::due_cards(&cards, None, today).len(),
            retention_rate: self.history.retention_rate(None, today)?,
            retention_rate_30_days: self.history.retention_rate(Some(RETENTION_WINDOW_DAYS), today)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::history::CsvReviewHistory;
    use crate::flashcards::models::{Phase, DEFAULT_EASE, MIN_EASE};
    use crate::flashcards::settings::FileSettings;
    use crate::flashcards::storage::CsvCardStore;
    use chrono::Duration;
    use std::fs;
    use tempfile::TempDir;

    type Engine = SchedulingEngine<CsvCardStore, CsvReviewHistory, FileSettings>;

    fn fixed_now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-06-15 14:30:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn create_test_engine() -> (Engine, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let cards = CsvCardStore::in_dir(dir);
        cards.init().unwrap();
        let engine = SchedulingEngine::new(cards, CsvReviewHistory::in_dir(dir), FileSettings::in_dir(dir))
            .with_clock(fixed_now);
        (engine, temp_dir)
    }

    fn store_card(engine: &Engine, deck: &str, question: &str, interval: u32, ease: f64, phase: Phase) -> Card {
        let mut card = Card::new(deck.into(), question.into(), "answer".into(), ease, fixed_now());
        card.interval = interval;
        card.phase = phase;
        engine.cards().upsert(&card).unwrap();
        card
    }

    fn today() -> NaiveDate {
        fixed_now().date()
    }

    #[test]
    fn test_add_card_defaults() {
        let (engine, _temp) = create_test_engine();
        let card = engine.add_card("Spanish", "perro", "dog").unwrap();

        assert_eq!(card.interval, 0);
        assert_eq!(card.phase, Phase::Learning);
        assert_eq!(card.ease, DEFAULT_EASE);
        assert_eq!(card.due, fixed_now());
        assert_eq!(engine.cards().list_all().unwrap(), vec![card]);
    }

    #[test]
    fn test_add_duplicate_question() {
        let (engine, _temp) = create_test_engine();
        engine.add_card("A", "same", "one").unwrap();

        let err = engine.add_card("B", "same", "two").unwrap_err();
        assert!(matches!(err, FlashcardError::DuplicateQuestion(q) if q == "same"));
        assert_eq!(engine.cards().list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_add_empty_question() {
        let (engine, _temp) = create_test_engine();
        assert!(matches!(engine.add_card("A", " ", "x"), Err(FlashcardError::EmptyQuestion)));
    }

    #[test]
    fn test_add_card_uses_regression() {
        let (engine, _temp) = create_test_engine();
        let existing: Vec<Card> = (0..150)
            .map(|i| {
                let answer = "x".repeat(i + 1);
                let ease = 4.0 - 0.01 * i as f64;
                Card::new("Bulk".into(), format!("q{}", i), answer, ease, fixed_now())
            })
            .collect();
        engine.cards().replace_all(&existing).unwrap();

        let model = regression::fit_cards(&existing).unwrap();
        let card = engine.add_card("Bulk", "new", &"y".repeat(60)).unwrap();

        assert!((card.ease - model.predict(60)).abs() < 1e-9);
        assert!(card.ease < DEFAULT_EASE + 1.0 && card.ease > DEFAULT_EASE);
    }

    #[test]
    fn test_scenario_first_correct() {
        let (engine, _temp) = create_test_engine();
        let card = engine.add_card("A", "q", "a").unwrap();
        let next = engine.apply_correct(&card).unwrap();

        assert_eq!(next.interval, 10);
        assert_eq!(next.due, fixed_now() + Duration::minutes(10));
        assert_eq!(next.phase, Phase::Young);
        assert_eq!(engine.cards().find_by_question("q").unwrap().unwrap(), next);
        assert!(engine.history().list_records().unwrap().is_empty());
    }

    #[test]
    fn test_scenario_graduation() {
        let (engine, _temp) = create_test_engine();
        let card = store_card(&engine, "A", "q", 10, 2.5, Phase::Young);
        let next = engine.apply_correct(&card).unwrap();

        assert_eq!(next.interval, 1440);
        assert_eq!(next.phase, Phase::Mature);
        assert!(engine.history().list_records().unwrap().is_empty());
    }

    #[test]
    fn test_scenario_mature_without_history() {
        let (engine, _temp) = create_test_engine();
        let card = store_card(&engine, "A", "q", 1440, 2.5, Phase::Mature);
        let next = engine.apply_correct(&card).unwrap();

        assert_eq!(next.ease, 2.5);
        assert_eq!(next.interval, 3600);
        assert_eq!(next.due, fixed_now() + Duration::minutes(3600));

        let records = engine.history().list_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, Outcome::Correct);
        assert_eq!(records[0].date, today());
    }

    #[test]
    fn test_mature_correct_on_target_gets_bonus() {
        let (engine, _temp) = create_test_engine();
        for _ in 0..9 {
            engine.history().record_correct(today() - Duration::days(3)).unwrap();
        }
        engine.history().record_again(today() - Duration::days(2)).unwrap();
        // 90% retention against the default 90% target
        let card = store_card(&engine, "A", "q", 1440, 2.5, Phase::Mature);
        let next = engine.apply_correct(&card).unwrap();

        assert!((next.ease - 2.6).abs() < 1e-9);
        assert_eq!(next.interval, (1440.0 * next.ease).floor() as u32);
    }

    #[test]
    fn test_mature_correct_below_target_no_bonus() {
        let (engine, _temp) = create_test_engine();
        engine.history().record_correct(today()).unwrap();
        engine.history().record_again(today()).unwrap();
        let card = store_card(&engine, "A", "q", 2000, 2.0, Phase::Mature);
        let next = engine.apply_correct(&card).unwrap();

        assert_eq!(next.ease, 2.0);
        assert_eq!(next.interval, 4000);
    }

    #[test]
    fn test_old_history_does_not_count() {
        let (engine, _temp) = create_test_engine();
        engine.history().record_correct(today() - Duration::days(45)).unwrap();
        let card = store_card(&engine, "A", "q", 1440, 2.5, Phase::Mature);

        assert_eq!(engine.apply_correct(&card).unwrap().ease, 2.5);
    }

    #[test]
    fn test_scenario_mature_again() {
        let (engine, _temp) = create_test_engine();
        let card = store_card(&engine, "A", "q", 2000, 2.5, Phase::Mature);
        let next = engine.apply_again(&card).unwrap();

        assert!((next.ease - 2.2).abs() < 1e-9);
        assert_eq!(next.interval, 0);
        assert_eq!(next.due, fixed_now() + Duration::minutes(3));
        assert_eq!(next.phase, Phase::RelapsedFromMature);

        let records = engine.history().list_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, Outcome::Again);
    }

    #[test]
    fn test_failed_log_write_keeps_card_unchanged() {
        let (engine, temp) = create_test_engine();
        // A directory where the log file should be makes every append fail
        fs::create_dir(temp.path().join("reviews.csv")).unwrap();

        let card = store_card(&engine, "A", "mature", 1440, 2.5, Phase::Mature);
        assert!(engine.apply_correct(&card).is_err());
        assert_eq!(engine.cards().find_by_question("mature").unwrap().unwrap(), card);

        let card = store_card(&engine, "A", "lapse", 2000, 2.5, Phase::Mature);
        assert!(engine.apply_again(&card).is_err());
        assert_eq!(engine.cards().find_by_question("lapse").unwrap().unwrap(), card);

        // Learning steps never touch the log
        let learning = store_card(&engine, "A", "new", 0, 2.5, Phase::Learning);
        assert_eq!(engine.apply_correct(&learning).unwrap().interval, 10);
    }

    #[test]
    fn test_again_during_learning_is_not_logged() {
        let (engine, _temp) = create_test_engine();
        let card = store_card(&engine, "A", "q", 10, 1.35, Phase::Young);
        let next = engine.apply_again(&card).unwrap();

        assert_eq!(next.ease, 1.35);
        assert!(engine.history().list_records().unwrap().is_empty());
    }

    #[test]
    fn test_again_clamps_ease() {
        let (engine, _temp) = create_test_engine();
        let card = store_card(&engine, "A", "q", 1440, 1.4, Phase::Mature);
        assert_eq!(engine.apply_again(&card).unwrap().ease, MIN_EASE);
    }

    #[test]
    fn test_correct_then_again_round_trip() {
        let (engine, _temp) = create_test_engine();
        let card = engine.add_card("A", "q", "a").unwrap();
        let after_correct = engine.apply_correct(&card).unwrap();
        let after_again = engine.apply_again(&after_correct).unwrap();

        assert_eq!(after_again.interval, 0);
        assert_eq!(after_again.due, fixed_now() + Duration::minutes(3));
        assert_eq!(after_again.phase, Phase::RelapsedFromYoung);
    }

    #[test]
    fn test_outcome_uses_stored_card() {
        let (engine, _temp) = create_test_engine();
        let stale = engine.add_card("A", "q", "a").unwrap();
        engine.apply_correct(&stale).unwrap();

        // Stale copy still says interval 0, the store says 10
        let next = engine.apply_correct(&stale).unwrap();
        assert_eq!(next.interval, 1440);
    }

    #[test]
    fn test_outcome_on_missing_card() {
        let (engine, _temp) = create_test_engine();
        let ghost = Card::new("A".into(), "ghost".into(), "a".into(), 2.5, fixed_now());

        assert!(matches!(engine.apply_correct(&ghost), Err(FlashcardError::CardNotFound(_))));
        assert!(matches!(engine.answer("ghost", Outcome::Again), Err(FlashcardError::CardNotFound(_))));
    }

    #[test]
    fn test_answer_dispatches() {
        let (engine, _temp) = create_test_engine();
        engine.add_card("A", "q", "a").unwrap();

        assert_eq!(engine.answer("q", Outcome::Correct).unwrap().interval, 10);
        assert_eq!(engine.answer("q", Outcome::Again).unwrap().interval, 0);
    }

    #[test]
    fn test_scenario_preferred_deck_without_due_cards() {
        let (engine, _temp) = create_test_engine();
        let mut a = store_card(&engine, "A", "qa", 0, 2.5, Phase::Learning);
        a.due = fixed_now() - Duration::days(1);
        engine.cards().upsert(&a).unwrap();
        let mut b = store_card(&engine, "B", "qb", 0, 2.5, Phase::Learning);
        b.due = fixed_now() + Duration::days(1);
        engine.cards().upsert(&b).unwrap();

        let next = engine.next_card(Some("B")).unwrap().unwrap();
        assert_eq!(next.deck, "A");
    }

    #[test]
    fn test_next_card_is_idempotent() {
        let (engine, _temp) = create_test_engine();
        engine.add_card("A", "first", "a").unwrap();
        engine.add_card("A", "second", "b").unwrap();

        let one = engine.next_card(None).unwrap();
        let two = engine.next_card(None).unwrap();
        assert_eq!(one, two);
        assert_eq!(one.unwrap().question, "first");
    }

    #[test]
    fn test_next_card_none_when_done() {
        let (engine, _temp) = create_test_engine();
        let card = store_card(&engine, "A", "q", 10, 2.5, Phase::Young);
        engine.apply_correct(&card).unwrap();

        assert!(engine.next_card(None).unwrap().is_none());
        assert_eq!(engine.due_count(None).unwrap(), 0);
    }

    #[test]
    fn test_card_answered_today_stays_due_today() {
        let (engine, _temp) = create_test_engine();
        let card = engine.add_card("A", "q", "a").unwrap();
        engine.apply_correct(&card).unwrap();

        // Due again in ten minutes, still today
        assert_eq!(engine.due_count(Some("A")).unwrap(), 1);
        assert_eq!(engine.due_count(Some("B")).unwrap(), 0);
    }

    #[test]
    fn test_edit_card() {
        let (engine, _temp) = create_test_engine();
        engine.add_card("A", "q1", "a1").unwrap();
        engine.add_card("A", "q2", "a2").unwrap();

        let edited = engine.edit_card("q1", "q1 edited", "a1 edited").unwrap();
        assert_eq!(edited.answer, "a1 edited");
        assert!(engine.cards().find_by_question("q1").unwrap().is_none());
        assert!(engine.cards().find_by_question("q1 edited").unwrap().is_some());

        assert!(matches!(
            engine.edit_card("q1 edited", "q2", "x"),
            Err(FlashcardError::DuplicateQuestion(_))
        ));
        assert!(matches!(engine.edit_card("q2", "", "x"), Err(FlashcardError::EmptyQuestion)));
        // Same question, new answer
        assert_eq!(engine.edit_card("q2", "q2", "new").unwrap().answer, "new");
    }

    #[test]
    fn test_move_and_delete_card() {
        let (engine, _temp) = create_test_engine();
        engine.add_card("A", "q", "a").unwrap();

        assert_eq!(engine.move_card("q", "B").unwrap().deck, "B");
        assert_eq!(engine.cards().find_by_question("q").unwrap().unwrap().deck, "B");

        engine.delete_card("q").unwrap();
        assert!(engine.cards().list_all().unwrap().is_empty());
        assert!(matches!(engine.delete_card("q"), Err(FlashcardError::CardNotFound(_))));
    }

    #[test]
    fn test_search() {
        let (engine, _temp) = create_test_engine();
        engine.add_card("A", "Capital of France", "Paris").unwrap();
        engine.add_card("A", "Capital of Spain", "Madrid").unwrap();

        assert_eq!(engine.search("paris").unwrap().len(), 1);
        assert_eq!(engine.search("CAPITAL").unwrap().len(), 2);
        assert_eq!(engine.search("").unwrap().len(), 2);
        assert!(engine.search("berlin").unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let (engine, _temp) = create_test_engine();
        let empty = engine.stats().unwrap();
        assert_eq!(empty.total_cards, 0);
        assert_eq!(empty.retention_rate, None);

        engine.add_card("A", "q1", "a").unwrap();
        let mut later = store_card(&engine, "A", "q2", 1440, 2.5, Phase::Mature);
        later.due = fixed_now() + Duration::days(2);
        engine.cards().upsert(&later).unwrap();
        engine.history().record_correct(today() - Duration::days(60)).unwrap();
        engine.history().record_again(today()).unwrap();

        let stats = engine.stats().unwrap();
        assert_eq!(stats.total_cards, 2);
        assert_eq!(stats.due_cards, 1);
        assert_eq!(stats.retention_rate, Some(50.0));
        assert_eq!(stats.retention_rate_30_days, Some(0.0));
    }
}
