//! Spaced repetition scheduling
//!
//! Cards move through two fixed learning steps before the interval starts
//! growing by the card's ease:
//! - 0 min: new or just failed, a correct answer schedules it 10 minutes out
//! - 10 min: a correct answer graduates it to one day (1440 minutes)
//! - 1440+ min: mature review, the interval is multiplied by the ease
//!
//! An "again" answer always drops the card back to interval 0, due in three
//! minutes. Failing a mature card also lowers its ease.
//!
//! Everything here is pure: callers supply the clock and the retention
//! decision, and persist the returned card themselves.

use chrono::{NaiveDate, NaiveDateTime};

use super::models::{clamp_ease, Card, MATURE_INTERVAL};

/// Interval after the first correct answer (minutes)
pub const FIRST_STEP: u32 = 10;

/// Delay before a failed card is shown again (minutes)
pub const RELEARN_DELAY: u32 = 3;

/// Ease added on a mature review while retention is on target
pub const EASE_BONUS: f64 = 0.1;

/// Ease removed when a graduated card is failed
pub const EASE_PENALTY: f64 = 0.3;

/// All due cards, optionally limited to one deck, most overdue first
pub fn due_cards<'a>(cards: &'a [Card], deck: Option<&str>, today: NaiveDate) -> Vec<&'a Card> {
    let mut due: Vec<&Card> = cards
        .iter()
        .filter(|c| c.is_due(today))
        .filter(|c| deck.map_or(true, |d| c.deck == d))
        .collect();

    // Stable, so cards sharing a due timestamp keep their stored order
    due.sort_by(|a, b| a.due.cmp(&b.due));
    due
}

/// Pick the card to study next.
///
/// The most overdue card of `preferred_deck` wins when that deck has anything
/// due; otherwise the most overdue card overall, so nothing is ever skipped.
pub fn select_next_card<'a>(
    cards: &'a [Card],
    preferred_deck: Option<&str>,
    today: NaiveDate,
) -> Option<&'a Card> {
    let due = due_cards(cards, None, today);
    let first = *due.first()?;

    if let Some(deck) = preferred_deck {
        if let Some(card) = due.iter().find(|c| c.deck == deck) {
            return Some(*card);
        }
    }

    Some(first)
}

/// Compute the state of a card after a correct answer.
///
/// `ease_bonus` is only consulted for mature reviews; the caller decides it
/// from the recent retention rate.
pub fn apply_correct(card: &Card, ease_bonus: bool, now: NaiveDateTime) -> Card {
    let mut next = card.clone();

    match card.interval {
        0 => next.reschedule(FIRST_STEP, now),
        FIRST_STEP => next.reschedule(MATURE_INTERVAL, now),
        interval => {
            if ease_bonus {
                next.ease = clamp_ease(card.ease + EASE_BONUS);
            } else {
                next.ease = clamp_ease(card.ease);
            }
            let grown = (interval as f64 * next.ease).floor().min(u32::MAX as f64) as u32;
            next.reschedule(grown.max(interval), now);
        }
    }

    next.phase = card.phase.after_correct();
    next
}

/// Compute the state of a card after an "again" answer
pub fn apply_again(card: &Card, now: NaiveDateTime) -> Card {
    let mut next = card.clone();

    if card.interval != 0 && card.interval != FIRST_STEP {
        next.ease = clamp_ease(card.ease - EASE_PENALTY);
    }

    next.reschedule(RELEARN_DELAY, now);
    next.interval = 0;
    next.phase = card.phase.after_again();
    next
}

/// Format an interval in minutes to a short human-readable string
pub fn format_interval(minutes: u32) -> String {
    let days = minutes / MATURE_INTERVAL;

    if minutes == 0 {
        "now".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if minutes < MATURE_INTERVAL {
        format!("{}h", minutes / 60)
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
