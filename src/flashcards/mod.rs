//! Flashcards and spaced repetition scheduling
//!
//! This module provides:
//! - Card, phase and review outcome models
//! - The scheduling rules (due selection, correct/again transitions)
//! - Initial ease estimation by linear regression over the collection
//! - Store traits and their file-backed implementations
//! - The scheduling engine tying stores and rules together

pub mod algorithm;
pub mod decks;
pub mod history;
pub mod models;
pub mod regression;
pub mod scheduler;
pub mod settings;
pub mod storage;
pub mod store;

pub use decks::DeckStorage;
pub use history::CsvReviewHistory;
pub use models::*;
pub use scheduler::SchedulingEngine;
pub use settings::{FileSettings, Settings};
pub use storage::{CsvCardStore, FlashcardError};
pub use store::{CardStore, ReviewHistoryStore, SettingsStore};
