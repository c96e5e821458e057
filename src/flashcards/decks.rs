//! Deck list storage
//!
//! A deck is only a name. Cards point at their deck by name, so deleting or
//! renaming a deck also rewrites the cards that belong to it.

use std::fs;
use std::path::{Path, PathBuf};

use super::storage::{write_atomic, FlashcardError, Result};
use super::store::CardStore;

/// Storage manager for the deck list
pub struct DeckStorage {
    path: PathBuf,
}

impl DeckStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Deck list at `decks.json` inside a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("decks.json"))
    }

    /// List all decks, sorted case-insensitively
    pub fn list_decks(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let decks: Vec<String> = serde_json::from_str(&content)?;
        Ok(decks)
    }

    pub fn deck_exists(&self, name: &str) -> Result<bool> {
        Ok(self.list_decks()?.iter().any(|d| d == name))
    }

    fn save_decks(&self, mut decks: Vec<String>) -> Result<()> {
        decks.sort_by_key(|d| d.to_lowercase());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_atomic(&self.path, serde_json::to_string_pretty(&decks)?.as_bytes())
    }

    /// Create a new deck
    pub fn add_deck(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FlashcardError::EmptyDeckName);
        }

        let mut decks = self.list_decks()?;
        if decks.iter().any(|d| d == name) {
            return Err(FlashcardError::DuplicateDeck(name.to_string()));
        }

        decks.push(name.to_string());
        self.save_decks(decks)?;
        log::info!("Created deck {:?}", name);
        Ok(())
    }

    /// Delete a deck and all its cards
    pub fn delete_deck(&self, name: &str, cards: &impl CardStore) -> Result<usize> {
        let mut decks = self.list_decks()?;
        if !decks.iter().any(|d| d == name) {
            return Err(FlashcardError::DeckNotFound(name.to_string()));
        }

        // Cards go first so a failure never leaves cards without a deck
        let all = cards.list_all()?;
        let total = all.len();
        let kept: Vec<_> = all.into_iter().filter(|c| c.deck != name).collect();
        let removed = total - kept.len();
        cards.replace_all(&kept)?;

        decks.retain(|d| d != name);
        self.save_decks(decks)?;

        log::info!("Deleted deck {:?} with {} cards", name, removed);
        Ok(removed)
    }

    /// Rename a deck and move its cards along with it
    pub fn rename_deck(&self, old_name: &str, new_name: &str, cards: &impl CardStore) -> Result<usize> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(FlashcardError::EmptyDeckName);
        }

        let mut decks = self.list_decks()?;
        if decks.iter().any(|d| d == new_name) {
            return Err(FlashcardError::DuplicateDeck(new_name.to_string()));
        }
        let pos = decks
            .iter()
            .position(|d| d == old_name)
            .ok_or_else(|| FlashcardError::DeckNotFound(old_name.to_string()))?;

        let mut all = cards.list_all()?;
        let mut moved = 0;
        for card in all.iter_mut().filter(|c| c.deck == old_name) {
            card.deck = new_name.to_string();
            moved += 1;
        }
        cards.replace_all(&all)?;

        decks[pos] = new_name.to_string();
        self.save_decks(decks)?;

        log::info!("Renamed deck {:?} to {:?} ({} cards)", old_name, new_name, moved);
        Ok(moved)
    }
}
