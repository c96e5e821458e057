//! File storage for flashcards
//!
//! Directory structure:
//! ```text
//! {data-dir}/
//! ├── cards.csv        # Every card, one row each
//! ├── reviews.csv      # Append-only log of mature review outcomes
//! ├── decks.json       # Array of deck names
//! └── settings.toml    # Scheduling settings
//! ```
//!
//! Files that are rewritten as a whole go through [`write_atomic`], so an
//! interrupted write leaves the previous contents in place.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::models::Card;
use super::store::CardStore;

#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Settings write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("A card with this question already exists: {0}")]
    DuplicateQuestion(String),

    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Deck already exists: {0}")]
    DuplicateDeck(String),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Deck name must not be empty")]
    EmptyDeckName,

    #[error("Target retention rate must be between 50 and 99, got {0}")]
    InvalidTargetRetention(u8),

    #[error("Could not determine data directory")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, FlashcardError>;

/// Column order of the cards file
pub const CARD_FIELDS: [&str; 7] = ["Deck", "Question", "Answer", "Ease", "Due", "Interval", "Phase"];

/// Default location of the data directory
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|p| p.join("memorygain"))
        .ok_or(FlashcardError::DataDirNotFound)
}

/// Write to a sibling `.tmp` file, then rename it over `path`
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Card store backed by a single CSV file
pub struct CsvCardStore {
    path: PathBuf,
}

impl CsvCardStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at `cards.csv` inside a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("cards.csv"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with just a header row if it doesn't exist
    pub fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !self.path.exists() {
            self.write_cards(&[])?;
        }
        Ok(())
    }

    fn write_cards(&self, cards: &[Card]) -> Result<()> {
        // Header is written by hand so an empty set still gets one
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(CARD_FIELDS)?;
        for card in cards {
            writer.serialize(card)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| FlashcardError::Io(e.into_error()))?;

        write_atomic(&self.path, &bytes)
    }
}

impl CardStore for CsvCardStore {
    fn list_all(&self) -> Result<Vec<Card>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut cards = Vec::new();
        for record in reader.deserialize() {
            let card: Card = record?;
            cards.push(card);
        }
        Ok(cards)
    }

    fn upsert(&self, card: &Card) -> Result<()> {
        let mut cards = self.list_all()?;
        match cards.iter().position(|c| c.question == card.question) {
            Some(pos) => cards[pos] = card.clone(),
            None => cards.push(card.clone()),
        }
        self.write_cards(&cards)
    }

    fn delete(&self, card: &Card) -> Result<()> {
        let mut cards = self.list_all()?;
        cards.retain(|c| c.question != card.question);
        self.write_cards(&cards)
    }

    fn replace_all(&self, cards: &[Card]) -> Result<()> {
        self.write_cards(cards)
    }
}
