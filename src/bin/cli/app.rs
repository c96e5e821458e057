use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use memorygain_lib::flashcards::storage::default_data_dir;
use memorygain_lib::flashcards::{
    Card, CardStore, CsvCardStore, CsvReviewHistory, DeckStorage, FileSettings, SchedulingEngine,
};

pub type Engine = SchedulingEngine<CsvCardStore, CsvReviewHistory, FileSettings>;

/// Shared application state for CLI commands
pub struct App {
    pub data_dir: PathBuf,
    pub engine: Engine,
    pub decks: DeckStorage,
}

impl App {
    /// Open the data directory, creating it and the card file on first use
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir().context("Failed to get data directory")?,
        };

        let cards = CsvCardStore::in_dir(&data_dir);
        cards.init()
            .with_context(|| format!("Failed to initialize card store in {}", data_dir.display()))?;

        let engine = SchedulingEngine::new(
            cards,
            CsvReviewHistory::in_dir(&data_dir),
            FileSettings::in_dir(&data_dir),
        );
        let decks = DeckStorage::in_dir(&data_dir);

        log::debug!("Using data directory {}", data_dir.display());

        Ok(Self { data_dir, engine, decks })
    }

    pub fn settings(&self) -> &FileSettings {
        self.engine.settings()
    }

    /// Fail unless the deck exists, listing the available ones
    pub fn require_deck(&self, name: &str) -> Result<()> {
        let decks = self.decks.list_decks().context("Failed to list decks")?;
        if decks.iter().any(|d| d == name) {
            return Ok(());
        }

        if decks.is_empty() {
            bail!("No deck named '{}'. Create one first with `memorygain deck add <name>`.", name);
        }
        bail!("No deck named '{}'. Available decks:\n{}", name,
            decks.iter().map(|d| format!("  - {}", d)).collect::<Vec<_>>().join("\n"))
    }

    /// Find a card by its exact question
    pub fn find_card(&self, question: &str) -> Result<Card> {
        self.engine.cards().find_by_question(question)
            .context("Failed to read cards")?
            .with_context(|| format!("No card with question '{}'", question))
    }
}
