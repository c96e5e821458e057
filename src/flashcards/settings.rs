//! Scheduling settings, stored as TOML

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::storage::{write_atomic, FlashcardError, Result};
use super::store::SettingsStore;

/// Allowed target retention percentages
pub const TARGET_RETENTION_RANGE: RangeInclusive<u8> = 50..=99;

fn default_target_retention_rate() -> u8 {
    90
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Ease only grows on mature reviews while the 30-day retention rate is
    /// at or above this percentage
    #[serde(default = "default_target_retention_rate")]
    pub target_retention_rate: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_retention_rate: default_target_retention_rate(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if !TARGET_RETENTION_RANGE.contains(&self.target_retention_rate) {
            return Err(FlashcardError::InvalidTargetRetention(self.target_retention_rate));
        }
        Ok(())
    }
}

/// Settings backed by a TOML file. A missing file means default settings.
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Settings at `settings.toml` inside a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("settings.toml"))
    }

    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(settings)?;
        write_atomic(&self.path, content.as_bytes())
    }

    pub fn set_target_retention_rate(&self, rate: u8) -> Result<Settings> {
        let mut settings = self.load()?;
        settings.target_retention_rate = rate;
        self.save(&settings)?;
        log::info!("Target retention rate set to {}%", rate);
        Ok(settings)
    }
}

impl SettingsStore for FileSettings {
    fn target_retention_rate(&self) -> Result<u8> {
        Ok(self.load()?.target_retention_rate)
    }
}
