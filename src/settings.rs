//! Match settings
//!
//! Loaded from JSON. Missing fields fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_PLAYERS;
use crate::error::SettingsError;

/// Per-match configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Number of human players (1..=4)
    pub player_count: u8,
    /// Match length in whole seconds
    pub total_seconds: u16,
    /// Seed for every random draw in the match
    pub seed: u64,
    /// Optional cap on live actors; `None` is unbounded
    pub actor_limit: Option<usize>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            player_count: 2,
            total_seconds: 120,
            seed: 0x5eed_a7e4,
            actor_limit: None,
        }
    }
}

impl MatchSettings {
    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded match settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.player_count == 0 || self.player_count > MAX_PLAYERS {
            return Err(SettingsError::PlayerCount(self.player_count));
        }
        if self.total_seconds == 0 {
            return Err(SettingsError::ZeroLength);
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_player_count(mut self, player_count: u8) -> Self {
        self.player_count = player_count;
        self
    }

    pub fn with_actor_limit(mut self, limit: usize) -> Self {
        self.actor_limit = Some(limit);
        self
    }
}
