//! Game settings and preferences
//!
//! Persisted as `settings.json` in the data directory, separately from the
//! score files. Missing fields take their defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::RetryPolicy;
use crate::persistence::file::write_atomic;
use crate::tuning::Difficulty;

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Tile size bounds; larger tiles would not fit a row of the play area
pub const MIN_SQUARE_SIZE: u32 = 10;
pub const MAX_SQUARE_SIZE: u32 = 80;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Gameplay ===
    pub difficulty: Difficulty,
    /// Name used when none is given on the command line
    pub player_name: String,
    /// Show the warm-up challenges before a climb
    pub tutorial: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Display ===
    /// Side of a falling tile in play-area units
    pub square_size: u32,

    // === Score API ===
    /// Base URL of the score API; None keeps scores local only
    pub api_url: Option<String>,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            player_name: String::new(),
            tutorial: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            square_size: 30,

            api_url: Some(crate::persistence::DEFAULT_API_URL.to_string()),
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when missing or unreadable
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not read {}: {}", path.display(), e);
                }
                log::info!("Using default settings");
                return Self::default();
            }
        };
        match serde_json::from_str::<Settings>(&text) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.clamped()
            }
            Err(e) => {
                log::warn!("Ignoring corrupt settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write settings atomically
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let data = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &data)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Keep volumes and tile size in range
    fn clamped(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.square_size = self.square_size.clamp(MIN_SQUARE_SIZE, MAX_SQUARE_SIZE);
        self
    }

    /// Tile side length handed to the climb session
    pub fn tile_size(&self) -> f32 {
        self.square_size as f32
    }

    /// Retry policy for the remote score store
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
