//! Primary store with a secondary to fall back on

use super::{ScoreStore, StoreError};
use crate::highscores::ScoreEntry;

pub struct FallbackStore {
    primary: Box<dyn ScoreStore>,
    secondary: Box<dyn ScoreStore>,
}

impl FallbackStore {
    pub fn new(primary: Box<dyn ScoreStore>, secondary: Box<dyn ScoreStore>) -> Self {
        Self { primary, secondary }
    }
}

impl ScoreStore for FallbackStore {
    fn name(&self) -> String {
        format!("{} (fallback {})", self.primary.name(), self.secondary.name())
    }

    fn load(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        self.primary.load().or_else(|e| {
            log::warn!(
                "Loading from {} failed ({}), using {}",
                self.primary.name(),
                e,
                self.secondary.name()
            );
            self.secondary.load()
        })
    }

    fn save(&self, entries: &[ScoreEntry]) -> Result<(), StoreError> {
        self.primary.save(entries).or_else(|e| {
            log::warn!(
                "Saving to {} failed ({}), using {}",
                self.primary.name(),
                e,
                self.secondary.name()
            );
            self.secondary.save(entries)
        })
    }
}
