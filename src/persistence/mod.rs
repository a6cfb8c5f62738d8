//! Score persistence
//!
//! Every ledger goes through a [`ScoreStore`]. The local store writes JSON
//! files in the data directory; the remote store talks to the score API;
//! [`FallbackStore`] chains the two so a run is never lost to a dead network.

mod fallback;
pub(crate) mod file;
mod remote;
mod sync;

pub use fallback::FallbackStore;
pub use file::FileStore;
pub use remote::{RemoteStore, RetryPolicy};
pub use sync::{join_saves, load_ledger, spawn_save, sync_board};

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::highscores::ScoreEntry;

/// Default score API base URL
pub const DEFAULT_API_URL: &str = "https://keyscale.lzonca.fr/api";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed score data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("score API answered with status {0}")]
    Status(u16),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Which leaderboard a store holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Board {
    /// Terminal reflex drill
    Cli,
    /// Climb game
    Game,
}

impl Board {
    pub const ALL: [Board; 2] = [Board::Cli, Board::Game];

    pub fn as_str(&self) -> &'static str {
        match self {
            Board::Cli => "cli",
            Board::Game => "game",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cli" | "drill" => Some(Board::Cli),
            "game" | "climb" => Some(Board::Game),
            _ => None,
        }
    }

    /// File name of the local copy
    pub fn file_name(&self) -> String {
        format!("scores_{}.json", self.as_str())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load/save contract for one leaderboard
pub trait ScoreStore: Send + Sync {
    /// Short label for log lines
    fn name(&self) -> String;

    fn load(&self) -> Result<Vec<ScoreEntry>, StoreError>;

    fn save(&self, entries: &[ScoreEntry]) -> Result<(), StoreError>;
}

impl<T: ScoreStore + ?Sized> ScoreStore for Arc<T> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn load(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        (**self).load()
    }

    fn save(&self, entries: &[ScoreEntry]) -> Result<(), StoreError> {
        (**self).save(entries)
    }
}
