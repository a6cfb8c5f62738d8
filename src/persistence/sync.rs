//! Background saves and ledger sync

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::{ScoreStore, StoreError};
use crate::highscores::{ScoreEntry, ScoreLedger};

/// Load a ranked ledger, treating an unreadable store as empty
pub fn load_ledger(store: &dyn ScoreStore) -> ScoreLedger {
    match store.load() {
        Ok(entries) => ScoreLedger::from_entries(entries),
        Err(e) => {
            log::warn!("Could not load scores from {}: {}", store.name(), e);
            ScoreLedger::new()
        }
    }
}

/// Save `entries` on a worker thread; join the handle to learn the outcome
pub fn spawn_save(
    store: Arc<dyn ScoreStore>,
    entries: Vec<ScoreEntry>,
) -> Result<JoinHandle<Result<(), StoreError>>, StoreError> {
    let handle = thread::Builder::new()
        .name("score-save".to_string())
        .spawn(move || {
            let result = store.save(&entries);
            match &result {
                Ok(()) => log::info!("Saved {} scores to {}", entries.len(), store.name()),
                Err(e) => log::error!("Saving scores to {} failed: {}", store.name(), e),
            }
            result
        })?;
    Ok(handle)
}

/// Wait for background saves; the first failure is returned after all finish
pub fn join_saves(handles: Vec<JoinHandle<Result<(), StoreError>>>) -> Result<(), StoreError> {
    let mut first_err = None;
    for handle in handles {
        let err = match handle.join() {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e,
            Err(_) => StoreError::Unavailable("score save thread panicked".to_string()),
        };
        log::error!("Score save failed: {}", err);
        first_err.get_or_insert(err);
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Merge the local ledger into the remote one and write the result to both
pub fn sync_board(local: &dyn ScoreStore, remote: &dyn ScoreStore) -> Result<ScoreLedger, StoreError> {
    let mut ledger = ScoreLedger::from_entries(remote.load()?);
    let before = ledger.len();
    ledger.merge(local.load()?);
    log::info!(
        "Synced {} with {}: {} -> {} entries",
        local.name(),
        remote.name(),
        before,
        ledger.len()
    );
    remote.save(ledger.entries())?;
    local.save(ledger.entries())?;
    Ok(ledger)
}
