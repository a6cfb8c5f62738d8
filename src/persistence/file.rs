//! Local JSON score file

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

use super::{Board, ScoreStore, StoreError};
use crate::highscores::ScoreEntry;

/// On-disk layouts we accept
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredScores {
    Entries(Vec<ScoreEntry>),
    /// Oldest format: a bare list of scores
    Bare(Vec<u64>),
}

impl StoredScores {
    fn into_entries(self) -> Vec<ScoreEntry> {
        match self {
            StoredScores::Entries(entries) => entries,
            StoredScores::Bare(scores) => scores
                .into_iter()
                .filter(|s| *s > 0)
                .map(|s| ScoreEntry::new("", s))
                .collect(),
        }
    }
}

/// Sibling temp file unique to this process and call
fn temp_path(path: &Path) -> PathBuf {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{}-{}.tmp", std::process::id(), n));
    path.with_file_name(name)
}

/// Write `data` to a temp file next to `path`, then rename it into place
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, data).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `board` inside `dir`
    pub fn for_board(dir: &Path, board: Board) -> Self {
        Self::new(dir.join(board.file_name()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for FileStore {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<StoredScores>(&text) {
            Ok(stored) => Ok(stored.into_entries()),
            Err(e) => {
                log::warn!("Ignoring corrupt score file {}: {}", self.path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, entries: &[ScoreEntry]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(entries)?;
        write_atomic(&self.path, &data)?;
        log::debug!("Saved {} scores to {}", entries.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::testing::temp_dir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = temp_dir("missing");
        let store = FileStore::for_board(&dir, Board::Cli);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = temp_dir("save");
        let store = FileStore::for_board(&dir.join("nested"), Board::Game);
        let mut entry = ScoreEntry::new("ada", 420);
        entry.difficulty = Some("hard".to_string());
        store.save(&[entry.clone(), ScoreEntry::new("bob", 100)]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], entry);
        let files = fs::read_dir(dir.join("nested")).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_overlapping_saves_use_distinct_temp_files() {
        let dir = temp_dir("overlap");
        let path = dir.join(Board::Game.file_name());
        assert_ne!(temp_path(&path), temp_path(&path));

        let store = std::sync::Arc::new(FileStore::new(path.clone()));
        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let entries: Vec<ScoreEntry> =
                        (0..50).map(|j| ScoreEntry::new("racer", i * 100 + j + 1)).collect();
                    store.save(&entries)
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        // Whichever save landed last, the file is whole
        assert_eq!(store.load().unwrap().len(), 50);
        let names: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("scores_game.json")]);
    }

    #[test]
    fn test_save_fails_when_parent_is_a_file() {
        let dir = temp_dir("blocked");
        fs::write(dir.join("blocker"), "").unwrap();
        let store = FileStore::new(dir.join("blocker").join("scores_game.json"));
        assert!(matches!(store.save(&[ScoreEntry::new("x", 1)]), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = temp_dir("corrupt");
        let store = FileStore::for_board(&dir, Board::Cli);
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_bare_score_list_accepted() {
        let dir = temp_dir("bare");
        let store = FileStore::for_board(&dir, Board::Game);
        fs::write(store.path(), "[0, 300, 0, 120]").unwrap();
        let loaded = store.load().unwrap();
        let scores: Vec<u64> = loaded.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 120]);
        assert_eq!(loaded[0].name, "Anonymous");
    }

    #[test]
    fn test_entry_without_optional_fields() {
        let dir = temp_dir("partial");
        let store = FileStore::for_board(&dir, Board::Cli);
        fs::write(store.path(), r#"[{"name": "eve", "score": 77}]"#).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].letters, 0);
        assert_eq!(loaded[0].difficulty, None);
    }
}
