//! Data directory layout

use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::persistence::Board;
use crate::settings::SETTINGS_FILE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub dir: PathBuf,
}

impl DataPaths {
    /// Use `override_dir` when given, else the per-user data directory
    pub fn resolve(override_dir: Option<&Path>) -> io::Result<Self> {
        let dir = match override_dir {
            Some(dir) => dir.to_path_buf(),
            None => ProjectDirs::from("fr", "lzonca", "keyscale")
                .map(|proj| proj.data_local_dir().to_path_buf())
                .ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "could not resolve project directories")
                })?,
        };
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn settings(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn scores(&self, board: Board) -> PathBuf {
        self.dir.join(board.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::testing::temp_dir;

    #[test]
    fn test_override_is_created() {
        let dir = temp_dir("paths").join("data");
        let paths = DataPaths::resolve(Some(&dir)).unwrap();
        assert!(dir.is_dir());
        assert_eq!(paths.settings(), dir.join("settings.json"));
        assert_eq!(paths.scores(Board::Cli), dir.join("scores_cli.json"));
    }
}
