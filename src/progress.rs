//! Saved campaign progress: the highest unlocked level and the best star
//! rating earned on each level.
//!
//! Stored as JSON, e.g. `{"unlockedLevel": 3, "stars": {"1": 4, "2": 2}}`.
//! A missing or unreadable file is never fatal; play starts over from the
//! defaults.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default progress file name, relative to the working directory.
pub const PROGRESS_FILE: &str = "progress.json";

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("cannot access progress file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot encode progress")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Progress {
    /// Levels with an id up to and including this one are playable.
    pub unlocked_level: u32,
    /// Best rating per level id; absent means never completed.
    pub stars: BTreeMap<u32, u8>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            unlocked_level: 1,
            stars: BTreeMap::new(),
        }
    }
}

impl Progress {
    /// Records a win. Unlocks the next level when this one was the frontier
    /// and keeps the better of the old and new ratings.
    pub fn complete_level(&mut self, level_id: u32, stars: u8) {
        if level_id >= self.unlocked_level {
            self.unlocked_level = level_id + 1;
        }
        let best = self.stars.entry(level_id).or_insert(0);
        if stars > *best {
            *best = stars;
        }
    }

    /// Best rating for a level, 0 if never completed.
    pub fn stars(&self, level_id: u32) -> u8 {
        self.stars.get(&level_id).copied().unwrap_or(0)
    }

    pub fn is_unlocked(&self, level_id: u32) -> bool {
        level_id <= self.unlocked_level
    }

    /// Reads progress from `path`, falling back to defaults when the file is
    /// missing or corrupt.
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no progress at {}, starting fresh", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("cannot read progress from {}: {e}", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&json) {
            Ok(mut progress) => {
                progress.unlocked_level = progress.unlocked_level.max(1);
                progress
            }
            Err(e) => {
                warn!("ignoring corrupt progress in {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Writes progress to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ProgressError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ProgressError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("saved progress to {}", path.display());
        Ok(())
    }

    /// Deletes saved progress. A missing file counts as already cleared.
    pub fn clear(path: &Path) -> Result<(), ProgressError> {
        match fs::remove_file(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(ProgressError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
            _ => Ok(()),
        }
    }
}
