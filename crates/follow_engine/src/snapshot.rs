use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use follow_core::Snapshot;
use thiserror::Error;

use crate::filename::safe_filename;
use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("cannot write snapshot: {0}")]
    Persist(#[from] PersistError),
}

/// The single most recent username snapshot of one account, stored as a sorted
/// JSON array in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    dir: PathBuf,
    filename: String,
}

impl SnapshotStore {
    pub fn for_account(dir: &Path, username: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            filename: format!("_last_followings_{}.json", safe_filename(username)),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    /// `None` when no usable snapshot exists. A corrupt file counts as absent.
    pub fn load(&self) -> Option<Snapshot> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                engine_warn!("Failed to read snapshot {:?}: {}", path, err);
                return None;
            }
        };
        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(usernames) => {
                let snapshot: Snapshot = usernames.into_iter().collect();
                engine_info!("Loaded snapshot of {} usernames from {:?}", snapshot.len(), path);
                Some(snapshot)
            }
            Err(err) => {
                engine_warn!("Ignoring unparseable snapshot {:?}: {}", path, err);
                None
            }
        }
    }

    /// Replaces the stored snapshot.
    pub fn save(&self, snapshot: &Snapshot) -> Result<PathBuf, SnapshotError> {
        let content = serde_json::to_string_pretty(&snapshot.to_sorted_vec())?;
        let writer = AtomicFileWriter::new(self.dir.clone());
        Ok(writer.write(&self.filename, content)?)
    }
}
