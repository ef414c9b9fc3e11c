//! Enumerating and loading recorded trajectory files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::ReplayError;
use super::record::TrajectoryRecord;

/// The file extension trajectory records are stored under.
const RECORD_EXTENSION: &str = "json";

/// A directory of recorded trajectory files.
///
/// Enumeration is sorted by file name so the replay order -- and therefore
/// ring-eviction order once a buffer fills -- does not depend on the
/// filesystem's directory ordering. Recording runs name files with an
/// ordinal prefix, which makes the name sort chronological.
#[derive(Debug, Clone)]
pub struct TrajectorySource {
    dir: PathBuf,
}

impl TrajectorySource {
    /// Create a source over the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this source enumerates.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All record files in the directory, sorted by file name.
    pub fn entries(&self) -> Result<Vec<PathBuf>, ReplayError> {
        if !self.dir.is_dir() {
            return Err(ReplayError::MissingDirectory(self.dir.clone()));
        }
        let read_dir = fs::read_dir(&self.dir).map_err(|source| ReplayError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| ReplayError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        debug!(dir = %self.dir.display(), files = paths.len(), "Enumerated trajectory records");
        Ok(paths)
    }

    /// Deserialize one record file.
    pub fn load(path: &Path) -> Result<TrajectoryRecord, ReplayError> {
        let data = fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ReplayError::Deserialize {
            path: path.to_path_buf(),
            source,
        })
    }
}
