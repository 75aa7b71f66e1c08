/// Moving files into date directories and recording what was moved.
///
/// Moves are attempted as an atomic rename first. When the source and the
/// target directory sit on different filesystems the file is copied and the
/// original removed instead.
use crate::error::{SortError, SortResult};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the history file written into the sorted directory.
pub const HISTORY_FILE_NAME: &str = ".datesort_history.json";

/// A single completed (or, in dry-run mode, planned) move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    /// Name of the date directory the file went into.
    pub directory: String,
}

impl Operation {
    pub fn new(original_path: &Path, directory: &Path) -> Self {
        let file_name = original_path.file_name().unwrap_or_default();
        Self {
            original_path: original_path.to_path_buf(),
            new_path: directory.join(file_name),
            directory: directory
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Everything one run moved, persisted so the run can be undone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLog {
    /// When the run happened; stored as RFC 3339.
    pub timestamp: DateTime<Local>,
    pub base_path: PathBuf,
    pub operations: Vec<Operation>,
    /// Directories the run created; undo removes them again when empty.
    #[serde(default)]
    pub created_directories: Vec<PathBuf>,
}

impl OperationLog {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            timestamp: Local::now(),
            base_path,
            operations: Vec::new(),
            created_directories: Vec::new(),
        }
    }

    pub fn history_file_path(base_path: &Path) -> PathBuf {
        base_path.join(HISTORY_FILE_NAME)
    }

    /// Writes the log as pretty JSON, replacing any previous history.
    pub fn save(&self, base_path: &Path) -> SortResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            SortError::HistoryWrite(io::Error::new(io::ErrorKind::InvalidData, e))
        })?;

        fs::write(Self::history_file_path(base_path), json).map_err(SortError::HistoryWrite)
    }

    /// Loads the most recent log, or `None` if there is no history file.
    pub fn load(base_path: &Path) -> SortResult<Option<Self>> {
        let history_path = Self::history_file_path(base_path);

        if !history_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&history_path).map_err(SortError::HistoryRead)?;
        let log = serde_json::from_str(&json)
            .map_err(|e| SortError::InvalidHistory(format!("JSON parse error: {}", e)))?;

        Ok(Some(log))
    }

    pub fn delete(base_path: &Path) -> SortResult<()> {
        let history_path = Self::history_file_path(base_path);
        if history_path.exists() {
            fs::remove_file(&history_path).map_err(SortError::HistoryWrite)?;
        }
        Ok(())
    }
}

/// Relocates a file into a directory.
pub trait Mover: Send + Sync {
    /// Moves `source` into `directory`, keeping its file name, and returns
    /// the new path. Never overwrites an existing file.
    fn move_into(&self, source: &Path, directory: &Path) -> SortResult<PathBuf>;
}

/// Moves files on the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMover;

impl Mover for FsMover {
    fn move_into(&self, source: &Path, directory: &Path) -> SortResult<PathBuf> {
        let file_name = source.file_name().ok_or_else(|| SortError::Move {
            from: source.to_path_buf(),
            to: directory.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "file has no name component"),
        })?;

        let destination = directory.join(file_name);

        if fs::symlink_metadata(&destination).is_ok() {
            return Err(SortError::DestinationExists { path: destination });
        }

        relocate(source, &destination).map_err(|e| SortError::Move {
            from: source.to_path_buf(),
            to: destination.clone(),
            source: e,
        })?;
        Ok(destination)
    }
}

/// Renames `source` to `destination`, copying and removing the source when
/// the two sit on different filesystems.
pub fn relocate(source: &Path, destination: &Path) -> io::Result<()> {
    relocate_with(source, destination, |from, to| fs::rename(from, to))
}

fn relocate_with<F>(source: &Path, destination: &Path, rename: F) -> io::Result<()>
where
    F: FnOnce(&Path, &Path) -> io::Result<()>,
{
    match rename(source, destination) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                from = %source.display(),
                to = %destination.display(),
                "Rename crosses filesystems, copying instead"
            );
            copy_and_remove(source, destination)
        }
        result => result,
    }
}

fn copy_and_remove(source: &Path, destination: &Path) -> io::Result<()> {
    if let Err(e) = fs::copy(source, destination) {
        // Don't leave a partial copy behind
        if let Err(cleanup) = fs::remove_file(destination)
            && cleanup.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(
                path = %destination.display(),
                error = %cleanup,
                "Could not remove partial copy"
            );
        }
        return Err(e);
    }

    fs::remove_file(source)
}
