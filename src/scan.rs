//! Listing the working directory.

use crate::error::{SortError, SortResult};
use std::fs;
use std::path::{Path, PathBuf};

/// What a directory entry turned out to be (symlinks followed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Sockets, fifos, broken symlinks and entries whose metadata is unreadable.
    Other,
}

/// One entry of the working directory.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Entries split into directories and candidate files.
#[derive(Debug, Default)]
pub struct Partition {
    pub directories: Vec<DirectoryEntry>,
    pub files: Vec<DirectoryEntry>,
    pub other: Vec<DirectoryEntry>,
}

/// Lists the entries of `dir`, sorted by name.
///
/// # Errors
///
/// Returns `SortError::ListDirectory` if `dir` cannot be read. Individual
/// entries that fail mid-iteration are logged and left out.
pub fn list_entries(dir: &Path) -> SortResult<Vec<DirectoryEntry>> {
    let read_dir = fs::read_dir(dir).map_err(|e| SortError::ListDirectory {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        let kind = match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => EntryKind::Directory,
            Ok(meta) if meta.is_file() => EntryKind::File,
            Ok(_) => EntryKind::Other,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Cannot stat entry");
                EntryKind::Other
            }
        };

        entries.push(DirectoryEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            kind,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Splits entries by kind without mutating anything while iterating.
pub fn partition(entries: Vec<DirectoryEntry>) -> Partition {
    let mut partition = Partition::default();
    for entry in entries {
        match entry.kind {
            EntryKind::Directory => partition.directories.push(entry),
            EntryKind::File => partition.files.push(entry),
            EntryKind::Other => partition.other.push(entry),
        }
    }
    partition
}
