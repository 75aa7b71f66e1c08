//! Cache of output directories, one per day.
//!
//! The registry is created empty for each run, seeded from the date-named
//! directories already present, and then extended on demand. Lookups and
//! directory creation happen under a single lock, so concurrent callers never
//! create the same day's directory twice.

use crate::date_dir::DirectoryNameParser;
use crate::date_key::DateKey;
use crate::error::{SortError, SortResult};
use crate::scan::DirectoryEntry;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct RegistryState {
    directories: HashMap<DateKey, PathBuf>,
    created: Vec<PathBuf>,
    failed: HashMap<DateKey, (io::ErrorKind, String)>,
}

/// Maps each [`DateKey`] to the directory its files go into.
#[derive(Debug)]
pub struct OutputDirectoryRegistry {
    root: PathBuf,
    dry_run: bool,
    state: Mutex<RegistryState>,
}

impl OutputDirectoryRegistry {
    /// Creates an empty registry for directories under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// In dry-run mode, `resolve` plans directories without creating them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Absorbs existing date-named directories.
    ///
    /// Directories are taken in the order given; when two names resolve to
    /// the same day, the first one wins. Returns the absorbed directories.
    pub fn seed(&self, directories: &[DirectoryEntry]) -> Vec<PathBuf> {
        let mut absorbed = Vec::new();

        for dir in directories {
            let Some(key) = DirectoryNameParser::date_key(&dir.name) else {
                continue;
            };

            if self.insert(key, dir.path.clone()) {
                tracing::debug!(dir = %dir.path.display(), %key, "Absorbed existing date directory");
                absorbed.push(dir.path.clone());
            } else {
                tracing::debug!(dir = %dir.path.display(), %key, "Another directory already holds this day");
            }
        }

        absorbed
    }

    /// Registers `path` for `key` unless the day already has a directory.
    ///
    /// Returns `true` if the entry was inserted.
    pub fn insert(&self, key: DateKey, path: PathBuf) -> bool {
        let mut state = self.lock();
        if state.directories.contains_key(&key) {
            return false;
        }
        state.directories.insert(key, path);
        true
    }

    pub fn get(&self, key: DateKey) -> Option<PathBuf> {
        self.lock().directories.get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the directory for `key`, creating `root/{day}-{month}-{year}`
    /// if the day has none yet.
    ///
    /// An already existing directory at that path counts as created. If
    /// creation fails, the failure is remembered and returned for every later
    /// request of the same day.
    ///
    /// # Errors
    ///
    /// Returns `SortError::DirectoryCreation` if the directory cannot be made.
    pub fn resolve(&self, key: DateKey) -> SortResult<PathBuf> {
        let mut state = self.lock();

        if let Some(path) = state.directories.get(&key) {
            return Ok(path.clone());
        }

        let path = self.root.join(key.dir_name());

        if let Some((kind, message)) = state.failed.get(&key) {
            return Err(SortError::DirectoryCreation {
                path,
                source: io::Error::new(*kind, message.clone()),
            });
        }

        if !self.dry_run {
            if let Err(e) = create_directory(&path) {
                tracing::error!(dir = %path.display(), error = %e, "Failed to create date directory");
                state.failed.insert(key, (e.kind(), e.to_string()));
                return Err(SortError::DirectoryCreation { path, source: e });
            }
            tracing::info!(dir = %path.display(), "Created date directory");
        }

        state.created.push(path.clone());
        state.directories.insert(key, path.clone());
        Ok(path)
    }

    /// Directories created by `resolve` (or planned, in dry-run mode), in
    /// creation order.
    pub fn created_directories(&self) -> Vec<PathBuf> {
        self.lock().created.clone()
    }
}

fn create_directory(path: &Path) -> io::Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}
