//! Error types shared across the sorter.

use crate::config::ConfigError;
use std::path::PathBuf;

/// Errors that can occur while sorting a directory or undoing a sort.
///
/// Only [`SortError::ListDirectory`] ends a run early. Everything else is
/// recorded against the file or directory it concerns.
#[derive(Debug, thiserror::Error)]
pub enum SortError {
    /// The working directory itself could not be listed.
    #[error("Failed to read directory {}: {source}", .path.display())]
    ListDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The creation timestamp of a file could not be read.
    #[error("Failed to read creation time of {}: {source}", .path.display())]
    CreationTime {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A date directory could not be created.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Moving a file into its date directory failed.
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    /// A file with the same name already sits in the date directory.
    #[error("Refusing to overwrite existing {}", .path.display())]
    DestinationExists { path: PathBuf },

    #[error("Failed to write history file: {0}")]
    HistoryWrite(#[source] std::io::Error),

    #[error("Failed to read history file: {0}")]
    HistoryRead(#[source] std::io::Error),

    #[error("Invalid history file format: {0}")]
    InvalidHistory(String),

    /// There is no recorded run to undo.
    #[error("No previous sort found to undo in {}", .path.display())]
    NoHistory { path: PathBuf },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for sorting operations.
pub type SortResult<T> = Result<T, SortError>;
