/// Reverting the most recent sort.
///
/// Files are moved back out of their date directories using the history the
/// sort recorded, and directories the sort created are removed again once
/// they are empty.
use crate::error::{SortError, SortResult};
use crate::mover::{self, Operation, OperationLog};
use std::fs;
use std::path::{Path, PathBuf};

/// What an undo achieved.
#[derive(Debug, Default)]
pub struct UndoReport {
    pub restored_files: usize,
    /// Directories removed because the undone run created them.
    pub removed_directories: Vec<PathBuf>,
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Files no longer where the sort put them.
    pub skipped_files: Vec<(PathBuf, String)>,
}

impl UndoReport {
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

pub struct UndoManager;

impl UndoManager {
    /// Undoes the sort recorded in `base_path`.
    ///
    /// Operations are reverted newest first. A file that has since reappeared
    /// at its original location is renamed to `name.bak.<timestamp>` before
    /// the sorted copy is moved back. The history file is deleted only when
    /// every file was restored.
    ///
    /// # Errors
    ///
    /// Returns `SortError::NoHistory` if nothing was recorded, or a history
    /// error if the file cannot be read.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use datesort::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// let report = UndoManager::undo(Path::new("/path/to/inbox"))?;
    /// println!("Restored {} files", report.restored_files);
    /// # Ok::<(), datesort::SortError>(())
    /// ```
    pub fn undo(base_path: &Path) -> SortResult<UndoReport> {
        let log = OperationLog::load(base_path)?.ok_or_else(|| SortError::NoHistory {
            path: base_path.to_path_buf(),
        })?;

        let mut report = UndoReport::default();
        for operation in log.operations.iter().rev() {
            match Self::restore_file(operation) {
                Ok(()) => report.restored_files += 1,
                Err(Restore::Missing(path, reason)) => report.skipped_files.push((path, reason)),
                Err(Restore::Failed(path, reason)) => {
                    tracing::error!(path = %path.display(), %reason, "Could not restore file");
                    report.failed_restores.push((path, reason));
                }
            }
        }

        for dir in log.created_directories.iter().rev() {
            // remove_dir refuses non-empty directories, which is what we want
            match fs::remove_dir(dir) {
                Ok(()) => report.removed_directories.push(dir.clone()),
                Err(e) => {
                    tracing::debug!(dir = %dir.display(), error = %e, "Keeping directory");
                }
            }
        }

        if report.is_complete_success()
            && let Err(e) = OperationLog::delete(base_path)
        {
            tracing::warn!(error = %e, "Could not delete history file");
        }

        Ok(report)
    }

    fn restore_file(operation: &Operation) -> Result<(), Restore> {
        if !operation.new_path.exists() {
            return Err(Restore::Missing(
                operation.new_path.clone(),
                "File not found at expected location".to_string(),
            ));
        }

        if operation.original_path.exists() {
            let backup_path = Self::generate_backup_path(&operation.original_path);
            fs::rename(&operation.original_path, &backup_path).map_err(|e| {
                Restore::Failed(
                    operation.original_path.clone(),
                    format!("Could not backup conflicting file: {}", e),
                )
            })?;
        }

        mover::relocate(&operation.new_path, &operation.original_path).map_err(|e| {
            Restore::Failed(
                operation.new_path.clone(),
                format!("Failed to restore file: {}", e),
            )
        })
    }

    /// `file.txt` becomes `file.txt.bak.20251109-143052`.
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file");

        original_path.with_file_name(format!("{}.bak.{}", filename, timestamp))
    }
}

enum Restore {
    Missing(PathBuf, String),
    Failed(PathBuf, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mover::{FsMover, Mover};
    use tempfile::TempDir;

    /// Moves `name` into `dir` (creating it) and records it like a sort would.
    fn sort_into(base: &Path, name: &str, dir: &str, log: &mut OperationLog) {
        let target = base.join(dir);
        if !target.exists() {
            fs::create_dir(&target).unwrap();
            log.created_directories.push(target.clone());
        }
        let source = base.join(name);
        let new_path = FsMover.move_into(&source, &target).unwrap();
        log.operations.push(Operation {
            original_path: source,
            new_path,
            directory: dir.to_string(),
        });
    }

    #[test]
    fn test_undo_no_history() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = UndoManager::undo(temp_dir.path());
        assert!(matches!(result, Err(SortError::NoHistory { .. })));
    }

    #[test]
    fn test_undo_restores_and_removes_created_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").unwrap();
        fs::write(base.join("b.txt"), "b").unwrap();

        let mut log = OperationLog::new(base.to_path_buf());
        sort_into(base, "a.txt", "1-1-2024", &mut log);
        sort_into(base, "b.txt", "2-1-2024", &mut log);
        log.save(base).unwrap();

        let report = UndoManager::undo(base).unwrap();

        assert_eq!(report.restored_files, 2);
        assert_eq!(report.removed_directories.len(), 2);
        assert!(base.join("a.txt").exists());
        assert!(base.join("b.txt").exists());
        assert!(!base.join("1-1-2024").exists());
        assert!(OperationLog::load(base).unwrap().is_none());
    }

    #[test]
    fn test_undo_keeps_non_empty_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").unwrap();

        let mut log = OperationLog::new(base.to_path_buf());
        sort_into(base, "a.txt", "1-1-2024", &mut log);
        log.save(base).unwrap();
        fs::write(base.join("1-1-2024/added-later.txt"), "new").unwrap();

        let report = UndoManager::undo(base).unwrap();

        assert_eq!(report.restored_files, 1);
        assert!(report.removed_directories.is_empty());
        assert!(base.join("1-1-2024/added-later.txt").exists());
    }

    #[test]
    fn test_undo_backs_up_conflicting_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "sorted").unwrap();

        let mut log = OperationLog::new(base.to_path_buf());
        sort_into(base, "a.txt", "1-1-2024", &mut log);
        log.save(base).unwrap();
        fs::write(base.join("a.txt"), "newer").unwrap();

        let report = UndoManager::undo(base).unwrap();

        assert_eq!(report.restored_files, 1);
        assert_eq!(fs::read_to_string(base.join("a.txt")).unwrap(), "sorted");
        let backups = fs::read_dir(base)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with("a.txt.bak."))
            .count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_undo_missing_file_keeps_history() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").unwrap();

        let mut log = OperationLog::new(base.to_path_buf());
        sort_into(base, "a.txt", "1-1-2024", &mut log);
        log.save(base).unwrap();
        fs::remove_file(base.join("1-1-2024/a.txt")).unwrap();

        let report = UndoManager::undo(base).unwrap();

        assert_eq!(report.restored_files, 0);
        assert_eq!(report.skipped_files.len(), 1);
        assert!(!report.is_complete_success());
        assert!(OperationLog::load(base).unwrap().is_some());
    }
}
