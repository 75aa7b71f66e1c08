//! A single sorting pass over a working directory.
//!
//! The pass lists the directory, seeds an [`OutputDirectoryRegistry`] from
//! the date directories already present, and only then walks the candidate
//! files. Every per-file problem becomes an entry in the [`SortReport`];
//! the only error that ends the pass is failing to list the directory.

use crate::bucket::{CreationDateReader, DateBucketResolver, FsCreationDateReader};
use crate::classifier::{ContentClassifier, Eligibility, FileClassifier};
use crate::config::{CompiledFilters, SorterConfig};
use crate::error::{SortError, SortResult};
use crate::mover::{FsMover, Mover, Operation};
use crate::registry::OutputDirectoryRegistry;
use crate::scan::{self, DirectoryEntry};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Why a file was left where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Excluded by the configured filters.
    Filtered,
    NotRegularFile,
    /// Primary content type is `application`.
    Application(String),
    UnknownType,
    /// The creation timestamp could not be read.
    CreationTimeUnavailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Filtered => write!(f, "excluded by filters"),
            SkipReason::NotRegularFile => write!(f, "not a regular file"),
            SkipReason::Application(mime) => write!(f, "application type ({})", mime),
            SkipReason::UnknownType => write!(f, "unknown content type"),
            SkipReason::CreationTimeUnavailable(reason) => {
                write!(f, "creation time unavailable: {}", reason)
            }
        }
    }
}

/// What happened to one candidate file.
#[derive(Debug)]
pub enum FileOutcome {
    Moved(Operation),
    /// Dry-run only: the move that would have happened.
    Planned(Operation),
    Skipped(SkipReason),
    Failed(SortError),
}

/// Summary of one pass.
#[derive(Debug, Default)]
pub struct SortReport {
    pub root: PathBuf,
    pub dry_run: bool,
    /// Pre-existing date directories taken over as output directories.
    pub absorbed_directories: Vec<PathBuf>,
    /// Directories created (or planned, in dry-run mode) during the pass.
    pub created_directories: Vec<PathBuf>,
    /// Completed moves, or planned moves in dry-run mode.
    pub moved: Vec<Operation>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub failed: Vec<(PathBuf, SortError)>,
}

impl SortReport {
    fn record(&mut self, path: PathBuf, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Moved(op) | FileOutcome::Planned(op) => self.moved.push(op),
            FileOutcome::Skipped(reason) => self.skipped.push((path, reason)),
            FileOutcome::Failed(err) => self.failed.push((path, err)),
        }
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sorts the files of one directory into day directories.
///
/// The collaborators that touch the platform (creation time, content type,
/// moving) are trait objects so they can be replaced in tests.
///
/// # Examples
///
/// ```no_run
/// use datesort::Sorter;
///
/// let report = Sorter::new("/path/to/inbox").run()?;
/// println!("moved {} files", report.moved.len());
/// # Ok::<(), datesort::SortError>(())
/// ```
pub struct Sorter {
    root: PathBuf,
    resolver: DateBucketResolver,
    filters: CompiledFilters,
    reader: Box<dyn CreationDateReader>,
    classifier: Box<dyn FileClassifier>,
    mover: Box<dyn Mover>,
    dry_run: bool,
    jobs: usize,
    progress: Option<ProgressBar>,
}

impl Sorter {
    /// Creates a sorter for `root` with default settings and the
    /// filesystem-backed collaborators.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            resolver: DateBucketResolver::default(),
            filters: CompiledFilters::default(),
            reader: Box::new(FsCreationDateReader),
            classifier: Box::new(ContentClassifier),
            mover: Box::new(FsMover),
            dry_run: false,
            jobs: 1,
            progress: None,
        }
    }

    /// Creates a sorter configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns `SortError::Config` if a filter pattern does not compile.
    pub fn from_config(root: impl Into<PathBuf>, config: &SorterConfig) -> SortResult<Self> {
        let mut sorter = Self::new(root);
        sorter.resolver = DateBucketResolver::new(config.sort.day_boundary_hour);
        sorter.filters = CompiledFilters::new(&config.filters)?;
        sorter.jobs = config.sort.jobs.max(1);
        Ok(sorter)
    }

    pub fn with_reader(mut self, reader: impl CreationDateReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    pub fn with_classifier(mut self, classifier: impl FileClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn with_mover(mut self, mover: impl Mover + 'static) -> Self {
        self.mover = Box::new(mover);
        self
    }

    pub fn with_resolver(mut self, resolver: DateBucketResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Runs one pass.
    ///
    /// # Errors
    ///
    /// Returns `SortError::ListDirectory` if the working directory cannot be
    /// listed. Per-file failures are reported in the returned report.
    pub fn run(&self) -> SortResult<SortReport> {
        let partition = scan::partition(scan::list_entries(&self.root)?);

        for entry in &partition.other {
            tracing::debug!(path = %entry.path.display(), "Skipping entry that is neither file nor directory");
        }

        let registry = OutputDirectoryRegistry::new(&self.root).with_dry_run(self.dry_run);
        let absorbed_directories = registry.seed(&partition.directories);

        if let Some(progress) = &self.progress {
            progress.set_length(partition.files.len() as u64);
        }

        let outcomes: Vec<(PathBuf, FileOutcome)> = if self.jobs > 1 {
            self.process_parallel(&partition.files, &registry)
        } else {
            partition
                .files
                .iter()
                .map(|entry| (entry.path.clone(), self.process_tracked(entry, &registry)))
                .collect()
        };

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        let mut report = SortReport {
            root: self.root.clone(),
            dry_run: self.dry_run,
            absorbed_directories,
            ..Default::default()
        };
        for (path, outcome) in outcomes {
            report.record(path, outcome);
        }
        report.created_directories = registry.created_directories();

        tracing::info!(
            moved = report.moved.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Sort pass finished"
        );

        Ok(report)
    }

    fn process_parallel(
        &self,
        files: &[DirectoryEntry],
        registry: &OutputDirectoryRegistry,
    ) -> Vec<(PathBuf, FileOutcome)> {
        let process_all = || -> Vec<(PathBuf, FileOutcome)> {
            files
                .par_iter()
                .map(|entry| (entry.path.clone(), self.process_tracked(entry, registry)))
                .collect()
        };

        match rayon::ThreadPoolBuilder::new().num_threads(self.jobs).build() {
            Ok(pool) => pool.install(process_all),
            Err(e) => {
                tracing::warn!(error = %e, "Could not build worker pool, using the global one");
                process_all()
            }
        }
    }

    fn process_tracked(
        &self,
        entry: &DirectoryEntry,
        registry: &OutputDirectoryRegistry,
    ) -> FileOutcome {
        let outcome = self.process(entry, registry);
        if let Some(progress) = &self.progress {
            progress.inc(1);
        }
        outcome
    }

    /// Decides and carries out what happens to one candidate file.
    fn process(&self, entry: &DirectoryEntry, registry: &OutputDirectoryRegistry) -> FileOutcome {
        let path = &entry.path;

        if !self.filters.should_include(path) {
            tracing::debug!(path = %path.display(), "Excluded by filters");
            return FileOutcome::Skipped(SkipReason::Filtered);
        }

        match self.classifier.classify(path) {
            Eligibility::Eligible { .. } => {}
            Eligibility::NotRegularFile => {
                tracing::debug!(path = %path.display(), "Not a regular file");
                return FileOutcome::Skipped(SkipReason::NotRegularFile);
            }
            Eligibility::Application { mime } => {
                tracing::debug!(path = %path.display(), %mime, "Leaving application file in place");
                return FileOutcome::Skipped(SkipReason::Application(mime));
            }
            Eligibility::UnknownType => {
                tracing::debug!(path = %path.display(), "Unknown content type");
                return FileOutcome::Skipped(SkipReason::UnknownType);
            }
        }

        let created = match self.reader.creation_time(path) {
            Ok(created) => created,
            Err(e) => {
                let err = SortError::CreationTime {
                    path: path.clone(),
                    source: e,
                };
                tracing::warn!(error = %err, "Skipping file");
                return FileOutcome::Skipped(SkipReason::CreationTimeUnavailable(
                    err.to_string(),
                ));
            }
        };

        let key = self.resolver.resolve(&created);

        let directory = match registry.resolve(key) {
            Ok(directory) => directory,
            Err(e) => return FileOutcome::Failed(e),
        };

        if self.dry_run {
            let operation = Operation::new(path, &directory);
            if fs::symlink_metadata(&operation.new_path).is_ok() {
                return FileOutcome::Failed(SortError::DestinationExists {
                    path: operation.new_path,
                });
            }
            return FileOutcome::Planned(operation);
        }

        match self.mover.move_into(path, &directory) {
            Ok(new_path) => {
                tracing::debug!(from = %path.display(), to = %new_path.display(), "Moved file");
                let mut operation = Operation::new(path, &directory);
                operation.new_path = new_path;
                FileOutcome::Moved(operation)
            }
            Err(e) => {
                tracing::error!(error = %e, "Move failed");
                FileOutcome::Failed(e)
            }
        }
    }
}
