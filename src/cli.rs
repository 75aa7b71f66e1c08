//! Command-line interface for datesort.
//!
//! Without flags the tool sorts the current working directory. Per-file
//! problems are reported but never make the run fail; only an unreadable
//! working directory, bad configuration or a failed undo do.

use crate::config::SorterConfig;
use crate::error::{SortError, SortResult};
use crate::mover::OperationLog;
use crate::output::OutputFormatter;
use crate::sorter::{SortReport, Sorter};
use crate::undo::UndoManager;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Sort the files of the current directory into day-named folders by
/// creation date.
#[derive(Debug, Parser)]
#[command(name = "datesort", version, about, long_about = None)]
pub struct Args {
    /// Show what would be moved without touching anything
    #[arg(long, conflicts_with = "undo")]
    pub dry_run: bool,

    /// Move the files of the last sort back where they came from
    #[arg(long)]
    pub undo: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of worker threads (overrides the configuration file)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Log per-file decisions to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCommand {
    Sort {
        /// If true, plan the moves without making them.
        dry_run: bool,
    },
    Undo,
}

impl From<&Args> for SortCommand {
    fn from(args: &Args) -> Self {
        if args.undo {
            SortCommand::Undo
        } else {
            SortCommand::Sort {
                dry_run: args.dry_run,
            }
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default level.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "datesort=debug" } else { "datesort=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the parsed command line against `working_dir`.
pub fn run(args: &Args, working_dir: &Path) -> SortResult<()> {
    let mut config = SorterConfig::load(args.config.as_deref(), working_dir)?;
    if let Some(jobs) = args.jobs {
        config.sort.jobs = usize::from(jobs);
    }
    run_cli_with_config(SortCommand::from(args), working_dir, &config)
}

/// Runs `command` against `dir_path` with default configuration.
///
/// # Examples
///
/// ```no_run
/// use datesort::cli::{run_cli, SortCommand};
/// use std::path::Path;
///
/// if let Err(e) = run_cli(SortCommand::Sort { dry_run: true }, Path::new(".")) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(command: SortCommand, dir_path: &Path) -> SortResult<()> {
    run_cli_with_config(command, dir_path, &SorterConfig::default())
}

pub fn run_cli_with_config(
    command: SortCommand,
    dir_path: &Path,
    config: &SorterConfig,
) -> SortResult<()> {
    match command {
        SortCommand::Sort { dry_run } => sort_directory(dir_path, config, dry_run),
        SortCommand::Undo => undo_sort(dir_path),
    }
}

/// Sorts `base_path` and, unless this is a dry run, records the moves so
/// they can be undone.
fn sort_directory(base_path: &Path, config: &SorterConfig, dry_run: bool) -> SortResult<()> {
    if dry_run {
        OutputFormatter::dry_run_notice(&format!("Analyzing {}", base_path.display()));
    } else {
        OutputFormatter::info(&format!("Sorting contents of: {}", base_path.display()));
    }

    let report = Sorter::from_config(base_path, config)?
        .with_dry_run(dry_run)
        .with_progress(OutputFormatter::create_progress_bar())
        .run()?;

    OutputFormatter::sort_report(&report);

    let status = PassStatus::of(&report);
    if status == PassStatus::NothingToSort {
        OutputFormatter::info("Nothing to sort.");
        return Ok(());
    }

    if dry_run {
        OutputFormatter::dry_run_notice("No files were modified.");
    } else if !report.moved.is_empty() {
        let mut log = OperationLog::new(base_path.to_path_buf());
        log.operations = report.moved.clone();
        log.created_directories = report.created_directories.clone();

        match log.save(base_path) {
            Ok(()) => OutputFormatter::success(&format!(
                "Sorting complete. Run 'datesort --undo' in {} to revert.",
                base_path.display()
            )),
            Err(e) => {
                tracing::warn!(error = %e, "Could not save history");
                OutputFormatter::warning(&format!(
                    "Could not save history, undo unavailable: {}",
                    e
                ));
            }
        }
    }

    if status == PassStatus::Incomplete {
        OutputFormatter::warning("Some files could not be sorted. Please review errors above.");
    }

    Ok(())
}

/// How a finished pass should be summarized to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassStatus {
    NothingToSort,
    Incomplete,
    Sorted,
}

impl PassStatus {
    fn of(report: &SortReport) -> Self {
        if !report.is_complete_success() {
            PassStatus::Incomplete
        } else if report.moved.is_empty() {
            PassStatus::NothingToSort
        } else {
            PassStatus::Sorted
        }
    }
}

fn undo_sort(base_path: &Path) -> SortResult<()> {
    OutputFormatter::info("Undoing previous sort...");
    let report = UndoManager::undo(base_path)?;
    OutputFormatter::undo_report(&report);
    Ok(())
}

/// Maps a top-level error to the message printed before exiting.
pub fn describe_error(err: &SortError) -> String {
    match err {
        SortError::NoHistory { .. } => format!("{}. Nothing to undo.", err),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_sorts() {
        let args = Args::try_parse_from(["datesort"]).unwrap();
        assert_eq!(SortCommand::from(&args), SortCommand::Sort { dry_run: false });
        assert!(args.config.is_none());
        assert!(args.jobs.is_none());
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from(["datesort", "--dry-run", "-j", "4"]).unwrap();
        assert_eq!(SortCommand::from(&args), SortCommand::Sort { dry_run: true });
        assert_eq!(args.jobs, Some(4));

        let args = Args::try_parse_from(["datesort", "--undo"]).unwrap();
        assert_eq!(SortCommand::from(&args), SortCommand::Undo);
    }

    #[test]
    fn test_rejects_conflicting_or_invalid_flags() {
        assert!(Args::try_parse_from(["datesort", "--undo", "--dry-run"]).is_err());
        assert!(Args::try_parse_from(["datesort", "--jobs", "0"]).is_err());
        assert!(Args::try_parse_from(["datesort", "somewhere"]).is_err());
    }

    #[test]
    fn test_failed_files_are_not_reported_as_nothing_to_sort() {
        let mut report = SortReport::default();
        assert_eq!(PassStatus::of(&report), PassStatus::NothingToSort);

        report.failed.push((
            PathBuf::from("a.txt"),
            SortError::DestinationExists {
                path: PathBuf::from("10-6-2024/a.txt"),
            },
        ));
        assert_eq!(PassStatus::of(&report), PassStatus::Incomplete);

        report.failed.clear();
        report.moved.push(crate::mover::Operation::new(
            Path::new("a.txt"),
            Path::new("10-6-2024"),
        ));
        assert_eq!(PassStatus::of(&report), PassStatus::Sorted);
    }
}
