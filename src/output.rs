//! Terminal output: colored status lines, the progress bar and the summary
//! table. Diagnostics go through `tracing`; this module is only for what the
//! user asked to see.

use crate::sorter::SortReport;
use crate::undo::UndoReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::Path;

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar; the length is set once the files are known.
    pub fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints every move, skip and failure of a pass, then the summary table.
    pub fn sort_report(report: &SortReport) {
        let verb = if report.dry_run { "Would move" } else { "Moved" };

        for op in &report.moved {
            Self::success(&format!(
                "{} {} → {}/",
                verb,
                display_name(&op.original_path),
                op.directory
            ));
        }

        let created = if report.dry_run { "Would create" } else { "Created" };
        for dir in &report.created_directories {
            Self::info(&format!("{} {}/", created, display_name(dir)));
        }

        if !report.skipped.is_empty() {
            Self::header("Skipped");
            for (path, reason) in &report.skipped {
                println!("  - {}: {}", display_name(path), reason);
            }
        }

        if !report.failed.is_empty() {
            Self::header("Failed");
            for (path, err) in &report.failed {
                Self::error(&format!("{}: {}", display_name(path), err));
            }
        }

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for op in &report.moved {
            *counts.entry(op.directory.clone()).or_insert(0) += 1;
        }
        if !counts.is_empty() {
            Self::summary_table(&counts, report.moved.len());
        }
    }

    pub fn undo_report(report: &UndoReport) {
        Self::success(&format!("Restored: {}", report.restored_files));

        if !report.removed_directories.is_empty() {
            Self::info(&format!(
                "Removed {} empty date directories",
                report.removed_directories.len()
            ));
        }

        if !report.skipped_files.is_empty() {
            Self::warning(&format!("Skipped: {}", report.skipped_files.len()));
            for (path, reason) in &report.skipped_files {
                println!("    - {}: {}", path.display(), reason);
            }
        }

        if !report.failed_restores.is_empty() {
            Self::error(&format!("Failed: {}", report.failed_restores.len()));
            for (path, reason) in &report.failed_restores {
                eprintln!("    - {}: {}", path.display(), reason);
            }
            Self::warning("History file was NOT deleted due to failures.");
        }
    }

    /// Prints the number of files per date directory.
    pub fn summary_table(directory_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = directory_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max("Directory".len());

        println!("{:<width$} | {}", "Directory".bold(), "Files".bold(), width = width);
        println!("{}", "-".repeat(width + 10));

        for (directory, count) in directory_counts {
            println!(
                "{:<width$} | {} {}",
                directory,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
