//! Output formatting and styling module.
//!
//! All terminal output of the command line goes through [`OutputFormatter`]:
//! colored status lines, the run progress bar and the end-of-run summary.

use crate::report::{BatchResult, FailureRecord};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - The percentage progress bar of a run
/// - Summary tables of a finished run
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Classification complete");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message.red());
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar measured in percent (0 to 100).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar();
    /// pb.set_position(20);
    /// pb.set_message("Found 12 files");
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Counts successfully placed files per category.
    pub fn category_counts(result: &BatchResult) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for record in &result.success_files {
            *counts.entry(record.category.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Prints a summary table of the run, grouped by category.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use dirsort::report::BatchResult;
    ///
    /// let result = BatchResult::new();
    /// OutputFormatter::summary_table(&result);
    /// ```
    pub fn summary_table(result: &BatchResult) {
        Self::header("SUMMARY");

        let categories = Self::category_counts(result);

        let max_category_len = categories
            .keys()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in &categories {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                file_word(*count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        Self::summary_row("Placed", result.success_count, max_category_len);
        if result.failed_count > 0 {
            println!(
                "{:<width$} | {} {}",
                "Failed".bold(),
                result.failed_count.to_string().red().bold(),
                file_word(result.failed_count),
                width = max_category_len
            );
        }
        let skipped = result.skipped_count();
        if skipped > 0 {
            println!(
                "{:<width$} | {} {}",
                "Skipped".bold(),
                skipped.to_string().yellow(),
                file_word(skipped),
                width = max_category_len
            );
        }
        Self::summary_row("Total", result.total_files, max_category_len);
    }

    fn summary_row(label: &str, count: usize, width: usize) {
        println!(
            "{:<width$} | {} {}",
            label.bold(),
            count.to_string().green().bold(),
            file_word(count),
            width = width
        );
    }

    /// Lists every failed file with its reason.
    pub fn failure_list(failures: &[FailureRecord]) {
        if failures.is_empty() {
            return;
        }
        Self::header("FAILURES");
        for failure in failures {
            let detail = failure
                .detail
                .as_deref()
                .map(|d| format!(" ({})", d))
                .unwrap_or_default();
            println!(
                "{} {} [{}]: {}{}",
                "✗".red(),
                failure.file_name,
                failure.kind.to_string().yellow(),
                failure.error_reason,
                detail.dimmed()
            );
        }
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
