//! Per-file records, run results and the events a run emits.
//!
//! A run produces exactly one terminal event: either [`RunEvent::Completed`]
//! carrying the [`BatchResult`], or [`RunEvent::Failed`] with a run-level
//! message. Per-file problems never end a run; they are collected as
//! [`FailureRecord`]s inside the result.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Why a single file could not be sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    /// The category directory could not be created.
    DirectoryCreationFailed,
    /// Copying (or moving) the file into its category failed.
    CopyFailed,
    /// No category could be extracted from the file name (delimiter mode only).
    CategoryUnresolvable,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureKind::DirectoryCreationFailed => "directory creation failed",
            FailureKind::CopyFailed => "copy failed",
            FailureKind::CategoryUnresolvable => "category unresolvable",
        };
        f.write_str(text)
    }
}

/// A file that was placed into a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessRecord {
    pub file_path: PathBuf,
    pub file_name: String,
    pub category: String,
}

/// A file that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub file_path: PathBuf,
    pub file_name: String,
    pub kind: FailureKind,
    /// Human-readable reason shown in the results view.
    pub error_reason: String,
    /// Underlying OS error text, when there was one.
    pub detail: Option<String>,
}

/// Outcome of routing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationRecord {
    Success(SuccessRecord),
    Failure(FailureRecord),
}

/// Aggregate outcome of one run.
///
/// Records are kept in the order files were processed.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub success_files: Vec<SuccessRecord>,
    pub failed_files: Vec<FailureRecord>,
    /// Number of files the scan found, including ones skipped without a record.
    pub total_files: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
}

impl BatchResult {
    /// Creates an empty result stamped with the current time.
    pub fn new() -> Self {
        Self {
            success_count: 0,
            failed_count: 0,
            success_files: Vec::new(),
            failed_files: Vec::new(),
            total_files: 0,
            started_at: Local::now(),
            finished_at: None,
        }
    }

    /// Appends a record and bumps the matching counter.
    pub fn record(&mut self, record: ClassificationRecord) {
        match record {
            ClassificationRecord::Success(success) => {
                self.success_count += 1;
                self.success_files.push(success);
            }
            ClassificationRecord::Failure(failure) => {
                self.failed_count += 1;
                self.failed_files.push(failure);
            }
        }
    }

    /// Files the scan found that produced neither a success nor a failure.
    pub fn skipped_count(&self) -> usize {
        self.total_files
            .saturating_sub(self.success_count + self.failed_count)
    }

    /// Stamps the completion time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    /// Serializes the result as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for BatchResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Notifications sent from a running classification to its caller.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Progress checkpoint. `percent` never decreases within a run.
    Progress { percent: u8, message: String },
    /// The run finished; this is the last event.
    Completed(BatchResult),
    /// The run was aborted by a run-level error; this is the last event.
    Failed(String),
}

impl RunEvent {
    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunEvent::Progress { .. })
    }
}
