//! The two classification strategies and the per-file routing they share.
//!
//! A [`Classifier`] turns each [`FileDescriptor`] into a category name (or a
//! reason it has none), then copies the file into `target_dir/<category>`.
//! Files are processed strictly one after another, and every outcome lands
//! in the returned [`BatchResult`]; only construction can fail outright.

use crate::file_category::{ExtensionMap, get_extension, split_extension};
use crate::file_organizer::{FileMover, OrganizeError};
use crate::report::{
    BatchResult, ClassificationRecord, FailureKind, FailureRecord, SuccessRecord,
};
use crate::scanner::FileDescriptor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Position sentinel meaning "extend to the string boundary".
pub const TO_BOUNDARY: i32 = -1;

/// Errors raised when building a classifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Where to cut a category name out of a file name.
///
/// Positions are 1-based occurrence counts of their token, or [`TO_BOUNDARY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimiterSpec {
    pub start_token: String,
    pub end_token: String,
    pub start_pos: i32,
    pub end_pos: i32,
}

impl DelimiterSpec {
    pub fn new(
        start_token: impl Into<String>,
        end_token: impl Into<String>,
        start_pos: i32,
        end_pos: i32,
    ) -> Self {
        Self {
            start_token: start_token.into(),
            end_token: end_token.into(),
            start_pos,
            end_pos,
        }
    }

    /// Checks the token and position invariants.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if a token is empty, a position is neither
    /// [`TO_BOUNDARY`] nor at least 1, or both positions are [`TO_BOUNDARY`].
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.start_token.is_empty() {
            return Err(ClassifierError::InvalidArgument(
                "start delimiter must not be empty".to_string(),
            ));
        }
        if self.end_token.is_empty() {
            return Err(ClassifierError::InvalidArgument(
                "end delimiter must not be empty".to_string(),
            ));
        }
        for (label, pos) in [("start", self.start_pos), ("end", self.end_pos)] {
            if pos != TO_BOUNDARY && pos < 1 {
                return Err(ClassifierError::InvalidArgument(format!(
                    "{} position must be -1 or at least 1, got {}",
                    label, pos
                )));
            }
        }
        if self.start_pos == TO_BOUNDARY && self.end_pos == TO_BOUNDARY {
            return Err(ClassifierError::InvalidArgument(
                "start and end positions cannot both be -1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DelimiterSpec {
    fn default() -> Self {
        Self::new("_", "_", 1, 2)
    }
}

/// Byte offset of the `n`-th (1-based) occurrence of `token` in `text`.
///
/// Each search resumes right after the previous match, so matches never
/// share bytes. Returns `None` for `n < 1`, an empty token, or too few matches.
///
/// # Examples
///
/// ```
/// use dirsort::classifier::nth_occurrence;
///
/// assert_eq!(nth_occurrence("a_b_c", "_", 2), Some(3));
/// assert_eq!(nth_occurrence("a_b_c", "_", 3), None);
/// ```
pub fn nth_occurrence(text: &str, token: &str, n: i32) -> Option<usize> {
    if n < 1 || token.is_empty() {
        return None;
    }

    let mut from = 0;
    let mut found = None;
    for _ in 0..n {
        let index = from + text.get(from..)?.find(token)?;
        found = Some(index);
        from = index + token.len();
    }
    found
}

/// Cuts the category out of `file_name` (extension stripped first).
///
/// Returns `None` when an occurrence cannot be found or the cut is empty.
/// The end occurrence is not required to follow the start occurrence; when
/// it does not, the cut is empty.
pub fn extract_category(spec: &DelimiterSpec, file_name: &str) -> Option<String> {
    let (stem, _) = split_extension(file_name);
    let start_len = spec.start_token.len();

    let category = if spec.end_pos == TO_BOUNDARY {
        let start = nth_occurrence(stem, &spec.start_token, spec.start_pos)?;
        &stem[start + start_len..]
    } else if spec.start_pos == TO_BOUNDARY {
        let end = nth_occurrence(stem, &spec.end_token, spec.end_pos)?;
        &stem[..end]
    } else {
        let start = nth_occurrence(stem, &spec.start_token, spec.start_pos)? + start_len;
        let end = nth_occurrence(stem, &spec.end_token, spec.end_pos)?;
        if end <= start { "" } else { &stem[start..end] }
    };

    if category.is_empty() {
        None
    } else {
        Some(category.to_string())
    }
}

/// Sorts files by their extension.
#[derive(Debug, Clone)]
pub struct ExtensionClassifier {
    extensions: ExtensionMap,
    target_dir: PathBuf,
    delete_source: bool,
}

impl ExtensionClassifier {
    pub fn new(
        extensions: ExtensionMap,
        target_dir: impl Into<PathBuf>,
        delete_source: bool,
    ) -> Result<Self, ClassifierError> {
        Ok(Self {
            extensions,
            target_dir: checked_target(target_dir.into())?,
            delete_source,
        })
    }

    /// Category for a file name; `None` when it has no extension.
    pub fn category_of(&self, file_name: &str) -> Option<String> {
        let extension = get_extension(file_name);
        if extension.is_empty() {
            None
        } else {
            Some(self.extensions.category_for(&extension))
        }
    }
}

/// Sorts files by a delimited segment of their name.
#[derive(Debug, Clone)]
pub struct DelimiterClassifier {
    spec: DelimiterSpec,
    target_dir: PathBuf,
    delete_source: bool,
}

impl DelimiterClassifier {
    /// Validates `spec` and builds the classifier.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the spec breaks its invariants or `target_dir` is empty.
    pub fn new(
        spec: DelimiterSpec,
        target_dir: impl Into<PathBuf>,
        delete_source: bool,
    ) -> Result<Self, ClassifierError> {
        spec.validate()?;
        Ok(Self {
            spec,
            target_dir: checked_target(target_dir.into())?,
            delete_source,
        })
    }

    pub fn spec(&self) -> &DelimiterSpec {
        &self.spec
    }

    /// The category `file_name` would be sorted into, without touching the filesystem.
    pub fn preview(&self, file_name: &str) -> Option<String> {
        extract_category(&self.spec, file_name)
    }

    fn unresolved_reason(&self) -> String {
        format!(
            "cannot extract category: start position {} or end position {} not found",
            self.spec.start_pos, self.spec.end_pos
        )
    }
}

/// What a strategy decided for one file.
enum Decision {
    Route(String),
    Skip,
    Unresolvable(String),
}

/// The active classification strategy.
#[derive(Debug, Clone)]
pub enum Classifier {
    Extension(ExtensionClassifier),
    Delimiter(DelimiterClassifier),
}

impl Classifier {
    /// Routes every file in order and returns the collected records.
    ///
    /// `on_progress` is called with the 1-based index and file name before
    /// each file is handled. `total_files` of the result is left at zero for
    /// the caller to fill in.
    pub fn classify<F>(&self, files: &[FileDescriptor], mut on_progress: F) -> BatchResult
    where
        F: FnMut(usize, &str),
    {
        let mut result = BatchResult::new();

        for (index, file) in files.iter().enumerate() {
            on_progress(index + 1, &file.file_name);

            match self.decide(&file.file_name) {
                Decision::Skip => {
                    debug!(file = %file.file_name, "no extension, skipped");
                }
                Decision::Unresolvable(reason) => {
                    warn!(file = %file.file_name, "{}", reason);
                    result.record(ClassificationRecord::Failure(FailureRecord {
                        file_path: file.absolute_path.clone(),
                        file_name: file.file_name.clone(),
                        kind: FailureKind::CategoryUnresolvable,
                        error_reason: reason,
                        detail: None,
                    }));
                }
                Decision::Route(category) => {
                    result.record(route_file(
                        file,
                        self.target_dir(),
                        category,
                        self.delete_source(),
                    ));
                }
            }
        }

        result
    }

    fn decide(&self, file_name: &str) -> Decision {
        match self {
            Classifier::Extension(classifier) => match classifier.category_of(file_name) {
                Some(category) => Decision::Route(category),
                None => Decision::Skip,
            },
            Classifier::Delimiter(classifier) => match classifier.preview(file_name) {
                Some(category) => Decision::Route(category),
                None => Decision::Unresolvable(classifier.unresolved_reason()),
            },
        }
    }

    pub fn target_dir(&self) -> &Path {
        match self {
            Classifier::Extension(c) => &c.target_dir,
            Classifier::Delimiter(c) => &c.target_dir,
        }
    }

    pub fn delete_source(&self) -> bool {
        match self {
            Classifier::Extension(c) => c.delete_source,
            Classifier::Delimiter(c) => c.delete_source,
        }
    }
}

impl From<ExtensionClassifier> for Classifier {
    fn from(classifier: ExtensionClassifier) -> Self {
        Classifier::Extension(classifier)
    }
}

impl From<DelimiterClassifier> for Classifier {
    fn from(classifier: DelimiterClassifier) -> Self {
        Classifier::Delimiter(classifier)
    }
}

fn checked_target(target_dir: PathBuf) -> Result<PathBuf, ClassifierError> {
    if target_dir.as_os_str().is_empty() {
        return Err(ClassifierError::InvalidArgument(
            "target directory must not be empty".to_string(),
        ));
    }
    Ok(target_dir)
}

/// Creates the category directory and places the file in it.
fn route_file(
    file: &FileDescriptor,
    target_dir: &Path,
    category: String,
    delete_source: bool,
) -> ClassificationRecord {
    let category_dir = target_dir.join(&category);

    if let Err(e) = FileMover::create_category_dir(&category_dir) {
        warn!(file = %file.file_name, error = %e, "category directory not created");
        return failure(file, FailureKind::DirectoryCreationFailed, &e);
    }

    match FileMover::place(&category_dir, &file.absolute_path, delete_source) {
        Ok(destination) => {
            debug!(
                file = %file.file_name,
                category = %category,
                destination = %destination.display(),
                "file placed"
            );
            ClassificationRecord::Success(SuccessRecord {
                file_path: file.absolute_path.clone(),
                file_name: file.file_name.clone(),
                category,
            })
        }
        Err(e) => {
            warn!(file = %file.file_name, error = %e, "copy failed");
            failure(file, FailureKind::CopyFailed, &e)
        }
    }
}

fn failure(file: &FileDescriptor, kind: FailureKind, error: &OrganizeError) -> ClassificationRecord {
    ClassificationRecord::Failure(FailureRecord {
        file_path: file.absolute_path.clone(),
        file_name: file.file_name.clone(),
        kind,
        error_reason: kind.to_string(),
        detail: error.os_detail().or_else(|| Some(error.to_string())),
    })
}
