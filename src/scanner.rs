//! Filesystem scanning for candidate files.
//!
//! Enumerates the files under a source directory according to a
//! [`ScanPolicy`]. Directories themselves are never returned, only the files
//! reachable through them.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Depth ceiling used for "recurse everything" scans.
pub const UNLIMITED_DEPTH: usize = 100;

/// A file discovered by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// The absolute path to the file.
    pub absolute_path: PathBuf,
    /// The base name of the file, including its extension.
    pub file_name: String,
    /// Nesting level below the scan root. Files directly in the root are at depth 1.
    pub depth: usize,
}

/// How far below the root the scanner descends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanPolicy {
    /// Only the direct children of the root.
    Flat,
    /// Every descendant, capped at [`UNLIMITED_DEPTH`].
    #[default]
    Recursive,
    /// Descendants up to and including `max_depth`. A bound of 1 is the same as `Flat`.
    Bounded(usize),
}

impl ScanPolicy {
    /// Builds a policy from the three scan switches exposed to users.
    ///
    /// `max_depth` is only consulted when both `recursive` and `depth_limited` are set.
    pub fn from_flags(recursive: bool, depth_limited: bool, max_depth: usize) -> Self {
        match (recursive, depth_limited) {
            (false, _) => ScanPolicy::Flat,
            (true, false) => ScanPolicy::Recursive,
            (true, true) => ScanPolicy::Bounded(max_depth),
        }
    }

    /// Returns the effective depth ceiling for this policy.
    pub fn max_depth(&self) -> usize {
        match self {
            ScanPolicy::Flat => 1,
            ScanPolicy::Recursive => UNLIMITED_DEPTH,
            ScanPolicy::Bounded(depth) => *depth,
        }
    }
}

/// Errors raised before or during a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Collects every file under `root` that the policy allows.
///
/// The returned order is whatever order the filesystem yields entries in;
/// callers must not rely on it being sorted.
///
/// # Errors
///
/// Returns `PathNotFound` / `NotADirectory` for a bad root, `InvalidArgument`
/// when the policy's depth is below 1, and `ReadDir` when a directory cannot
/// be listed mid-walk.
///
/// # Examples
///
/// ```no_run
/// use dirsort::scanner::{scan_files, ScanPolicy};
/// use std::path::Path;
///
/// let files = scan_files(Path::new("/path/to/source"), ScanPolicy::Bounded(2)).unwrap();
/// for file in &files {
///     println!("{} (depth {})", file.file_name, file.depth);
/// }
/// ```
pub fn scan_files(root: &Path, policy: ScanPolicy) -> Result<Vec<FileDescriptor>, ScanError> {
    if !root.exists() {
        return Err(ScanError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let max_depth = policy.max_depth();
    if max_depth < 1 {
        return Err(ScanError::InvalidArgument(format!(
            "max_depth must be at least 1, got {}",
            max_depth
        )));
    }

    let root = std::path::absolute(root).map_err(|e| ScanError::ReadDir {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    walk(&root, 1, max_depth, &mut files)?;
    debug!(root = %root.display(), max_depth, found = files.len(), "scan finished");
    Ok(files)
}

/// Depth-first walk. Files at `depth == max_depth` are collected, but their
/// sibling directories are not entered. Any unreadable directory or entry
/// aborts the scan.
fn walk(
    dir: &Path,
    depth: usize,
    max_depth: usize,
    files: &mut Vec<FileDescriptor>,
) -> Result<(), ScanError> {
    let read_error = |e: std::io::Error| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    };

    for entry in fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();
        if path.is_file() {
            files.push(FileDescriptor {
                file_name: entry.file_name().to_string_lossy().to_string(),
                absolute_path: path,
                depth,
            });
        } else if path.is_dir() && depth < max_depth {
            walk(&path, depth + 1, max_depth, files)?;
        }
    }

    Ok(())
}
