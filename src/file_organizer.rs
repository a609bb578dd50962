/// File placement into category directories.
///
/// This module copies (or moves) single files into a category directory,
/// picking a free name when the destination is already taken. Every failure
/// is returned as an [`OrganizeError`] value; nothing here panics on I/O.
use crate::file_category::split_extension;
use filetime::FileTime;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while placing a file.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// Failed to create a category directory.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to copy a file into its category directory.
    #[error("Failed to copy {} to {}: {error}", from.display(), to.display())]
    FileCopyFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },
    /// The source path has no file name component.
    #[error("Invalid source path {}: no file name", .0.display())]
    InvalidSource(PathBuf),
}

impl OrganizeError {
    /// Returns the underlying OS error text, if any.
    pub fn os_detail(&self) -> Option<String> {
        match self {
            Self::DirectoryCreationFailed { source, .. } => Some(source.to_string()),
            Self::FileCopyFailure { error, .. } => Some(error.to_string()),
            Self::InvalidSource(_) => None,
        }
    }
}

/// Result type for file placement operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Places files into category directories.
pub struct FileMover;

impl FileMover {
    /// Creates `category_dir` and any missing parents. Existing directories are fine.
    pub fn create_category_dir(category_dir: &Path) -> OrganizeResult<()> {
        fs::create_dir_all(category_dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: category_dir.to_path_buf(),
            source: e,
        })
    }

    /// Copies `source` into `category_dir`, optionally removing the source afterwards.
    ///
    /// The copy keeps the source's base name unless that name is taken, in which
    /// case ` (N)` is inserted before the extension. Access and modification
    /// times are carried over where the platform allows it.
    ///
    /// A failed removal of the source after a successful copy is logged and
    /// otherwise ignored: the copy stands and the call still succeeds.
    ///
    /// # Returns
    ///
    /// The path the file was written to.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::file_organizer::FileMover;
    /// use std::path::Path;
    ///
    /// match FileMover::place(Path::new("/target/Images"), Path::new("/src/photo.jpg"), false) {
    ///     Ok(dest) => println!("Copied to {}", dest.display()),
    ///     Err(e) => eprintln!("Placement failed: {}", e),
    /// }
    /// ```
    pub fn place(category_dir: &Path, source: &Path, delete_source: bool) -> OrganizeResult<PathBuf> {
        let file_name = source
            .file_name()
            .ok_or_else(|| OrganizeError::InvalidSource(source.to_path_buf()))?;

        let destination = Self::unique_destination(category_dir, file_name);

        fs::copy(source, &destination).map_err(|e| OrganizeError::FileCopyFailure {
            from: source.to_path_buf(),
            to: destination.clone(),
            error: e,
        })?;

        if let Err(e) = Self::copy_times(source, &destination) {
            debug!(path = %destination.display(), error = %e, "could not preserve timestamps");
        }

        if delete_source && let Err(e) = fs::remove_file(source) {
            warn!(
                source = %source.display(),
                destination = %destination.display(),
                error = %e,
                "copied but could not remove source"
            );
        }

        Ok(destination)
    }

    /// Returns a path in `dir` for `file_name` that does not exist yet.
    ///
    /// Example: with `photo.jpg` present, yields `photo (1).jpg`, then `photo (2).jpg`.
    /// The check is not atomic with the later write.
    pub fn unique_destination(dir: &Path, file_name: impl AsRef<OsStr>) -> PathBuf {
        let file_name = file_name.as_ref();
        let candidate = dir.join(file_name);
        if !candidate.exists() {
            return candidate;
        }

        let mut counter: u32 = 1;
        loop {
            let candidate = dir.join(numbered_name(file_name, counter));
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Sets the destination's access and modification times from the source.
    ///
    /// Works by path, so read-only copies keep their times too.
    fn copy_times(source: &Path, destination: &Path) -> std::io::Result<()> {
        let metadata = fs::metadata(source)?;
        filetime::set_file_times(
            destination,
            FileTime::from_last_access_time(&metadata),
            FileTime::from_last_modification_time(&metadata),
        )
    }
}

/// `stem (N)ext`. Names that are not UTF-8 split at their last dot instead.
fn numbered_name(file_name: &OsStr, counter: u32) -> OsString {
    if let Some(name) = file_name.to_str() {
        let (stem, ext) = split_extension(name);
        return format!("{} ({}){}", stem, counter, ext).into();
    }

    let path = Path::new(file_name);
    let mut name = path.file_stem().unwrap_or(file_name).to_os_string();
    name.push(format!(" ({})", counter));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_place_copies_and_keeps_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("test.txt");
        fs::write(&source, "test content").expect("Failed to write test file");
        let category_dir = temp_dir.path().join("out").join("Text");
        FileMover::create_category_dir(&category_dir).expect("Failed to create category dir");

        let dest = FileMover::place(&category_dir, &source, false).expect("Failed to place file");

        assert_eq!(dest, category_dir.join("test.txt"));
        assert!(source.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "test content");
    }

    #[test]
    fn test_place_with_delete_moves_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("song.mp3");
        fs::write(&source, "audio").expect("Failed to write test file");
        let category_dir = temp_dir.path().join("Audio");
        FileMover::create_category_dir(&category_dir).unwrap();

        FileMover::place(&category_dir, &source, true).expect("Failed to place file");

        assert!(!source.exists());
        assert!(category_dir.join("song.mp3").exists());
    }

    #[test]
    fn test_collisions_get_numbered_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let category_dir = temp_dir.path().join("Images");
        FileMover::create_category_dir(&category_dir).unwrap();

        let mut placed = Vec::new();
        for sub in ["a", "b", "c"] {
            let dir = temp_dir.path().join(sub);
            fs::create_dir(&dir).unwrap();
            let source = dir.join("photo.jpg");
            fs::write(&source, sub).unwrap();
            placed.push(FileMover::place(&category_dir, &source, false).unwrap());
        }

        let names: Vec<_> = placed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["photo.jpg", "photo (1).jpg", "photo (2).jpg"]);
        assert_eq!(fs::read_to_string(category_dir.join("photo (2).jpg")).unwrap(), "c");
    }

    #[test]
    fn test_unique_destination_without_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("README"), "x").unwrap();
        assert_eq!(
            FileMover::unique_destination(temp_dir.path(), "README"),
            temp_dir.path().join("README (1)")
        );
    }

    #[test]
    fn test_place_preserves_modified_time() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("old.txt");
        fs::write(&source, "old").unwrap();
        let past = SystemTime::now() - Duration::from_secs(86_400 * 30);
        filetime::set_file_mtime(&source, FileTime::from_system_time(past)).unwrap();

        let category_dir = temp_dir.path().join("Text");
        FileMover::create_category_dir(&category_dir).unwrap();
        let dest = FileMover::place(&category_dir, &source, false).unwrap();

        let copied = fs::metadata(dest).unwrap().modified().unwrap();
        let original = fs::metadata(&source).unwrap().modified().unwrap();
        assert_eq!(copied, original);
    }

    #[test]
    fn test_place_missing_source_is_copy_failure() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = FileMover::place(temp_dir.path(), &temp_dir.path().join("gone.txt"), false);
        assert!(matches!(result, Err(OrganizeError::FileCopyFailure { .. })));
    }

    #[test]
    fn test_create_category_dir_nested() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("a").join("b");
        FileMover::create_category_dir(&nested).expect("Failed to create nested dir");
        FileMover::create_category_dir(&nested).expect("Existing dir should be fine");
        assert!(nested.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_place_preserves_modified_time_of_read_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("locked.txt");
        fs::write(&source, "locked").unwrap();
        let past = SystemTime::now() - Duration::from_secs(86_400 * 30);
        filetime::set_file_mtime(&source, FileTime::from_system_time(past)).unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o444)).unwrap();

        let category_dir = temp_dir.path().join("Text");
        FileMover::create_category_dir(&category_dir).unwrap();
        let dest = FileMover::place(&category_dir, &source, false).unwrap();

        let copied = fs::metadata(&dest).unwrap();
        assert!(copied.permissions().readonly());
        assert_eq!(
            copied.modified().unwrap(),
            fs::metadata(&source).unwrap().modified().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_move_keeps_copy_when_source_cannot_be_removed() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let inbox = temp_dir.path().join("inbox");
        fs::create_dir(&inbox).unwrap();
        let source = inbox.join("report.pdf");
        fs::write(&source, "pdf").unwrap();
        fs::set_permissions(&inbox, fs::Permissions::from_mode(0o555)).unwrap();
        // Privileged users can still write into a read-only directory.
        if fs::write(inbox.join("writable"), "").is_ok() {
            fs::set_permissions(&inbox, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let category_dir = temp_dir.path().join("Documents");
        FileMover::create_category_dir(&category_dir).unwrap();
        let result = FileMover::place(&category_dir, &source, true);
        fs::set_permissions(&inbox, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(result.unwrap(), category_dir.join("report.pdf"));
        assert!(source.exists());
        assert_eq!(fs::read_to_string(category_dir.join("report.pdf")).unwrap(), "pdf");
    }

    #[cfg(unix)]
    #[test]
    fn test_place_non_utf8_name() {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let name = OsStr::from_bytes(b"caf\xe9.txt");
        let category_dir = temp_dir.path().join("Text");
        FileMover::create_category_dir(&category_dir).unwrap();

        let mut placed = Vec::new();
        for sub in ["a", "b"] {
            let dir = temp_dir.path().join(sub);
            fs::create_dir(&dir).unwrap();
            let source = dir.join(name);
            fs::write(&source, sub).unwrap();
            placed.push(FileMover::place(&category_dir, &source, false).unwrap());
        }

        assert_eq!(placed[0], category_dir.join(name));
        assert_eq!(
            placed[1],
            category_dir.join(OsStr::from_bytes(b"caf\xe9 (1).txt"))
        );
    }
}
