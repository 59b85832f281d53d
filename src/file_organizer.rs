/// Relocation of selected files into category directories.
///
/// This module reads a selection list written by the selector and moves each
/// named file from the scanned directory into the category's subdirectory.
/// Every line is handled independently: a failure on one line is recorded and
/// the remaining lines are still processed.
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents a single file relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The path of the file before it was moved.
    pub original_path: PathBuf,
    /// The path of the file after it was moved.
    pub new_path: PathBuf,
    /// The name of the category directory the file was moved to.
    pub folder: String,
}

/// A list entry that could not be relocated.
#[derive(Debug)]
pub struct LineFailure {
    /// 1-based line number in the selection list.
    pub line: usize,
    /// The entry as written in the list.
    pub entry: String,
    /// Why the entry was not moved.
    pub error: OrganizeError,
}

/// Outcome of relocating one selection list.
#[derive(Debug, Default)]
pub struct RelocationReport {
    /// Files that were moved.
    pub moved: Vec<Operation>,
    /// Files a dry run would move. Always empty outside a dry run.
    pub planned: Vec<Operation>,
    /// Entries that could not be moved.
    pub failures: Vec<LineFailure>,
    /// Number of blank lines that were skipped.
    pub blank_lines: usize,
    /// True if no file was actually touched.
    pub dry_run: bool,
}

impl RelocationReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Returns the number of files moved.
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    /// Returns the number of files a dry run would move.
    pub fn planned_count(&self) -> usize {
        self.planned.len()
    }

    /// Returns true if every entry in the list was moved.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Errors that can occur while relocating files.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// Failed to create a category directory.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The selection list could not be opened or read.
    #[error("Failed to read selection list {}: {source}", path.display())]
    ListReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A list entry cannot be turned into a file name.
    #[error("Invalid list entry '{entry}': {reason}")]
    InvalidListEntry { entry: String, reason: String },
    /// The file named in the list is not in the source directory.
    #[error("Source file not found: {}", path.display())]
    SourceMissing { path: PathBuf },
    /// A file with the same name is already in the category directory.
    #[error("Destination already exists: {}", path.display())]
    DestinationExists { path: PathBuf },
    /// Failed to move a file to its category directory.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for file relocation operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Moves listed files into category subdirectories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves every file named in `list_path` from `source_dir` into `source_dir/folder`.
    ///
    /// The category directory is created if it does not exist. Blank lines are
    /// skipped. Per-line failures (missing source, existing destination, rename
    /// errors) are collected in the report and do not stop processing.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - The directory the list was produced from
    /// * `list_path` - The selection list to read
    /// * `folder` - Name of the category subdirectory to move files into
    ///
    /// # Returns
    ///
    /// A `RelocationReport` on completion, or an `OrganizeError` if the list
    /// cannot be read or the category directory cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mediasift::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let report = FileOrganizer::relocate(
    ///     Path::new("/path/to/media"),
    ///     Path::new("out/imageNames.txt"),
    ///     "images",
    /// );
    ///
    /// match report {
    ///     Ok(report) => println!("Moved {} files", report.moved_count()),
    ///     Err(e) => eprintln!("Relocation failed: {}", e),
    /// }
    /// ```
    pub fn relocate(
        source_dir: &Path,
        list_path: &Path,
        folder: &str,
    ) -> OrganizeResult<RelocationReport> {
        Self::process_list(source_dir, list_path, folder, false)
    }

    /// Reports what `relocate` would do without creating or moving anything.
    pub fn plan(source_dir: &Path, list_path: &Path, folder: &str) -> OrganizeResult<RelocationReport> {
        Self::process_list(source_dir, list_path, folder, true)
    }

    /// Creates `source_dir/folder` if needed and returns its path.
    ///
    /// Calling this when the directory already exists is not an error.
    pub fn ensure_category_dir(source_dir: &Path, folder: &str) -> OrganizeResult<PathBuf> {
        let category_path = source_dir.join(folder);

        match fs::create_dir(&category_path) {
            Ok(()) => {
                debug!("Created {}", category_path.display());
                Ok(category_path)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && category_path.is_dir() => {
                Ok(category_path)
            }
            Err(e) => Err(OrganizeError::DirectoryCreationFailed {
                path: category_path,
                source: e,
            }),
        }
    }

    /// Moves a single list entry into the category directory.
    ///
    /// The source is `source_dir/entry`; the destination keeps only the final
    /// component of `entry`. A destination that exists when the entry is
    /// checked is never overwritten. `fs::rename` itself replaces, so a file
    /// created at the destination by another process between the check and
    /// the rename is not detected; the directory is assumed to have no other
    /// writer while a run is in progress.
    pub fn move_listed_file(
        source_dir: &Path,
        category_path: &Path,
        entry: &str,
    ) -> OrganizeResult<Operation> {
        let (original_path, new_path) = Self::resolve_entry(source_dir, category_path, entry)?;
        Self::check_movable(&original_path, &new_path)?;

        // Not atomic with the check above.
        fs::rename(&original_path, &new_path).map_err(|e| OrganizeError::FileMoveFailure {
            from: original_path.clone(),
            to: new_path.clone(),
            source: e,
        })?;

        Ok(Operation {
            original_path,
            new_path,
            folder: Self::folder_name(category_path),
        })
    }

    fn process_list(
        source_dir: &Path,
        list_path: &Path,
        folder: &str,
        dry_run: bool,
    ) -> OrganizeResult<RelocationReport> {
        let list_error = |source| OrganizeError::ListReadFailed {
            path: list_path.to_path_buf(),
            source,
        };

        let reader = BufReader::new(File::open(list_path).map_err(list_error)?);

        let category_path = if dry_run {
            source_dir.join(folder)
        } else {
            Self::ensure_category_dir(source_dir, folder)?
        };

        info!(
            "{} files listed in {} into {}",
            if dry_run { "Planning" } else { "Moving" },
            list_path.display(),
            category_path.display()
        );

        let mut report = RelocationReport::new(dry_run);

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let entry = match line {
                Ok(entry) => entry,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Line {} of {} is not valid UTF-8", line_number, list_path.display());
                    report.failures.push(LineFailure {
                        line: line_number,
                        entry: String::new(),
                        error: OrganizeError::InvalidListEntry {
                            entry: String::new(),
                            reason: "line is not valid UTF-8".to_string(),
                        },
                    });
                    continue;
                }
                Err(e) => return Err(list_error(e)),
            };

            if entry.is_empty() {
                report.blank_lines += 1;
                continue;
            }

            let result = if dry_run {
                Self::plan_entry(source_dir, &category_path, &entry)
            } else {
                Self::move_listed_file(source_dir, &category_path, &entry)
            };

            match result {
                Ok(operation) => {
                    debug!(
                        "{} -> {}",
                        operation.original_path.display(),
                        operation.new_path.display()
                    );
                    if dry_run {
                        report.planned.push(operation);
                    } else {
                        report.moved.push(operation);
                    }
                }
                Err(error) => {
                    warn!("Line {}: {}", line_number, error);
                    report.failures.push(LineFailure {
                        line: line_number,
                        entry,
                        error,
                    });
                }
            }
        }

        Ok(report)
    }

    fn plan_entry(source_dir: &Path, category_path: &Path, entry: &str) -> OrganizeResult<Operation> {
        let (original_path, new_path) = Self::resolve_entry(source_dir, category_path, entry)?;
        Self::check_movable(&original_path, &new_path)?;

        Ok(Operation {
            original_path,
            new_path,
            folder: Self::folder_name(category_path),
        })
    }

    /// Builds the source and destination paths for a list entry.
    fn resolve_entry(
        source_dir: &Path,
        category_path: &Path,
        entry: &str,
    ) -> OrganizeResult<(PathBuf, PathBuf)> {
        let invalid = |reason: &str| OrganizeError::InvalidListEntry {
            entry: entry.to_string(),
            reason: reason.to_string(),
        };

        let entry_path = Path::new(entry);
        if entry_path.has_root() {
            return Err(invalid("absolute paths are not allowed"));
        }
        let file_name = entry_path
            .file_name()
            .ok_or_else(|| invalid("entry has no file name component"))?;

        Ok((source_dir.join(entry_path), category_path.join(file_name)))
    }

    fn check_movable(original_path: &Path, new_path: &Path) -> OrganizeResult<()> {
        if let Err(e) = fs::symlink_metadata(original_path) {
            return Err(if e.kind() == ErrorKind::NotFound {
                OrganizeError::SourceMissing {
                    path: original_path.to_path_buf(),
                }
            } else {
                OrganizeError::FileMoveFailure {
                    from: original_path.to_path_buf(),
                    to: new_path.to_path_buf(),
                    source: e,
                }
            });
        }

        if fs::symlink_metadata(new_path).is_ok() {
            return Err(OrganizeError::DestinationExists {
                path: new_path.to_path_buf(),
            });
        }

        Ok(())
    }

    fn folder_name(category_path: &Path) -> String {
        category_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_list(dir: &TempDir, contents: &str) -> PathBuf {
        let list_path = dir.path().join("list.txt");
        fs::write(&list_path, contents).expect("Failed to write list file");
        list_path
    }

    #[test]
    fn test_ensure_category_dir_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let first = FileOrganizer::ensure_category_dir(temp_dir.path(), "images")
            .expect("First create failed");
        let second = FileOrganizer::ensure_category_dir(temp_dir.path(), "images")
            .expect("Second create failed");

        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[test]
    fn test_ensure_category_dir_fails_when_file_in_the_way() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("images"), "not a dir").unwrap();

        let result = FileOrganizer::ensure_category_dir(temp_dir.path(), "images");
        assert!(matches!(
            result,
            Err(OrganizeError::DirectoryCreationFailed { .. })
        ));
    }

    #[test]
    fn test_relocate_moves_listed_files() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let lists = TempDir::new().expect("Failed to create temp directory");
        fs::write(source.path().join("a.jpg"), "a").unwrap();
        fs::write(source.path().join("b.png"), "b").unwrap();
        fs::write(source.path().join("c.gif"), "c").unwrap();
        let list_path = write_list(&lists, "a.jpg\nb.png\n");

        let report =
            FileOrganizer::relocate(source.path(), &list_path, "images").expect("Relocate failed");

        assert_eq!(report.moved_count(), 2);
        assert!(report.is_complete_success());
        assert!(source.path().join("images/a.jpg").exists());
        assert!(source.path().join("images/b.png").exists());
        assert!(!source.path().join("a.jpg").exists());
        assert!(source.path().join("c.gif").exists());
    }

    #[test]
    fn test_relocate_skips_blank_lines_and_crlf() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let lists = TempDir::new().expect("Failed to create temp directory");
        fs::write(source.path().join("a.mp4"), "a").unwrap();
        let list_path = write_list(&lists, "\na.mp4\r\n\n");

        let report =
            FileOrganizer::relocate(source.path(), &list_path, "videos").expect("Relocate failed");

        assert_eq!(report.moved_count(), 1);
        assert_eq!(report.blank_lines, 2);
        assert!(source.path().join("videos/a.mp4").exists());
    }

    #[test]
    fn test_relocate_continues_after_missing_file() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let lists = TempDir::new().expect("Failed to create temp directory");
        fs::write(source.path().join("present.jpg"), "x").unwrap();
        let list_path = write_list(&lists, "gone.jpg\npresent.jpg\n");

        let report =
            FileOrganizer::relocate(source.path(), &list_path, "images").expect("Relocate failed");

        assert_eq!(report.moved_count(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].line, 1);
        assert!(matches!(
            report.failures[0].error,
            OrganizeError::SourceMissing { .. }
        ));
        assert!(source.path().join("images/present.jpg").exists());
    }

    #[test]
    fn test_relocate_refuses_to_overwrite() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let lists = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(source.path().join("images")).unwrap();
        fs::write(source.path().join("images/a.jpg"), "old").unwrap();
        fs::write(source.path().join("a.jpg"), "new").unwrap();
        let list_path = write_list(&lists, "a.jpg\n");

        let report =
            FileOrganizer::relocate(source.path(), &list_path, "images").expect("Relocate failed");

        assert_eq!(report.moved_count(), 0);
        assert!(matches!(
            report.failures[0].error,
            OrganizeError::DestinationExists { .. }
        ));
        assert_eq!(
            fs::read_to_string(source.path().join("images/a.jpg")).unwrap(),
            "old"
        );
        assert!(source.path().join("a.jpg").exists());
    }

    #[test]
    fn test_relocate_uses_base_name_for_destination() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let lists = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(source.path().join("nested")).unwrap();
        fs::write(source.path().join("nested/deep.png"), "x").unwrap();
        let list_path = write_list(&lists, "nested/deep.png\n");

        let report =
            FileOrganizer::relocate(source.path(), &list_path, "images").expect("Relocate failed");

        assert_eq!(report.moved_count(), 1);
        assert!(source.path().join("images/deep.png").exists());
    }

    #[test]
    fn test_relocate_rejects_absolute_entries() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let lists = TempDir::new().expect("Failed to create temp directory");
        let outside = lists.path().join("outside.jpg");
        fs::write(&outside, "x").unwrap();
        let list_path = write_list(&lists, &format!("{}\n..\n", outside.display()));

        let report =
            FileOrganizer::relocate(source.path(), &list_path, "images").expect("Relocate failed");

        assert_eq!(report.moved_count(), 0);
        assert_eq!(report.failures.len(), 2);
        assert!(outside.exists());
    }

    #[test]
    fn test_relocate_twice_only_fails_per_line() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let lists = TempDir::new().expect("Failed to create temp directory");
        fs::write(source.path().join("a.avi"), "x").unwrap();
        let list_path = write_list(&lists, "a.avi\n");

        FileOrganizer::relocate(source.path(), &list_path, "videos").expect("First run failed");
        let report =
            FileOrganizer::relocate(source.path(), &list_path, "videos").expect("Second run failed");

        assert_eq!(report.moved_count(), 0);
        assert_eq!(report.failures.len(), 1);
        assert!(source.path().join("videos/a.avi").exists());
    }

    #[test]
    fn test_relocate_skips_lines_that_are_not_utf8() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let lists = TempDir::new().expect("Failed to create temp directory");
        fs::write(source.path().join("a.jpg"), "x").unwrap();
        fs::write(source.path().join("b.jpg"), "y").unwrap();
        let list_path = lists.path().join("list.txt");
        fs::write(&list_path, b"a.jpg\n\xff.jpg\nb.jpg\n").unwrap();

        let report =
            FileOrganizer::relocate(source.path(), &list_path, "images").expect("Relocate failed");

        assert_eq!(report.moved_count(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].line, 2);
        assert!(matches!(
            report.failures[0].error,
            OrganizeError::InvalidListEntry { .. }
        ));
        assert!(source.path().join("images/a.jpg").exists());
        assert!(source.path().join("images/b.jpg").exists());
    }

    #[test]
    fn test_relocate_missing_list() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let result = FileOrganizer::relocate(
            source.path(),
            &source.path().join("missing.txt"),
            "images",
        );

        assert!(matches!(result, Err(OrganizeError::ListReadFailed { .. })));
        assert!(!source.path().join("images").exists());
    }

    #[test]
    fn test_plan_does_not_touch_filesystem() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let lists = TempDir::new().expect("Failed to create temp directory");
        fs::write(source.path().join("a.jpg"), "x").unwrap();
        let list_path = write_list(&lists, "a.jpg\nmissing.jpg\n");

        let report = FileOrganizer::plan(source.path(), &list_path, "images").expect("Plan failed");

        assert!(report.dry_run);
        assert_eq!(report.moved_count(), 0);
        assert_eq!(report.planned_count(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(source.path().join("a.jpg").exists());
        assert!(!source.path().join("images").exists());
    }
}
