/// Budgeted selection of files for a category.
///
/// The selector walks the immediate entries of a directory in the order the
/// filesystem returns them, keeps regular files whose name matches the
/// category, and accepts each one only while the running total stays within the
/// category's budget. Accepted names are written one per line to a list file.
use crate::config::CompiledFilters;
use crate::file_category::CategoryRule;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort the selection of a single category.
#[derive(Debug, Error)]
pub enum SelectError {
    /// The directory to scan could not be opened.
    #[error("Failed to open directory {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The list file could not be created or written.
    #[error("Failed to write list file {}: {source}", path.display())]
    ListWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for selection operations.
pub type SelectResult<T> = Result<T, SelectError>;

/// Outcome of selecting files for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionReport {
    /// Accepted file names, in the order they were encountered.
    pub selected: Vec<String>,
    /// Sum of the sizes of the accepted files.
    pub total_bytes: u64,
    /// Matching files that were skipped because they did not fit the budget.
    pub over_budget: usize,
    /// Matching files skipped because their name cannot be stored in a list.
    pub unlistable: Vec<PathBuf>,
}

/// Tracks the bytes accepted so far against a budget.
#[derive(Debug, Clone, Copy)]
struct Budget {
    limit: u64,
    used: u64,
}

impl Budget {
    fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Accepts `size` if it fits in what remains; an exact fit is accepted.
    fn try_take(&mut self, size: u64) -> bool {
        match self.used.checked_add(size) {
            Some(total) if total <= self.limit => {
                self.used = total;
                true
            }
            _ => false,
        }
    }
}

/// Selects files for a category and writes them to a list file.
pub struct Selector;

impl Selector {
    /// Scans `source_dir` and writes the names selected for `rule` to `list_path`.
    ///
    /// The list file is truncated before scanning begins and is flushed and
    /// closed before this function returns. Entries that cannot be stat'ed or
    /// are not regular files (after following symlinks) are skipped. Selection
    /// is a single pass: a file that does not fit the remaining budget is never
    /// reconsidered, even if later files are smaller.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - The directory whose immediate entries are scanned
    /// * `rule` - The category's extensions and budget
    /// * `list_path` - Where the selected names are written
    /// * `filters` - Exclusion patterns applied before matching
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mediasift::config::CompiledFilters;
    /// use mediasift::file_category::{Category, CategoryRule};
    /// use mediasift::selector::Selector;
    /// use std::path::Path;
    ///
    /// let rule = CategoryRule::defaults_for(Category::Image);
    /// let report = Selector::select(
    ///     Path::new("/path/to/media"),
    ///     &rule,
    ///     Path::new("out/imageNames.txt"),
    ///     &CompiledFilters::default(),
    /// )
    /// .unwrap();
    /// println!("Selected {} images", report.selected.len());
    /// ```
    pub fn select(
        source_dir: &Path,
        rule: &CategoryRule,
        list_path: &Path,
        filters: &CompiledFilters,
    ) -> SelectResult<SelectionReport> {
        let list_error = |source| SelectError::ListWriteFailed {
            path: list_path.to_path_buf(),
            source,
        };

        let file = File::create(list_path).map_err(list_error)?;
        let mut writer = BufWriter::new(file);

        let entries = fs::read_dir(source_dir).map_err(|e| SelectError::SourceUnreadable {
            path: source_dir.to_path_buf(),
            source: e,
        })?;

        info!(
            "Selecting {} files from {} (budget {} bytes)",
            rule.category,
            source_dir.display(),
            rule.budget
        );

        let mut report = SelectionReport::default();
        let mut budget = Budget::new(rule.budget);

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry in {}: {}", source_dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();

            // fs::metadata follows symlinks, so a link to a regular file counts.
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                if rule.matches(&file_name.to_string_lossy()) {
                    warn!("Skipping {}: name is not valid UTF-8", path.display());
                    report.unlistable.push(path);
                }
                continue;
            };

            if filters.is_excluded(name) || !rule.matches(name) {
                continue;
            }

            if name.contains(['\n', '\r']) {
                warn!("Skipping {}: name contains a line break", path.display());
                report.unlistable.push(path);
                continue;
            }

            let size = metadata.len();
            if budget.try_take(size) {
                debug!("Selected {} ({} bytes)", name, size);
                writeln!(writer, "{}", name).map_err(list_error)?;
                report.selected.push(name.to_string());
            } else {
                debug!("Over budget, skipping {} ({} bytes)", name, size);
                report.over_budget += 1;
            }
        }

        writer.flush().map_err(list_error)?;
        report.total_bytes = budget.used;

        info!(
            "Selected {} {} files, {} bytes",
            report.selected.len(),
            rule.category,
            report.total_bytes
        );

        Ok(report)
    }
}
