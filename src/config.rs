//! Configuration loading and size limit parsing.
//!
//! Configuration is optional. When present it is stored in TOML format and can
//! override the built-in category table and exclude files from selection:
//!
//! ```toml
//! output_dir = "out"
//!
//! [categories.image]
//! extensions = [".jpg", ".jpeg", ".png"]
//! budget = "15G"
//! folder = "images"
//! list_file = "imageNames.txt"
//!
//! [categories.video]
//! budget = "20G"
//!
//! [filters]
//! exclude = ["*.part", "Thumbs.db"]
//! ```
//!
//! Budgets use the same `<integer><unit>` notation as the command line, where
//! the unit is one of `K`, `M` or `G` (either case) in multiples of 1024.

use crate::file_category::{Category, CategoryTable};
use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".mediasiftrc.toml";

/// Default directory the selection lists are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "out";

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Errors that can occur while building the run configuration.
///
/// All of these are fatal and are reported before any directory is scanned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
    /// A size limit could not be parsed.
    #[error("Invalid size limit '{value}': {reason}")]
    InvalidSizeLimit {
        /// The text that was given.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Invalid glob pattern in the exclude filters.
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidGlobPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// A folder or list file name is not a plain file name.
    #[error("Invalid {field} '{value}': must be a single path component")]
    InvalidName {
        /// Which setting held the name.
        field: String,
        /// The rejected name.
        value: String,
    },
}

/// Parses a size limit such as `15G` or `512m` into bytes.
///
/// The magnitude must be a non-negative integer and the unit one of `K`, `M`
/// or `G` (either case), interpreted as binary multiples. Surrounding
/// whitespace is ignored.
///
/// # Examples
///
/// ```
/// use mediasift::config::parse_size_limit;
///
/// assert_eq!(parse_size_limit("2K").unwrap(), 2048);
/// assert_eq!(parse_size_limit("1g").unwrap(), 1024 * 1024 * 1024);
/// assert!(parse_size_limit("15").is_err());
/// assert!(parse_size_limit("15T").is_err());
/// ```
pub fn parse_size_limit(spec: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidSizeLimit {
        value: spec.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = spec.trim();
    let unit = trimmed.chars().last().ok_or_else(|| invalid("empty value"))?;

    let multiplier = match unit {
        'K' | 'k' => KIB,
        'M' | 'm' => MIB,
        'G' | 'g' => GIB,
        _ => return Err(invalid("unit must be one of K, M or G")),
    };

    let magnitude = &trimmed[..trimmed.len() - unit.len_utf8()];
    if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("magnitude must be a non-negative integer"));
    }

    let value: u64 = magnitude
        .parse()
        .map_err(|_| invalid("magnitude is too large"))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("size does not fit in 64 bits"))
}

/// Formats a byte count for display, using the largest binary unit that keeps
/// the value at or above one.
///
/// ```
/// use mediasift::config::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.5 KiB");
/// assert_eq!(format_size(15 * 1024 * 1024 * 1024), "15.0 GiB");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Run configuration as read from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiftConfig {
    /// Directory the selection lists are written to.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Per-category overrides.
    #[serde(default)]
    pub categories: CategoryOverrides,

    /// Rules for excluding files from selection.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Overrides keyed by category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryOverrides {
    #[serde(default)]
    pub image: Option<CategoryOverride>,
    #[serde(default)]
    pub video: Option<CategoryOverride>,
}

impl CategoryOverrides {
    fn get(&self, category: Category) -> Option<&CategoryOverride> {
        match category {
            Category::Image => self.image.as_ref(),
            Category::Video => self.video.as_ref(),
        }
    }
}

/// Optional replacements for one category's built-in rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryOverride {
    /// Extension patterns, replacing the built-in list.
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    /// Budget as a size limit string, e.g. `"15G"`.
    #[serde(default)]
    pub budget: Option<String>,
    /// Destination subdirectory name.
    #[serde(default)]
    pub folder: Option<String>,
    /// Selection list file name.
    #[serde(default)]
    pub list_file: Option<String>,
}

/// Rules for excluding files from selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterRules {
    /// Glob patterns matched against the file name.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl SiftConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.mediasiftrc.toml` in the current directory
    /// 3. Look for `~/.config/mediasift/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any file that is found fails to parse.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("mediasift")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Returns the configured output directory, or the default `out`.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Builds the category table from the built-in rules and this file's overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a budget cannot be parsed or a folder or list file
    /// name is not a plain file name.
    pub fn category_table(&self) -> Result<CategoryTable, ConfigError> {
        let mut table = CategoryTable::default();

        for category in Category::ALL {
            let Some(overrides) = self.categories.get(category) else {
                continue;
            };
            let Some(rule) = table.rule_mut(category) else {
                continue;
            };

            if let Some(extensions) = &overrides.extensions {
                rule.extensions = extensions.clone();
            }
            if let Some(budget) = &overrides.budget {
                rule.budget = parse_size_limit(budget)?;
            }
            if let Some(folder) = &overrides.folder {
                validate_plain_name(&format!("{} folder", category), folder)?;
                rule.folder = folder.clone();
            }
            if let Some(list_file) = &overrides.list_file {
                validate_plain_name(&format!("{} list_file", category), list_file)?;
                rule.list_file = list_file.clone();
            }
        }

        Ok(table)
    }

    /// Compile the exclude filters.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob pattern is invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Rejects names that would escape or alias the directory they are joined to.
fn validate_plain_name(field: &str, value: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::InvalidName {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Pre-compiled exclude patterns.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    exclude_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { exclude_patterns })
    }

    /// Returns true if a file with this name must never be selected.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
    }
}
