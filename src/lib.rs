//! mediasift - budgeted media selection and relocation
//!
//! This library scans a directory for image and video files by name, selects
//! files per category until a byte budget would be exceeded, writes the
//! selections to list files and moves the listed files into per-category
//! subdirectories.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod selector;

pub use config::{ConfigError, SiftConfig, parse_size_limit};
pub use file_category::{Category, CategoryRule, CategoryTable};
pub use file_organizer::{FileOrganizer, OrganizeError, RelocationReport};
pub use selector::{SelectError, SelectionReport, Selector};

pub use cli::{CliError, RunOptions, RunSummary, SiftCommand, run_cli};
