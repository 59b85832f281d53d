//! Run orchestration for mediasift.
//!
//! This module ties the pieces together:
//! - Building the category table from defaults, config file and command-line budgets
//! - Running the selector for every category
//! - Running the mover for every category, after all selections are written
//! - Reporting per-category results

use crate::config::{CompiledFilters, ConfigError, SiftConfig, parse_size_limit};
use crate::file_category::{Category, CategoryRule, CategoryTable};
use crate::file_organizer::{FileOrganizer, OrganizeError, RelocationReport};
use crate::output::{OutputFormatter, SummaryRow};
use crate::selector::{SelectError, SelectionReport, Selector};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that stop a run before any category is processed.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file or a command-line size limit is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Represents what a run should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiftCommand {
    /// Write the selection lists only.
    Select,
    /// Write the selection lists, then move the listed files.
    Organize {
        /// If true, report the moves without performing them.
        dry_run: bool,
    },
}

/// Inputs for a run, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// The directory to scan.
    pub folder: PathBuf,
    /// Image and video budgets, e.g. `("15G", "20G")`.
    pub size_limits: Option<(String, String)>,
    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
    /// Directory for the selection lists, overriding the configuration.
    pub out_dir: Option<PathBuf>,
}

/// Everything needed to run, resolved before any directory is touched.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub folder: PathBuf,
    pub out_dir: PathBuf,
    pub table: CategoryTable,
    pub filters: CompiledFilters,
}

impl RunPlan {
    /// Resolves configuration for a run.
    ///
    /// Budgets given on the command line take precedence over the
    /// configuration file, which takes precedence over the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration file is invalid or a size
    /// limit cannot be parsed.
    pub fn resolve(options: &RunOptions) -> Result<Self, ConfigError> {
        let config = SiftConfig::load(options.config_path.as_deref())?;
        Self::from_config(&config, options)
    }

    /// Resolves a run against an already loaded configuration.
    pub fn from_config(config: &SiftConfig, options: &RunOptions) -> Result<Self, ConfigError> {
        let mut table = config.category_table()?;

        if let Some((image_limit, video_limit)) = &options.size_limits {
            table.set_budget(Category::Image, parse_size_limit(image_limit)?);
            table.set_budget(Category::Video, parse_size_limit(video_limit)?);
        }

        Ok(Self {
            folder: options.folder.clone(),
            out_dir: options
                .out_dir
                .clone()
                .unwrap_or_else(|| config.output_dir()),
            table,
            filters: config.compile_filters()?,
        })
    }

    /// Path of the selection list for a rule.
    pub fn list_path(&self, rule: &CategoryRule) -> PathBuf {
        self.out_dir.join(&rule.list_file)
    }
}

/// What happened to one category during a run.
#[derive(Debug)]
pub struct CategoryOutcome {
    pub rule: CategoryRule,
    pub list_path: PathBuf,
    pub selection: Result<SelectionReport, SelectError>,
    /// `None` when the move phase was not run for this category.
    pub relocation: Option<Result<RelocationReport, OrganizeError>>,
}

impl CategoryOutcome {
    fn summary_row(&self) -> SummaryRow {
        let (selected, bytes) = match &self.selection {
            Ok(report) => (Some(report.selected.len()), report.total_bytes),
            Err(_) => (None, 0),
        };
        let (moved, failed) = match &self.relocation {
            Some(Ok(report)) if report.dry_run => (None, report.failures.len()),
            Some(Ok(report)) => (Some(report.moved_count()), report.failures.len()),
            Some(Err(_)) => (None, 1),
            None => (None, 0),
        };

        SummaryRow {
            label: self.rule.category.label().to_string(),
            selected,
            bytes,
            budget: self.rule.budget,
            moved,
            failed,
        }
    }
}

/// Results of a complete run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<CategoryOutcome>,
}

impl RunSummary {
    /// Returns the outcome for a category.
    pub fn outcome(&self, category: Category) -> Option<&CategoryOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.rule.category == category)
    }

    /// Total number of files moved across all categories.
    pub fn moved_total(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.relocation {
                Some(Ok(report)) => Some(report.moved_count()),
                _ => None,
            })
            .sum()
    }

    /// Returns true if any selection, list or per-file move failed.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|outcome| {
            outcome.selection.is_err()
                || match &outcome.relocation {
                    Some(Ok(report)) => !report.is_complete_success(),
                    Some(Err(_)) => true,
                    None => false,
                }
        })
    }
}

/// Runs mediasift with the given command and options.
///
/// Configuration is resolved first; any `CliError` is returned
/// before the scanned directory is read. Failures while selecting or moving a
/// category are reported and recorded in the summary but do not stop the
/// other category.
///
/// # Examples
///
/// ```no_run
/// use mediasift::cli::{run_cli, RunOptions, SiftCommand};
/// use std::path::PathBuf;
///
/// let options = RunOptions {
///     folder: PathBuf::from("/path/to/media"),
///     size_limits: Some(("2G".to_string(), "8G".to_string())),
///     ..Default::default()
/// };
/// match run_cli(SiftCommand::Organize { dry_run: false }, &options) {
///     Ok(summary) => println!("Moved {} files", summary.moved_total()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(command: SiftCommand, options: &RunOptions) -> Result<RunSummary, CliError> {
    let plan = RunPlan::resolve(options)?;
    Ok(run_plan(command, &plan))
}

/// Runs an already resolved plan.
pub fn run_plan(command: SiftCommand, plan: &RunPlan) -> RunSummary {
    OutputFormatter::info(&format!("Processing contents of: {}", plan.folder.display()));

    if let Err(e) = fs::create_dir_all(&plan.out_dir) {
        OutputFormatter::warning(&format!(
            "Could not create output directory {}: {}",
            plan.out_dir.display(),
            e
        ));
    }

    let mut summary = RunSummary {
        outcomes: plan
            .table
            .iter()
            .map(|rule| select_category(plan, rule))
            .collect(),
    };

    match command {
        SiftCommand::Select => {}
        SiftCommand::Organize { dry_run } => {
            for outcome in &mut summary.outcomes {
                if outcome.selection.is_err() {
                    OutputFormatter::warning(&format!(
                        "Skipping {} move: selection did not complete",
                        outcome.rule.category
                    ));
                    continue;
                }
                outcome.relocation = Some(relocate_category(&plan.folder, outcome, dry_run));
            }
        }
    }

    OutputFormatter::summary_table(
        &summary
            .outcomes
            .iter()
            .map(CategoryOutcome::summary_row)
            .collect::<Vec<_>>(),
    );

    finish_message(command, plan, &summary);
    summary
}

fn select_category(plan: &RunPlan, rule: &CategoryRule) -> CategoryOutcome {
    let list_path = plan.list_path(rule);
    let selection = Selector::select(&plan.folder, rule, &list_path, &plan.filters);

    match &selection {
        Ok(report) => {
            OutputFormatter::success(&format!(
                "Selected {} {} file(s) into {}",
                report.selected.len(),
                rule.category,
                list_path.display()
            ));
            if report.over_budget > 0 {
                OutputFormatter::plain(&format!(
                    "   {} matching file(s) left out to stay within budget",
                    report.over_budget
                ));
            }
            for path in &report.unlistable {
                OutputFormatter::warning(&format!(
                    "Left out {}: name cannot be written to a list",
                    path.display()
                ));
            }
        }
        Err(e) => OutputFormatter::error(&format!("{} selection failed: {}", rule.category, e)),
    }

    CategoryOutcome {
        rule: rule.clone(),
        list_path,
        selection,
        relocation: None,
    }
}

fn relocate_category(
    folder: &Path,
    outcome: &CategoryOutcome,
    dry_run: bool,
) -> Result<RelocationReport, OrganizeError> {
    let rule = &outcome.rule;
    info!("Relocating {} files into {}", rule.category, rule.folder);

    let result = if dry_run {
        FileOrganizer::plan(folder, &outcome.list_path, &rule.folder)
    } else {
        FileOrganizer::relocate(folder, &outcome.list_path, &rule.folder)
    };

    match &result {
        Ok(report) => {
            if dry_run {
                for operation in &report.planned {
                    OutputFormatter::dry_run_notice(&format!(
                        "Would move {} → {}/",
                        operation.original_path.display(),
                        operation.folder
                    ));
                }
            }
            for failure in &report.failures {
                OutputFormatter::error(&format!(
                    "{} line {}: {}",
                    outcome.list_path.display(),
                    failure.line,
                    failure.error
                ));
            }
            if !dry_run {
                OutputFormatter::success(&format!(
                    "Moved {} {} file(s) to {}/",
                    report.moved_count(),
                    rule.category,
                    rule.folder
                ));
            }
        }
        Err(e) => OutputFormatter::error(&format!("{} move failed: {}", rule.category, e)),
    }

    result
}

fn finish_message(command: SiftCommand, plan: &RunPlan, summary: &RunSummary) {
    println!();
    match command {
        SiftCommand::Select => OutputFormatter::plain(&format!(
            "Selection completed. Results saved in {}",
            plan.out_dir.display()
        )),
        SiftCommand::Organize { dry_run: true } => {
            OutputFormatter::plain(&format!(
                "✓ Dry run complete. Lists saved in {}; no files were moved.",
                plan.out_dir.display()
            ));
        }
        SiftCommand::Organize { dry_run: false } => OutputFormatter::plain(&format!(
            "Processing completed. Results saved in {}",
            plan.out_dir.display()
        )),
    }

    if summary.has_failures() {
        OutputFormatter::warning("Some files could not be processed. Please review errors above.");
    }
}
