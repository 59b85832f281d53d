//! Output formatting and styling module.
//!
//! Provides a centralized interface for all user-facing CLI output: colored
//! status lines and the summary table printed at the end of a run. Diagnostic
//! detail goes through the `log` macros instead.

use crate::config::format_size;
use colored::*;

/// One category's line in the final summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// Category label, e.g. "Images".
    pub label: String,
    /// Number of files selected, or `None` if selection failed.
    pub selected: Option<usize>,
    /// Bytes selected.
    pub bytes: u64,
    /// Configured budget in bytes.
    pub budget: u64,
    /// Number of files moved, or `None` if the move phase did not run or was a dry run.
    pub moved: Option<usize>,
    /// Number of list entries that could not be moved.
    pub failed: usize,
}

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediasift::output::OutputFormatter;
    /// OutputFormatter::success("Selection complete");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark to standard error.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol to standard error.
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints the per-category summary table.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediasift::output::{OutputFormatter, SummaryRow};
    ///
    /// OutputFormatter::summary_table(&[SummaryRow {
    ///     label: "Images".to_string(),
    ///     selected: Some(12),
    ///     bytes: 4096,
    ///     budget: 8192,
    ///     moved: Some(12),
    ///     failed: 0,
    /// }]);
    /// ```
    pub fn summary_table(rows: &[SummaryRow]) {
        Self::header("SUMMARY");

        let label_width = rows
            .iter()
            .map(|row| row.label.len())
            .max()
            .unwrap_or(0)
            .max(8); // At least "Category" width

        println!(
            "{:<width$} | {:>8} | {:>23} | {:>6} | {:>6}",
            "Category".bold(),
            "Selected".bold(),
            "Size / Budget".bold(),
            "Moved".bold(),
            "Failed".bold(),
            width = label_width
        );
        println!("{}", "-".repeat(label_width + 56));

        for row in rows {
            let selected = match row.selected {
                Some(count) => count.to_string().green(),
                None => "error".red(),
            };
            let moved = match row.moved {
                Some(count) => count.to_string().green(),
                None => "-".normal(),
            };
            let failed = if row.failed > 0 {
                row.failed.to_string().red()
            } else {
                row.failed.to_string().normal()
            };
            let usage = format!("{} / {}", format_size(row.bytes), format_size(row.budget));

            println!(
                "{:<width$} | {:>8} | {:>23} | {:>6} | {:>6}",
                row.label,
                selected,
                usage,
                moved,
                failed,
                width = label_width
            );
        }
    }
}
