//! Output formatting and styling module.
//!
//! Everything the user sees on the terminal goes through here: one line per
//! planned or performed action, progress bars for the apply phases and the
//! closing summary.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::RunSummary;
use crate::tree_scanner::TreePath;

/// One filesystem operation of a run.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    RemoveDuplicate {
        path: &'a TreePath,
        original: &'a TreePath,
    },
    Move {
        source: &'a TreePath,
        destination: &'a TreePath,
    },
    RemoveEmptyDir {
        path: &'a TreePath,
    },
}

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Formats a single action line.
    ///
    /// ```
    /// use sortera::output::{Action, OutputFormatter};
    /// use sortera::tree_scanner::TreePath;
    ///
    /// colored::control::set_override(false);
    /// let path = TreePath::new("empty");
    /// let line = OutputFormatter::action_line(&Action::RemoveEmptyDir { path: &path }, true);
    /// assert_eq!(line, "[DRY RUN] remove ./empty (empty)");
    /// ```
    pub fn action_line(action: &Action, dry_run: bool) -> String {
        let line = match action {
            Action::RemoveDuplicate { path, original } => {
                format!("{} {} (identical to {})", "remove".red(), path, original)
            }
            Action::Move {
                source,
                destination,
            } => format!("{} {} to {}", "move".green(), source, destination.to_string().bold()),
            Action::RemoveEmptyDir { path } => format!("{} {} (empty)", "remove".red(), path),
        };

        if dry_run {
            format!("{} {}", "[DRY RUN]".yellow(), line)
        } else {
            line
        }
    }

    /// Prints an action line above `pb`, or plainly when the bar is not drawn
    /// (for example when stderr is not a terminal).
    pub fn report_action(pb: &ProgressBar, action: &Action, dry_run: bool) {
        let line = Self::action_line(action, dry_run);
        if pb.is_hidden() {
            println!("{}", line);
        } else {
            pb.println(line);
        }
    }

    /// Creates a progress bar for an apply phase; hidden when `visible` is
    /// false.
    pub fn create_progress_bar(total: u64, visible: bool) -> ProgressBar {
        if !visible {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a table of operation counts for a finished run.
    pub fn summary_table(summary: &RunSummary) {
        Self::header(if summary.dry_run {
            "DRY RUN SUMMARY"
        } else {
            "SUMMARY"
        });

        let rows = [
            ("Duplicates removed", summary.duplicates.len()),
            ("Files moved", summary.moves.len()),
            ("Empty directories removed", summary.empty_dirs.len()),
        ];
        let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

        println!("{}", "-".repeat(width + 10));
        for (label, count) in rows {
            println!(
                "{:<width$} | {}",
                label,
                count.to_string().green(),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));

        if summary.dry_run {
            println!("{}", "No files were modified.".yellow());
        }
    }
}
