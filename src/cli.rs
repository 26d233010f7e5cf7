//! Command-line interface and run orchestration.
//!
//! A run has three strictly sequential phases:
//! 1. Duplicate removal (only with `--delete-duplicates`)
//! 2. Moving misplaced files into `<year>/<month>/`
//! 3. Removing directories left empty
//!
//! Each phase plans from a fresh scan and then applies. In live mode the
//! misplaced-file scan therefore no longer sees deleted duplicates; in a dry
//! run it still does.

use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::SorteraConfig;
use crate::duplicates::find_duplicates;
use crate::empty_dirs::collect_empty_directories;
use crate::error::{OrganizeError, OrganizeResult};
use crate::file_organizer::{FileOrganizer, PlannedMove, plan_moves};
use crate::misplaced::find_misplaced;
use crate::output::{Action, OutputFormatter};
use crate::tree_scanner::{FileIdentity, TreePath, TreeScanner};

/// Sort files into year/month directories, delete duplicates and prune
/// empty directories.
#[derive(Parser, Debug, Clone)]
#[command(name = "sortera", version, about)]
pub struct Cli {
    /// Directory to organize
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Only list what would happen, don't actually do it
    #[arg(long)]
    pub dry_run: bool,

    /// Find and delete all duplicate files (except the first one found)
    #[arg(long)]
    pub delete_duplicates: bool,

    /// Print debugging information
    #[arg(long)]
    pub debug: bool,

    /// Path to a configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the run summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Run-time switches for [`organize`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Plan and report, but perform no mutation.
    pub dry_run: bool,
    /// Run the duplicate-removal phase.
    pub delete_duplicates: bool,
    /// The running executable, never moved or deleted.
    pub this: Option<FileIdentity>,
    /// Print action lines and progress bars.
    pub report: bool,
}

/// A duplicate removed (or, in a dry run, to be removed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedDuplicate {
    pub path: TreePath,
    pub original: TreePath,
}

/// Everything a run did, or would do in a dry run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub duplicates: Vec<RemovedDuplicate>,
    pub moves: Vec<PlannedMove>,
    pub empty_dirs: Vec<TreePath>,
}

/// Runs the CLI: loads configuration, identifies the running executable and
/// organizes `cli.directory`.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use sortera::cli::{run_cli, Cli};
///
/// let cli = Cli::parse_from(["sortera", "--dry-run", "/path/to/photos"]);
/// match run_cli(&cli) {
///     Ok(summary) => println!("{} files would move", summary.moves.len()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> OrganizeResult<RunSummary> {
    let config = SorteraConfig::load(cli.config.as_deref(), &cli.directory)?;

    let exe = std::env::current_exe().map_err(|e| OrganizeError::SelfIdentity {
        path: PathBuf::from("<current executable>"),
        source: e,
    })?;
    let this = FileIdentity::of(&exe).map_err(|e| OrganizeError::SelfIdentity {
        path: exe.clone(),
        source: e,
    })?;

    let options = RunOptions {
        dry_run: cli.dry_run,
        delete_duplicates: cli.delete_duplicates,
        this: Some(this),
        report: !cli.json,
    };
    organize(&cli.directory, &options, &config)
}

/// Brings the tree under `root` into its organized state.
///
/// Stops at the first error; whatever was applied before it stays applied.
pub fn organize(
    root: &Path,
    options: &RunOptions,
    config: &SorteraConfig,
) -> OrganizeResult<RunSummary> {
    let organizer = FileOrganizer::new(root, options.dry_run)?;
    let filters = config.compile()?;
    let scanner = TreeScanner::new(root, &filters);
    let this = options.this.as_ref();

    info!(root = %root.display(), dry_run = options.dry_run, "Starting");
    if options.report {
        let mode = if options.dry_run { " (dry run)" } else { "" };
        OutputFormatter::info(&format!("Organizing {}{}", root.display(), mode));
    }

    let mut summary = RunSummary {
        dry_run: options.dry_run,
        ..Default::default()
    };

    if options.delete_duplicates {
        info!("Finding duplicates...");
        let duplicates = find_duplicates(&scanner, this)?;
        let pb = OutputFormatter::create_progress_bar(duplicates.len() as u64, options.report);
        for (path, original) in duplicates {
            if options.report {
                let action = Action::RemoveDuplicate {
                    path: &path,
                    original: &original,
                };
                OutputFormatter::report_action(&pb, &action, options.dry_run);
            }
            organizer.remove_file(&path)?;
            pb.inc(1);
            summary.duplicates.push(RemovedDuplicate { path, original });
        }
        pb.finish_and_clear();
    }

    info!("Finding misplaced files...");
    let misplaced = find_misplaced(&scanner, this)?;
    let planned = plan_moves(root, &misplaced, config.naming.max_attempts)?;
    let pb = OutputFormatter::create_progress_bar(planned.len() as u64, options.report);
    let applied = organizer.apply_moves(&planned, |m| {
        if options.report {
            let action = Action::Move {
                source: &m.source,
                destination: &m.destination,
            };
            OutputFormatter::report_action(&pb, &action, options.dry_run);
        }
        pb.inc(1);
    });
    pb.finish_and_clear();
    applied?;
    summary.moves = planned;

    info!("Finding empty directories...");
    let empty_dirs = collect_empty_directories(root)?;
    let pb = OutputFormatter::create_progress_bar(empty_dirs.len() as u64, options.report);
    for dir in &empty_dirs {
        if options.report {
            OutputFormatter::report_action(&pb, &Action::RemoveEmptyDir { path: dir }, options.dry_run);
        }
        organizer.remove_empty_dir(dir)?;
        pb.inc(1);
    }
    pb.finish_and_clear();
    summary.empty_dirs = empty_dirs;

    info!(
        duplicates = summary.duplicates.len(),
        moves = summary.moves.len(),
        empty_dirs = summary.empty_dirs.len(),
        "Done"
    );
    Ok(summary)
}
