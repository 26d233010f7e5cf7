//! sortera - sort files into year/month directories
//!
//! This library computes, from a scan of a directory tree, the operations
//! needed to bring it into its organized state: removing byte-identical
//! duplicates, moving every file to `./<year>/<month>/<name>` by its
//! timestamp, and pruning directories left empty. The same planning runs in
//! live and dry-run mode; only [`file_organizer::FileOrganizer`] mutates.

pub mod cli;
pub mod config;
pub mod destination;
pub mod duplicates;
pub mod empty_dirs;
pub mod error;
pub mod file_organizer;
pub mod logging;
pub mod misplaced;
pub mod output;
pub mod tree_scanner;
pub mod unique_name;

pub use config::{CompiledFilters, ConfigError, SorteraConfig};
pub use error::{OrganizeError, OrganizeResult};
pub use file_organizer::{FileOrganizer, PlannedMove};
pub use tree_scanner::{FileIdentity, TreeEntry, TreePath, TreeScanner};

pub use cli::{Cli, RunOptions, RunSummary, organize, run_cli};
