//! Error types shared by every phase of a run.
//!
//! Nothing in the engine recovers locally: each variant propagates to the
//! orchestrator and ends the run. Mutations applied before the failure stay
//! applied.

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::tree_scanner::TreePath;

/// Errors that can occur while planning or applying an organization run.
#[derive(thiserror::Error, Debug)]
pub enum OrganizeError {
    /// Walking a directory failed (permission denied, vanished entry, ...).
    #[error("Failed to scan {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Reading the metadata of a scanned entry failed.
    #[error("Failed to read metadata of {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Opening or reading a file during duplicate detection failed.
    #[error("Failed to hash {}: {source}", .path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No free numbered variant of a destination was found.
    #[error("Unable to allocate a free name for {path} after {attempts} attempts")]
    NameExhausted { path: TreePath, attempts: usize },

    /// A calendar month outside 1..=12.
    #[error("Invalid month index {0}")]
    InvalidMonth(u32),

    /// Failed to create the parent directories of a destination.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move a file to its destination.
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove a duplicate file or an empty directory.
    #[error("Failed to remove {}: {source}", .path.display())]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory to organize is missing or not a directory.
    #[error("Invalid base path {}: {source}", .path.display())]
    InvalidBasePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The running executable could not be identified.
    #[error("Failed to stat self ({}): {source}", .path.display())]
    SelfIdentity {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;
