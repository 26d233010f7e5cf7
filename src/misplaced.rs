//! Finds files that are not where their timestamp says they belong.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::destination::{canonical_path, classifying_instant};
use crate::error::{OrganizeError, OrganizeResult};
use crate::tree_scanner::{FileIdentity, TreePath, TreeScanner};

/// Current location to canonical location. Never maps a path to itself.
pub type MoveMap = BTreeMap<TreePath, TreePath>;

/// Maps every misplaced file to its canonical path.
///
/// Directories, excluded names and the running executable (`this`) are
/// skipped. Every other entry is a candidate, symlinks included: a link is
/// classified by its own timestamp and moved as a link. Files already at
/// their canonical path are left out.
pub fn find_misplaced(
    scanner: &TreeScanner,
    this: Option<&FileIdentity>,
) -> OrganizeResult<MoveMap> {
    let mut moves = MoveMap::new();

    for entry in scanner.scan() {
        let entry = entry?;
        if entry.is_dir {
            continue;
        }
        if this.is_some_and(|identity| identity.matches(&entry)) {
            debug!(path = %entry.path, "skipping own executable");
            continue;
        }

        let instant =
            classifying_instant(&entry.metadata).map_err(|e| OrganizeError::Metadata {
                path: entry.absolute.clone(),
                source: e,
            })?;
        let Some(file_name) = entry.path.file_name() else {
            continue;
        };
        let destination = canonical_path(file_name, &instant)?;

        if destination != entry.path {
            debug!(source = %entry.path, %destination, "misplaced");
            moves.insert(entry.path, destination);
        }
    }

    info!("Found {} misplaced files", moves.len());
    Ok(moves)
}
