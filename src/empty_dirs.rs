//! Directories that contain no files, directly or through subdirectories.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::OrganizeResult;
use crate::tree_scanner::{TreePath, TreeScanner};

/// Collects every directory below `root` that holds, transitively, zero files.
///
/// The walk is unfiltered: a directory holding only excluded names (such as
/// `thumbs.db`) is not empty and cannot be removed.
///
/// Each directory starts with a count of its direct children. Directories at
/// zero are removed in rounds, each removal decrementing its parent; a parent
/// reaching zero joins the next round. Counts only decrease, so this ends.
/// The result lists rounds in order, so every directory comes after all of
/// its subdirectories. The root is never included.
pub fn collect_empty_directories(root: &Path) -> OrganizeResult<Vec<TreePath>> {
    let scanner = TreeScanner::unfiltered(root);
    let mut remaining: BTreeMap<TreePath, usize> = BTreeMap::new();

    for entry in scanner.scan() {
        let entry = entry?;
        if entry.is_dir {
            remaining.entry(entry.path.clone()).or_insert(0);
        }
        if let Some(parent) = entry.path.parent().filter(|p| !p.is_root()) {
            *remaining.entry(parent).or_insert(0) += 1;
        }
    }

    let mut round: Vec<TreePath> = remaining
        .iter()
        .filter(|&(_, &children)| children == 0)
        .map(|(dir, _)| dir.clone())
        .collect();
    let mut empty = Vec::new();
    let mut rounds = 0;

    while !round.is_empty() {
        rounds += 1;
        debug!(round = rounds, count = round.len(), "empty directories");

        let mut next = Vec::new();
        for dir in &round {
            remaining.remove(dir);
            if let Some(parent) = dir.parent()
                && let Some(children) = remaining.get_mut(&parent)
            {
                *children -= 1;
                if *children == 0 {
                    next.push(parent);
                }
            }
        }

        next.sort();
        empty.append(&mut round);
        round = next;
    }

    info!("Found {} empty directories", empty.len());
    Ok(empty)
}
