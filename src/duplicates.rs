//! Byte-identical duplicate detection.
//!
//! Every regular file is hashed in full with BLAKE3. The first file seen with
//! a given digest is the original; every later one maps to it. Digest
//! equality is taken as content equality.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{OrganizeError, OrganizeResult};
use crate::tree_scanner::{FileIdentity, TreePath, TreeScanner};

/// Duplicate path to the path of its first-seen original.
pub type DuplicateMap = BTreeMap<TreePath, TreePath>;

/// Maps each duplicate to the first file (in scan order) with the same
/// content. Symlinks, directories and the running executable are not hashed.
pub fn find_duplicates(
    scanner: &TreeScanner,
    this: Option<&FileIdentity>,
) -> OrganizeResult<DuplicateMap> {
    let mut seen: HashMap<blake3::Hash, TreePath> = HashMap::new();
    let mut duplicates = DuplicateMap::new();
    let mut hasher = blake3::Hasher::new();

    for entry in scanner.scan() {
        let entry = entry?;
        if !entry.metadata.is_file() {
            continue;
        }
        if this.is_some_and(|identity| identity.matches(&entry)) {
            continue;
        }

        let digest = digest_file(&mut hasher, &entry.absolute).map_err(|e| OrganizeError::Hash {
            path: entry.absolute.clone(),
            source: e,
        })?;

        match seen.get(&digest) {
            Some(original) => {
                debug!(duplicate = %entry.path, %original, "duplicate");
                duplicates.insert(entry.path, original.clone());
            }
            None => {
                seen.insert(digest, entry.path);
            }
        }
    }

    info!("Found {} duplicates", duplicates.len());
    Ok(duplicates)
}

/// Hashes the whole file, reusing `hasher`. The file is closed on return.
fn digest_file(hasher: &mut blake3::Hasher, path: &Path) -> io::Result<blake3::Hash> {
    hasher.reset();
    let mut file = File::open(path)?;
    io::copy(&mut file, hasher)?;
    Ok(hasher.finalize())
}
