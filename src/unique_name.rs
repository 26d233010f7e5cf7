//! Collision-free destination names.
//!
//! A candidate is free when no earlier move in the same batch has claimed it
//! and nothing occupies it on disk, except a file that an earlier move of the
//! batch carries away. Taken names are retried as `<name>_<n>` for `n` in
//! `1..=max_attempts`.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::{OrganizeError, OrganizeResult};
use crate::tree_scanner::TreePath;

/// Numbered variants probed before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 63;

/// Returns `desired` if it is free, otherwise the first free numbered variant.
///
/// `released` holds paths vacated by moves applied before this one; they
/// count as free even while they still exist on disk.
///
/// # Errors
///
/// `OrganizeError::NameExhausted` if every variant up to `max_attempts` is
/// taken.
pub fn resolve_unique_name(
    root: &Path,
    desired: &TreePath,
    claimed: &HashSet<TreePath>,
    released: &HashSet<TreePath>,
    max_attempts: usize,
) -> OrganizeResult<TreePath> {
    let is_free = |candidate: &TreePath| {
        !claimed.contains(candidate)
            && (released.contains(candidate) || !exists_on_disk(&candidate.to_native(root)))
    };

    if is_free(desired) {
        return Ok(desired.clone());
    }

    for n in 1..=max_attempts {
        let candidate = numbered_variant(desired, n);
        if is_free(&candidate) {
            debug!(%desired, %candidate, "destination taken, renamed");
            return Ok(candidate);
        }
    }

    Err(OrganizeError::NameExhausted {
        path: desired.clone(),
        attempts: max_attempts,
    })
}

/// Appends `_<n>` to the full file name: `photo.jpg` becomes `photo.jpg_<n>`.
pub fn numbered_variant(path: &TreePath, n: usize) -> TreePath {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}_{n}"))
}

/// Anything that cannot be proven absent counts as taken.
fn exists_on_disk(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != ErrorKind::NotFound,
    }
}

/// Hands out destinations for one batch of moves applied in allocation
/// order. Remembers every name it has given away and every source that an
/// allocated move will vacate.
pub struct UniqueNamer<'a> {
    root: &'a Path,
    claimed: HashSet<TreePath>,
    released: HashSet<TreePath>,
    max_attempts: usize,
}

impl<'a> UniqueNamer<'a> {
    pub fn new(root: &'a Path, max_attempts: usize) -> Self {
        Self {
            root,
            claimed: HashSet::new(),
            released: HashSet::new(),
            max_attempts,
        }
    }

    /// Resolves a free name for moving `source` to `desired` and claims it
    /// for this batch.
    pub fn allocate(&mut self, source: &TreePath, desired: &TreePath) -> OrganizeResult<TreePath> {
        let name = resolve_unique_name(
            self.root,
            desired,
            &self.claimed,
            &self.released,
            self.max_attempts,
        )?;
        self.claimed.insert(name.clone());
        self.released.insert(source.clone());
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_numbered_variant_suffixes_full_name() {
        let path = TreePath::new("2023/Juni/photo.jpg");
        assert_eq!(numbered_variant(&path, 1).to_string(), "./2023/Juni/photo.jpg_1");
        assert_eq!(numbered_variant(&path, 12).to_string(), "./2023/Juni/photo.jpg_12");
    }

    #[test]
    fn test_numbered_variant_without_extension() {
        let path = TreePath::new("2023/Juni/README");
        assert_eq!(numbered_variant(&path, 2).to_string(), "./2023/Juni/README_2");
        let hidden = TreePath::new("2023/Juni/.profile");
        assert_eq!(numbered_variant(&hidden, 1).to_string(), "./2023/Juni/.profile_1");
    }

    #[test]
    fn test_free_name_is_returned_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let desired = TreePath::new("2023/Juni/photo.jpg");

        let name = resolve_unique_name(
            temp_dir.path(),
            &desired,
            &HashSet::new(),
            &HashSet::new(),
            DEFAULT_MAX_ATTEMPTS,
        )
        .unwrap();
        assert_eq!(name, desired);
    }

    #[test]
    fn test_existing_file_gets_next_free_number() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "2023/Juni/photo.jpg");
        touch(temp_dir.path(), "2023/Juni/photo.jpg_1");

        let name = resolve_unique_name(
            temp_dir.path(),
            &TreePath::new("2023/Juni/photo.jpg"),
            &HashSet::new(),
            &HashSet::new(),
            DEFAULT_MAX_ATTEMPTS,
        )
        .unwrap();
        assert_eq!(name.to_string(), "./2023/Juni/photo.jpg_2");
    }

    #[test]
    fn test_claimed_names_are_avoided() {
        let temp_dir = TempDir::new().unwrap();
        let desired = TreePath::new("2023/Juni/photo.jpg");
        let claimed: HashSet<_> = [desired.clone()].into_iter().collect();

        let name = resolve_unique_name(
            temp_dir.path(),
            &desired,
            &claimed,
            &HashSet::new(),
            DEFAULT_MAX_ATTEMPTS,
        )
        .unwrap();
        assert_eq!(name.to_string(), "./2023/Juni/photo.jpg_1");
    }

    #[test]
    fn test_namer_keeps_batch_unique() {
        let temp_dir = TempDir::new().unwrap();
        let desired = TreePath::new("2023/Juni/photo.jpg");
        let mut namer = UniqueNamer::new(temp_dir.path(), DEFAULT_MAX_ATTEMPTS);

        let first = namer.allocate(&TreePath::new("a/photo.jpg"), &desired).unwrap();
        let second = namer.allocate(&TreePath::new("b/photo.jpg"), &desired).unwrap();
        let third = namer.allocate(&TreePath::new("c/photo.jpg"), &desired).unwrap();

        assert_eq!(first.to_string(), "./2023/Juni/photo.jpg");
        assert_eq!(second.to_string(), "./2023/Juni/photo.jpg_1");
        assert_eq!(third.to_string(), "./2023/Juni/photo.jpg_2");
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a/b.txt");
        touch(temp_dir.path(), "a/b.txt_1");
        touch(temp_dir.path(), "a/b.txt_2");

        let result = resolve_unique_name(
            temp_dir.path(),
            &TreePath::new("a/b.txt"),
            &HashSet::new(),
            &HashSet::new(),
            2,
        );
        assert!(matches!(
            result,
            Err(OrganizeError::NameExhausted { attempts: 2, .. })
        ));
    }

    #[test]
    fn test_name_vacated_earlier_in_batch_is_reused() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "2023/Juni/photo.jpg");
        let resident = TreePath::new("2023/Juni/photo.jpg");
        let mut namer = UniqueNamer::new(temp_dir.path(), DEFAULT_MAX_ATTEMPTS);

        let moved_out = namer
            .allocate(&resident, &TreePath::new("2023/Juli/photo.jpg"))
            .unwrap();
        let moved_in = namer.allocate(&TreePath::new("photo.jpg"), &resident).unwrap();

        assert_eq!(moved_out.to_string(), "./2023/Juli/photo.jpg");
        assert_eq!(moved_in, resident);
    }

    #[test]
    fn test_name_still_occupied_is_not_released() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "2023/Juni/photo.jpg");
        let mut namer = UniqueNamer::new(temp_dir.path(), DEFAULT_MAX_ATTEMPTS);

        let name = namer
            .allocate(&TreePath::new("photo.jpg"), &TreePath::new("2023/Juni/photo.jpg"))
            .unwrap();
        assert_eq!(name.to_string(), "./2023/Juni/photo.jpg_1");
    }
}
