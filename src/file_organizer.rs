/// Filesystem mutations for an organization run.
///
/// Planning never touches the tree; everything that does lives here and is
/// gated by the run's dry-run flag. A failing call aborts the remainder of its
/// phase; mutations applied before it stay applied.
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{OrganizeError, OrganizeResult};
use crate::misplaced::MoveMap;
use crate::tree_scanner::TreePath;
use crate::unique_name::UniqueNamer;

/// A single move whose destination is already collision-free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    /// Where the file is now.
    pub source: TreePath,
    /// Where it goes.
    pub destination: TreePath,
}

/// Resolves a final, batch-unique destination for every entry of `moves`.
///
/// Entries are processed in map order, which is also the order they are
/// applied in. The first move asking for a name gets it, later ones get
/// numbered variants. A name vacated by an earlier move counts as free.
pub fn plan_moves(
    root: &Path,
    moves: &MoveMap,
    max_attempts: usize,
) -> OrganizeResult<Vec<PlannedMove>> {
    let mut namer = UniqueNamer::new(root, max_attempts);
    moves
        .iter()
        .map(|(source, desired)| {
            Ok(PlannedMove {
                source: source.clone(),
                destination: namer.allocate(source, desired)?,
            })
        })
        .collect()
}

/// Applies removals and moves below a root directory.
///
/// With `dry_run` set, every method validates its input and returns success
/// without touching the filesystem.
pub struct FileOrganizer {
    root: PathBuf,
    dry_run: bool,
}

impl FileOrganizer {
    /// Creates an organizer for `root`, which must be an existing directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sortera::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let organizer = FileOrganizer::new(Path::new("/path/to/photos"), true);
    /// assert!(organizer.is_ok());
    /// ```
    pub fn new(root: &Path, dry_run: bool) -> OrganizeResult<Self> {
        if !root.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "not an existing directory"),
            });
        }

        Ok(Self {
            root: root.to_path_buf(),
            dry_run,
        })
    }

    /// Deletes a single file.
    pub fn remove_file(&self, path: &TreePath) -> OrganizeResult<()> {
        let native = path.to_native(&self.root);
        debug!(path = %path, dry_run = self.dry_run, "remove file");
        if self.dry_run {
            return Ok(());
        }

        fs::remove_file(&native).map_err(|e| OrganizeError::RemoveFailed {
            path: native,
            source: e,
        })
    }

    /// Moves a file, creating any missing parent directories first.
    pub fn move_file(&self, planned: &PlannedMove) -> OrganizeResult<()> {
        let from = planned.source.to_native(&self.root);
        let to = planned.destination.to_native(&self.root);
        debug!(source = %planned.source, destination = %planned.destination, dry_run = self.dry_run, "move");
        if self.dry_run {
            return Ok(());
        }

        if let Some(parent) = to.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| OrganizeError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::rename(&from, &to).map_err(|e| OrganizeError::FileMoveFailed {
            from,
            to,
            source: e,
        })
    }

    /// Applies moves in order, calling `on_applied` after each one.
    ///
    /// Stops at the first failure: earlier moves stay applied and later ones
    /// are not attempted. Returns the number of moves applied.
    pub fn apply_moves(
        &self,
        moves: &[PlannedMove],
        mut on_applied: impl FnMut(&PlannedMove),
    ) -> OrganizeResult<usize> {
        for planned in moves {
            self.move_file(planned)?;
            on_applied(planned);
        }
        Ok(moves.len())
    }

    /// Removes a directory that is expected to be empty.
    pub fn remove_empty_dir(&self, path: &TreePath) -> OrganizeResult<()> {
        let native = path.to_native(&self.root);
        debug!(path = %path, dry_run = self.dry_run, "remove empty directory");
        if self.dry_run {
            return Ok(());
        }

        fs::remove_dir(&native).map_err(|e| OrganizeError::RemoveFailed {
            path: native,
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unique_name::DEFAULT_MAX_ATTEMPTS;
    use tempfile::TempDir;

    fn planned(source: &str, destination: &str) -> PlannedMove {
        PlannedMove {
            source: TreePath::new(source),
            destination: TreePath::new(destination),
        }
    }

    #[test]
    fn test_move_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("photo.jpg"), "jpeg").unwrap();

        let organizer = FileOrganizer::new(base, false).unwrap();
        organizer
            .move_file(&planned("photo.jpg", "2023/Juni/photo.jpg"))
            .expect("Failed to move file");

        assert!(!base.join("photo.jpg").exists());
        assert!(base.join("2023/Juni/photo.jpg").is_file());
    }

    #[test]
    fn test_move_uses_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::create_dir_all(base.join("2023/Juni")).unwrap();
        fs::write(base.join("2023/Juni/other.jpg"), "other").unwrap();
        fs::write(base.join("photo.jpg"), "jpeg").unwrap();

        let organizer = FileOrganizer::new(base, false).unwrap();
        organizer
            .move_file(&planned("photo.jpg", "2023/Juni/photo.jpg"))
            .unwrap();

        assert!(base.join("2023/Juni/photo.jpg").is_file());
        assert!(base.join("2023/Juni/other.jpg").is_file());
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join("photo.jpg"), "jpeg").unwrap();
        fs::write(base.join("copy.jpg"), "jpeg").unwrap();
        fs::create_dir(base.join("empty")).unwrap();

        let organizer = FileOrganizer::new(base, true).unwrap();
        organizer
            .move_file(&planned("photo.jpg", "2023/Juni/photo.jpg"))
            .unwrap();
        organizer.remove_file(&TreePath::new("copy.jpg")).unwrap();
        organizer.remove_empty_dir(&TreePath::new("empty")).unwrap();

        assert!(base.join("photo.jpg").is_file());
        assert!(base.join("copy.jpg").is_file());
        assert!(base.join("empty").is_dir());
        assert!(!base.join("2023").exists());
    }

    #[test]
    fn test_failed_move_halts_the_batch() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        for name in ["1.txt", "2.txt", "4.txt", "5.txt"] {
            fs::write(base.join(name), name).unwrap();
        }
        let moves = vec![
            planned("1.txt", "out/1.txt"),
            planned("2.txt", "out/2.txt"),
            planned("3.txt", "out/3.txt"),
            planned("4.txt", "out/4.txt"),
            planned("5.txt", "out/5.txt"),
        ];

        let organizer = FileOrganizer::new(base, false).unwrap();
        let mut applied = Vec::new();
        let result = organizer.apply_moves(&moves, |m| applied.push(m.source.to_string()));

        assert!(matches!(result, Err(OrganizeError::FileMoveFailed { .. })));
        assert_eq!(applied, vec!["./1.txt", "./2.txt"]);
        assert!(base.join("out/1.txt").is_file());
        assert!(base.join("out/2.txt").is_file());
        assert!(base.join("4.txt").is_file());
        assert!(base.join("5.txt").is_file());
        assert!(!base.join("out/4.txt").exists());
    }

    #[test]
    fn test_remove_non_empty_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::create_dir(base.join("album")).unwrap();
        fs::write(base.join("album/thumbs.db"), "x").unwrap();

        let organizer = FileOrganizer::new(base, false).unwrap();
        let result = organizer.remove_empty_dir(&TreePath::new("album"));
        assert!(matches!(result, Err(OrganizeError::RemoveFailed { .. })));
    }

    #[test]
    fn test_plan_moves_resolves_collisions() {
        let temp_dir = TempDir::new().unwrap();
        let mut moves = MoveMap::new();
        moves.insert(TreePath::new("a/photo.jpg"), TreePath::new("2023/Juni/photo.jpg"));
        moves.insert(TreePath::new("b/photo.jpg"), TreePath::new("2023/Juni/photo.jpg"));

        let plan = plan_moves(temp_dir.path(), &moves, DEFAULT_MAX_ATTEMPTS).unwrap();
        assert_eq!(
            plan,
            vec![
                planned("a/photo.jpg", "2023/Juni/photo.jpg"),
                planned("b/photo.jpg", "2023/Juni/photo.jpg_1"),
            ]
        );
    }

    #[test]
    fn test_plan_reuses_name_vacated_by_earlier_move() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::create_dir_all(base.join("2023/Juni")).unwrap();
        fs::write(base.join("2023/Juni/photo.jpg"), "july").unwrap();
        fs::write(base.join("photo.jpg"), "june").unwrap();

        let mut moves = MoveMap::new();
        moves.insert(TreePath::new("2023/Juni/photo.jpg"), TreePath::new("2023/Juli/photo.jpg"));
        moves.insert(TreePath::new("photo.jpg"), TreePath::new("2023/Juni/photo.jpg"));

        let plan = plan_moves(base, &moves, DEFAULT_MAX_ATTEMPTS).unwrap();
        assert_eq!(
            plan,
            vec![
                planned("2023/Juni/photo.jpg", "2023/Juli/photo.jpg"),
                planned("photo.jpg", "2023/Juni/photo.jpg"),
            ]
        );

        let organizer = FileOrganizer::new(base, false).unwrap();
        assert_eq!(organizer.apply_moves(&plan, |_| {}).unwrap(), 2);
        assert_eq!(fs::read_to_string(base.join("2023/Juli/photo.jpg")).unwrap(), "july");
        assert_eq!(fs::read_to_string(base.join("2023/Juni/photo.jpg")).unwrap(), "june");
    }

    #[test]
    fn test_invalid_base_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let result = FileOrganizer::new(&missing, false);
        assert!(matches!(result, Err(OrganizeError::InvalidBasePath { .. })));
    }
}
