//! Single-pass walks over the tree being organized.
//!
//! Every logical phase takes a fresh scan. Entries are produced depth-first,
//! pre-order, sorted by file name inside each directory, so two scans of an
//! unchanged tree yield the same sequence.

use std::fmt;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Serialize, Serializer};
use tracing::trace;
use walkdir::{DirEntry, WalkDir};

use crate::config::CompiledFilters;
use crate::error::{OrganizeError, OrganizeResult};

/// A path relative to the walk root.
///
/// Stored as components without a leading `.`; rendered with forward slashes
/// as `./a/b` on every platform (the root itself renders as `.`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TreePath(PathBuf);

impl TreePath {
    /// The walk root.
    pub fn root() -> Self {
        Self(PathBuf::new())
    }

    /// Builds a tree path from a relative path, dropping `.` components.
    ///
    /// ```
    /// use sortera::tree_scanner::TreePath;
    ///
    /// let path = TreePath::new("./2023/Juni/photo.jpg");
    /// assert_eq!(path.to_string(), "./2023/Juni/photo.jpg");
    /// assert_eq!(TreePath::new("a/b"), TreePath::new("./a/b"));
    /// ```
    pub fn new(relative: impl AsRef<Path>) -> Self {
        Self(
            relative
                .as_ref()
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect(),
        )
    }

    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// The containing directory; `None` only for the root.
    pub fn parent(&self) -> Option<TreePath> {
        self.0.parent().map(|p| TreePath(p.to_path_buf()))
    }

    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.0.file_name()
    }

    pub fn join(&self, name: impl AsRef<Path>) -> TreePath {
        TreePath::new(self.0.join(name))
    }

    pub fn with_file_name(&self, name: impl AsRef<std::ffi::OsStr>) -> TreePath {
        TreePath(self.0.with_file_name(name))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Resolves this path below `root` using native separators.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(".")?;
        for component in self.0.components() {
            write!(f, "/{}", component.as_os_str().to_string_lossy())?;
        }
        Ok(())
    }
}

impl Serialize for TreePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One entry produced by a scan.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// Position relative to the walk root.
    pub path: TreePath,
    /// Native path, usable for opening the entry.
    pub absolute: PathBuf,
    /// Base file name.
    pub name: String,
    pub is_dir: bool,
    /// Metadata of the entry itself (symlinks are not followed).
    pub metadata: Metadata,
}

impl TreeEntry {
    fn from_walk(root: &Path, entry: &DirEntry) -> OrganizeResult<Self> {
        let absolute = entry.path().to_path_buf();
        let relative = absolute
            .strip_prefix(root)
            .map_err(|_| OrganizeError::Metadata {
                path: absolute.clone(),
                source: io::Error::other("entry lies outside the walk root"),
            })?;
        let metadata = entry.metadata().map_err(|e| OrganizeError::Metadata {
            path: absolute.clone(),
            source: e.into(),
        })?;

        Ok(Self {
            path: TreePath::new(relative),
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: entry.file_type().is_dir(),
            absolute,
            metadata,
        })
    }
}

/// Identity of a file that survives aliasing through symlinks and relative
/// paths: device and inode on Unix, the canonical path elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    ino: u64,
    #[cfg(not(unix))]
    canonical: PathBuf,
}

impl FileIdentity {
    pub fn of(path: &Path) -> io::Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let metadata = fs::metadata(path)?;
            Ok(Self {
                dev: metadata.dev(),
                ino: metadata.ino(),
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {
                canonical: fs::canonicalize(path)?,
            })
        }
    }

    /// Returns true if `entry` is this very file.
    pub fn matches(&self, entry: &TreeEntry) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            entry.metadata.dev() == self.dev && entry.metadata.ino() == self.ino
        }

        #[cfg(not(unix))]
        {
            fs::canonicalize(&entry.absolute)
                .map(|p| p == self.canonical)
                .unwrap_or(false)
        }
    }
}

/// Walks a tree, optionally applying exclusion filters.
pub struct TreeScanner<'a> {
    root: PathBuf,
    filters: Option<&'a CompiledFilters>,
}

impl<'a> TreeScanner<'a> {
    /// A scanner that skips excluded entries (and everything below an
    /// excluded directory).
    pub fn new(root: &Path, filters: &'a CompiledFilters) -> Self {
        Self {
            root: root.to_path_buf(),
            filters: Some(filters),
        }
    }

    /// A scanner that yields every entry.
    pub fn unfiltered(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            filters: None,
        }
    }

    /// Starts a fresh walk. The root itself is not yielded.
    ///
    /// The first error ends the useful part of the walk; callers are expected
    /// to stop on it with `?`.
    pub fn scan(&self) -> impl Iterator<Item = OrganizeResult<TreeEntry>> + '_ {
        let root = self.root.as_path();
        WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| self.admits(entry))
            .map(move |entry| {
                let entry = entry.map_err(|e| OrganizeError::Scan {
                    path: e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf()),
                    source: e,
                })?;
                trace!(path = %entry.path().display(), "scanned");
                TreeEntry::from_walk(root, &entry)
            })
    }

    fn admits(&self, entry: &DirEntry) -> bool {
        let Some(filters) = self.filters else {
            return true;
        };
        let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
        !filters.is_excluded(relative)
    }
}
