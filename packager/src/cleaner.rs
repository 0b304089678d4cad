//! Best-effort clearing of a previous output tree.
//!
//! Clearing happens in two passes: [`empty_dir`] removes every non-directory
//! entry and leaves the directory skeleton, then [`remove_empty_dirs`] prunes
//! the skeleton bottom-up. A missing root is "nothing to do" in both passes.
//! Only `NotFound` is tolerated; any other I/O error is returned.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::trace;
use std::fs;
use std::io;
use walkdir::WalkDir;

/// Whether pruning also removes the root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PruneLevel {
    /// Remove every directory below the root, keeping the root itself.
    KeepRoot,
    /// Remove every directory including the root.
    #[default]
    IncludeRoot,
}

/// Remove every regular file (and symlink) below `root`, leaving directories.
///
/// Returns the number of entries removed. A missing `root` yields `Ok(0)`.
///
/// # Errors
///
/// Returns [`PackagerError::Cleanup`] for any I/O error other than
/// `NotFound`.
pub fn empty_dir(root: &Utf8Path) -> Result<usize> {
    let mut removed = 0;

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map_or_else(|| root.to_owned(), to_utf8_lossy);
                let source = io::Error::from(err);
                if source.kind() == io::ErrorKind::NotFound {
                    continue;
                }
                return Err(PackagerError::Cleanup { path, source });
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => {
                trace!("removed {}", entry.path().display());
                removed += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(PackagerError::Cleanup {
                    path: to_utf8_lossy(entry.path()),
                    source,
                });
            }
        }
    }

    Ok(removed)
}

/// Remove empty directories below `root`, bottom-up.
///
/// Children are visited before their parents, so a directory whose subtree
/// held only directories is removed once its children are gone. Directories
/// that still contain entries are left in place. With
/// [`PruneLevel::IncludeRoot`] the root is removed too.
///
/// Returns the number of directories removed. A missing `root` yields `Ok(0)`.
///
/// # Errors
///
/// Returns [`PackagerError::Cleanup`] for any I/O error other than
/// `NotFound`.
pub fn remove_empty_dirs(root: &Utf8Path, level: PruneLevel) -> Result<usize> {
    let mut removed = 0;

    for entry in WalkDir::new(root).follow_links(false).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map_or_else(|| root.to_owned(), to_utf8_lossy);
                let source = io::Error::from(err);
                if source.kind() == io::ErrorKind::NotFound {
                    continue;
                }
                return Err(PackagerError::Cleanup { path, source });
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.depth() == 0 && level == PruneLevel::KeepRoot {
            continue;
        }

        let path = to_utf8_lossy(entry.path());
        if remove_if_empty(&path)? {
            trace!("removed directory {path}");
            removed += 1;
        }
    }

    Ok(removed)
}

/// Clear `root` completely: files first, then the directory tree itself.
///
/// Returns the number of files and directories removed.
///
/// # Errors
///
/// Returns [`PackagerError::Cleanup`] for any I/O error other than
/// `NotFound`.
pub fn clear_output_dir(root: &Utf8Path) -> Result<(usize, usize)> {
    let files = empty_dir(root)?;
    let dirs = remove_empty_dirs(root, PruneLevel::IncludeRoot)?;
    Ok((files, dirs))
}

fn remove_if_empty(path: &Utf8Path) -> Result<bool> {
    let cleanup = |source| PackagerError::Cleanup {
        path: path.to_owned(),
        source,
    };

    let is_empty = match fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(cleanup(e)),
    };
    if !is_empty {
        return Ok(false);
    }

    match fs::remove_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(cleanup(e)),
    }
}

pub(crate) fn to_utf8_lossy(path: &std::path::Path) -> Utf8PathBuf {
    Utf8PathBuf::from(path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Tree {
        _temp: TempDir,
        root: Utf8PathBuf,
    }

    /// A populated output tree:
    ///
    /// ```text
    /// out/
    ///   stale.txt
    ///   empty/
    ///   en_prod_20240101/
    ///     package.json
    ///     .nuxt/dist/server.js
    /// ```
    #[fixture]
    fn tree() -> Tree {
        let temp = TempDir::new().expect("failed to create temp dir");
        let root = Utf8PathBuf::try_from(temp.path().join("out")).expect("temp path not UTF-8");
        let staged = root.join("en_prod_20240101");
        fs::create_dir_all(root.join("empty")).expect("create empty dir");
        fs::create_dir_all(staged.join(".nuxt/dist")).expect("create nested dir");
        fs::write(root.join("stale.txt"), b"old").expect("write file");
        fs::write(staged.join("package.json"), b"{}").expect("write file");
        fs::write(staged.join(".nuxt/dist/server.js"), b"js").expect("write file");
        Tree { _temp: temp, root }
    }

    fn count_files(root: &Utf8Path) -> usize {
        WalkDir::new(root)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| !e.file_type().is_dir())
            .count()
    }

    #[rstest]
    fn empty_dir_keeps_directory_skeleton(tree: Tree) {
        let removed = empty_dir(&tree.root).expect("empty_dir should succeed");

        assert_eq!(removed, 3);
        assert_eq!(count_files(&tree.root), 0);
        assert!(tree.root.join("empty").is_dir());
        assert!(tree.root.join("en_prod_20240101/.nuxt/dist").is_dir());
    }

    #[rstest]
    fn prune_after_empty_removes_every_directory(tree: Tree) {
        empty_dir(&tree.root).expect("empty_dir should succeed");
        let removed =
            remove_empty_dirs(&tree.root, PruneLevel::IncludeRoot).expect("prune should succeed");

        assert_eq!(removed, 5);
        assert!(!tree.root.exists());
    }

    #[rstest]
    fn prune_keep_root_leaves_root(tree: Tree) {
        empty_dir(&tree.root).expect("empty_dir should succeed");
        let removed =
            remove_empty_dirs(&tree.root, PruneLevel::KeepRoot).expect("prune should succeed");

        assert_eq!(removed, 4);
        assert!(tree.root.is_dir());
        assert_eq!(fs::read_dir(&tree.root).expect("read root").count(), 0);
    }

    #[rstest]
    fn prune_leaves_directories_that_still_hold_files(tree: Tree) {
        let removed =
            remove_empty_dirs(&tree.root, PruneLevel::IncludeRoot).expect("prune should succeed");

        assert_eq!(removed, 1, "only the empty directory should go");
        assert!(!tree.root.join("empty").exists());
        assert!(tree.root.join("en_prod_20240101/package.json").is_file());
    }

    #[rstest]
    fn clear_output_dir_reports_counts(tree: Tree) {
        let (files, dirs) = clear_output_dir(&tree.root).expect("clear should succeed");
        assert_eq!((files, dirs), (3, 5));
        assert!(!tree.root.exists());
    }

    #[test]
    fn missing_root_is_a_no_op() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let missing =
            Utf8PathBuf::try_from(temp.path().join("absent")).expect("temp path not UTF-8");

        assert_eq!(empty_dir(&missing).expect("empty_dir"), 0);
        assert_eq!(
            remove_empty_dirs(&missing, PruneLevel::IncludeRoot).expect("prune"),
            0
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_unlinked_not_followed() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let outside = temp.path().join("outside");
        fs::create_dir_all(&outside).expect("create outside dir");
        fs::write(outside.join("keep.txt"), b"keep").expect("write file");

        let root = Utf8PathBuf::try_from(temp.path().join("out")).expect("temp path not UTF-8");
        fs::create_dir_all(&root).expect("create root");
        std::os::unix::fs::symlink(&outside, root.join("link")).expect("create symlink");

        clear_output_dir(&root).expect("clear should succeed");

        assert!(!root.exists());
        assert!(outside.join("keep.txt").is_file());
    }
}
