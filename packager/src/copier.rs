//! Artefact copying into the staging directory.

use crate::cleaner::to_utf8_lossy;
use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use log::trace;
use std::fs;
use std::io;
use walkdir::WalkDir;

/// Recursively copy `source` to `destination`, replacing whatever was there.
///
/// Any existing entry at `destination` is removed first so that no stale
/// files from an earlier tree survive. Symlinks inside `source` are followed
/// and their targets copied. Returns the number of files copied.
///
/// # Errors
///
/// Returns [`PackagerError::Assembly`] if `source` is not a readable
/// directory or if any removal, creation, or copy fails.
pub fn copy_dir_forced(source: &Utf8Path, destination: &Utf8Path) -> Result<usize> {
    let metadata = fs::metadata(source).map_err(|e| assembly(source, e))?;
    if !metadata.is_dir() {
        return Err(assembly(
            source,
            io::Error::new(io::ErrorKind::InvalidInput, "source is not a directory"),
        ));
    }

    remove_existing(destination)?;
    fs::create_dir_all(destination).map_err(|e| assembly(destination, e))?;

    let mut copied = 0;
    for entry in WalkDir::new(source).follow_links(true).min_depth(1) {
        let entry = entry.map_err(|err| {
            let path = err.path().map_or_else(|| source.to_owned(), to_utf8_lossy);
            assembly(&path, io::Error::from(err))
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| assembly(source, io::Error::other(e)))?;
        let target = destination.as_std_path().join(relative);
        let target_utf8 = to_utf8_lossy(&target);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| assembly(&target_utf8, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| assembly(&target_utf8, e))?;
            trace!("copied {}", entry.path().display());
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copy a single file byte-for-byte by reading it whole and writing it out.
///
/// Missing parent directories of `destination` are created. Returns the
/// number of bytes written.
///
/// # Errors
///
/// Returns [`PackagerError::Assembly`] if the source cannot be read or the
/// destination cannot be written.
pub fn copy_file(source: &Utf8Path, destination: &Utf8Path) -> Result<usize> {
    let contents = fs::read(source).map_err(|e| assembly(source, e))?;
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| assembly(parent, e))?;
    }
    fs::write(destination, &contents).map_err(|e| assembly(destination, e))?;
    Ok(contents.len())
}

fn remove_existing(path: &Utf8Path) -> Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => Err(e),
    };
    result.map_err(|e| assembly(path, e))
}

fn assembly(path: &Utf8Path, source: io::Error) -> PackagerError {
    PackagerError::Assembly {
        path: path.to_owned(),
        source,
    }
}
