//! Staging directory assembly.
//!
//! This module recreates the output tree for a run and copies the configured
//! directories and files from the project root into the staging directory.
//! It does not clear previous output; see [`crate::cleaner`].

use crate::config::RunConfig;
use crate::copier::{copy_dir_forced, copy_file};
use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io;

/// Permission bits for directories created by the stager (Unix only).
pub const STAGING_DIR_MODE: u32 = 0o755;

/// Summary of a completed staging pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedTree {
    /// Full path of the staging directory.
    pub path: Utf8PathBuf,
    /// Top-level entries written, in copy order (directories first).
    pub entries: Vec<String>,
    /// Number of files copied from the configured directories.
    pub files_in_dirs: usize,
    /// Total bytes written for the configured files.
    pub file_bytes: usize,
}

/// Assembles the staging directory described by a [`RunConfig`].
pub struct Stager<'a> {
    config: &'a RunConfig,
}

impl<'a> Stager<'a> {
    /// Create a stager for the given configuration.
    #[must_use]
    pub const fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// Create the root output directory and the staging directory inside it.
    ///
    /// Creation is strict: if either directory already exists this fails, so
    /// callers must clear previous output first.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Assembly`] if either directory cannot be
    /// created.
    pub fn prepare(&self) -> Result<Utf8PathBuf> {
        let root = self.config.root_output_dir();
        let staging = self.staging_path();

        create_dir_strict(root)?;
        create_dir_strict(&staging)?;
        debug!("created staging directory {staging}");

        Ok(staging)
    }

    /// Copy every configured directory and file into the staging directory.
    ///
    /// Directories are copied first, then files, each in configured order.
    /// A failure stops the pass; entries already copied are left in place.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Assembly`] if any source is missing or any
    /// copy fails.
    pub fn stage_all(&self) -> Result<StagedTree> {
        let staging = self.staging_path();
        let mut entries = Vec::new();

        let mut files_in_dirs = 0;
        for name in self.config.copy_dirs() {
            files_in_dirs += copy_dir_forced(&self.config.source_path(name), &staging.join(name))?;
            entries.push(name.clone());
        }

        let mut file_bytes = 0;
        for name in self.config.copy_files() {
            file_bytes += copy_file(&self.config.source_path(name), &staging.join(name))?;
            entries.push(name.clone());
        }

        Ok(StagedTree {
            path: staging,
            entries,
            files_in_dirs,
            file_bytes,
        })
    }

    /// Return the full path to the staging directory.
    #[must_use]
    pub fn staging_path(&self) -> Utf8PathBuf {
        self.config.staging_dir()
    }
}

fn create_dir_strict(path: &Utf8Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(STAGING_DIR_MODE);
    }

    builder
        .create(path)
        .map_err(|source: io::Error| PackagerError::Assembly {
            path: path.to_owned(),
            source,
        })
}
