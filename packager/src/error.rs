//! Error types for the packager CLI.
//!
//! Each variant maps onto one failure class of a packaging run: configuration
//! problems are caught before the build starts, build failures stop the run
//! before any filesystem mutation, and cleanup or assembly failures abort the
//! staging phase without rolling back partial copies.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during a packaging run.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// The mode argument is neither `prod` nor `dev`.
    #[error("unknown mode '{mode}'; expected one of: prod, dev")]
    UnknownMode {
        /// The rejected mode string.
        mode: String,
    },

    /// The project manifest could not be read or parsed.
    #[error("invalid packager manifest at {path}: {reason}")]
    InvalidManifest {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// Description of the read or parse failure.
        reason: String,
    },

    /// The project directory could not be resolved.
    #[error("invalid project directory: {reason}")]
    ProjectDirInvalid {
        /// Description of why the directory was rejected.
        reason: String,
    },

    /// The root output directory overlaps the project or one of its sources.
    #[error("refusing to use {path} as the output directory: {reason}")]
    OutputDirInvalid {
        /// The resolved output directory.
        path: Utf8PathBuf,
        /// Why the directory would endanger project files.
        reason: String,
    },

    /// The package manager executable could not be spawned.
    #[error("failed to spawn {program}: {source}")]
    BuildSpawn {
        /// The program that was invoked.
        program: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The build script exited unsuccessfully.
    #[error("build failed: `{script}` {}", describe_exit(.code))]
    BuildFailed {
        /// The build script that was run.
        script: String,
        /// The exit code, or `None` when the process was terminated by a signal.
        code: Option<i32>,
    },

    /// Clearing the previous output tree hit an unexpected error.
    #[error("failed to clear {path}: {source}")]
    Cleanup {
        /// Path that could not be removed or read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Recreating the staging tree or copying an artefact failed.
    #[error("failed to assemble {path}: {source}")]
    Assembly {
        /// Path that could not be created or written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PackagerError {
    /// Returns `true` for failures raised while the staging tree was being
    /// cleared or assembled.
    #[must_use]
    pub const fn is_assembly_failure(&self) -> bool {
        matches!(self, Self::Cleanup { .. } | Self::Assembly { .. })
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_owned(),
    }
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
