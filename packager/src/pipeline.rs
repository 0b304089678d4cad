//! Build and staging pipeline orchestration.
//!
//! A run moves through a fixed sequence: build, then (on success) clear the
//! previous output, recreate the tree, and copy artefacts. Any failure is
//! terminal for the run; nothing is retried or rolled back.

use crate::builder::{BuildRunner, run_build};
use crate::cleaner::clear_output_dir;
use crate::config::RunConfig;
use crate::error::Result;
use crate::output::{
    ASSEMBLY_FAILED, BUILD_FAILED, BUILD_SUCCEEDED, success_message, write_stderr_line,
};
use crate::stager::{StagedTree, Stager};
use log::{debug, error};
use std::io::Write;

/// Context for a packaging run.
pub struct PipelineContext<'a> {
    /// Resolved run configuration.
    pub config: &'a RunConfig,
    /// Runner used to invoke the build script.
    pub runner: &'a dyn BuildRunner,
    /// Verbosity level.
    pub verbosity: u8,
    /// Suppress progress output.
    pub quiet: bool,
}

/// Runs the build and, if it succeeds, assembles the staging directory.
///
/// Progress is written to `stderr` unless quiet; outcome lines for failures
/// are always written.
///
/// # Errors
///
/// Returns the build error if the build cannot be spawned or fails, in which
/// case the filesystem is not touched. Returns a cleanup or assembly error if
/// clearing, recreating, or copying fails; partial output is left in place.
pub fn run_packaging(context: &PipelineContext<'_>, stderr: &mut dyn Write) -> Result<StagedTree> {
    perform_build(context, stderr)?;

    let staged = assemble(context, stderr).inspect_err(|err| {
        error!("assembly failed: {err:?}");
        write_stderr_line(stderr, ASSEMBLY_FAILED);
    })?;

    if !context.quiet {
        write_stderr_line(stderr, success_message(&staged));
    }
    Ok(staged)
}

/// Runs the build script, reporting the outcome.
///
/// # Errors
///
/// Returns an error if the build cannot be spawned or exits unsuccessfully.
pub fn perform_build(context: &PipelineContext<'_>, stderr: &mut dyn Write) -> Result<()> {
    let config = context.config;

    if !context.quiet {
        write_stderr_line(
            stderr,
            format!(
                "Building {} bundle: {} {}...",
                config.mode(),
                config.package_manager(),
                config.build_args().join(" ")
            ),
        );
    }

    match run_build(config, context.runner) {
        Ok(status) => {
            debug!("build finished with {status:?}");
            if !context.quiet {
                write_stderr_line(stderr, BUILD_SUCCEEDED);
            }
            Ok(())
        }
        Err(err) => {
            write_stderr_line(stderr, BUILD_FAILED);
            Err(err)
        }
    }
}

/// Clears previous output, recreates the tree, and copies all artefacts.
///
/// # Errors
///
/// Returns the first cleanup or assembly error encountered.
pub fn assemble(context: &PipelineContext<'_>, stderr: &mut dyn Write) -> Result<StagedTree> {
    let config = context.config;
    let root = config.root_output_dir();

    let (files, dirs) = clear_output_dir(root)?;
    if context.verbosity > 0 {
        write_stderr_line(
            stderr,
            format!("Cleared {root}: removed {files} file(s) and {dirs} director(ies)"),
        );
    }

    let stager = Stager::new(config);
    let staging_path = stager.prepare()?;
    if !context.quiet {
        write_stderr_line(stderr, format!("Staging artefacts to {staging_path}..."));
    }

    let staged = stager.stage_all()?;
    if context.verbosity > 0 {
        write_stderr_line(
            stderr,
            format!(
                "Copied {} file(s) from directories and {} byte(s) of files",
                staged.files_in_dirs, staged.file_bytes
            ),
        );
    }

    Ok(staged)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
