//! Output formatting for the packager CLI.
//!
//! Progress and outcome lines are plain text written to stderr; the build
//! process's own output is relayed separately by [`crate::builder`].

use crate::config::RunConfig;
use crate::stager::StagedTree;
use std::io::Write;

/// Line printed when the build script succeeds.
pub const BUILD_SUCCEEDED: &str = "success: build succeeded";

/// Line printed when the build script fails.
pub const BUILD_FAILED: &str = "error: build failed";

/// Line printed when the staging directory could not be assembled.
pub const ASSEMBLY_FAILED: &str = "error: packaging failed";

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Format the message printed after a successful run.
///
/// # Example
///
/// ```
/// use camino::Utf8PathBuf;
/// use ssr_packager::output::success_message;
/// use ssr_packager::stager::StagedTree;
///
/// let staged = StagedTree {
///     path: Utf8PathBuf::from("/srv/site/dist-ssr/en_prod_20240305"),
///     entries: vec![".nuxt".to_owned(), "package.json".to_owned()],
///     files_in_dirs: 12,
///     file_bytes: 512,
/// };
/// let message = success_message(&staged);
/// assert!(message.contains("2 entries"));
/// assert!(message.contains("en_prod_20240305"));
/// ```
#[must_use]
pub fn success_message(staged: &StagedTree) -> String {
    let count = staged.entries.len();
    let plural = if count == 1 { "entry" } else { "entries" };
    format!("Staged {count} {plural} to {}", staged.path)
}

/// Configuration summary shown by `--dry-run`.
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Resolved run configuration.
    pub config: &'a RunConfig,
    /// Verbosity level (0 = normal, 1+ = verbose).
    pub verbosity: u8,
    /// Whether quiet mode is enabled.
    pub quiet: bool,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let config = self.config;
        let mut lines = vec![
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Mode: {}", config.mode()),
            format!(
                "Build command: {} {}",
                config.package_manager(),
                config.build_args().join(" ")
            ),
            format!("Project directory: {}", config.project_dir()),
            format!("Output directory: {}", config.root_output_dir()),
            format!("Staging directory: {}", config.staging_dir()),
            format!("Verbosity level: {}", self.verbosity),
            format!("Quiet: {}", self.quiet),
            String::new(),
            "Directories to copy:".to_owned(),
        ];
        lines.extend(config.copy_dirs().iter().map(|d| format!("  - {d}")));
        lines.push(String::new());
        lines.push("Files to copy:".to_owned());
        lines.extend(config.copy_files().iter().map(|f| format!("  - {f}")));

        lines.join("\n")
    }
}
