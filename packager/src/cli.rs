//! CLI argument definitions for the packager.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::Parser;

/// Build a server-rendered web project and stage its deployment bundle.
#[derive(Parser, Debug, Clone)]
#[command(name = "ssr-packager")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build a server-rendered web project and stage its deployment bundle.\n\n",
    "The packager runs the project's `build:<mode>` script through npm, streaming ",
    "its output. When the build succeeds, the output directory (dist-ssr by ",
    "default) is cleared and a fresh `en_<mode>_<YYYYMMDD>` staging directory is ",
    "populated with the build output, static assets, lockfile, package manifest, ",
    "framework configuration, and the environment file for the selected mode.\n\n",
    "Per-project overrides can be placed in a `packager.toml` at the project root.",
))]
#[command(after_help = concat!(
    "MODES:\n",
    "  prod    Run `npm run build:prod` and ship .env.production (default)\n",
    "  dev     Run `npm run build:dev` and ship .env.development\n\n",
    "EXAMPLES:\n",
    "  Package a production build:\n",
    "    $ ssr-packager\n\n",
    "  Package a development build:\n",
    "    $ ssr-packager dev\n\n",
    "  Preview without building:\n",
    "    $ ssr-packager --dry-run\n",
))]
pub struct Cli {
    /// Build mode: `prod` or `dev`.
    #[arg(value_name = "MODE", default_value = "prod")]
    pub mode: String,

    /// Project root containing package.json [default: current directory].
    #[arg(short, long, value_name = "DIR")]
    pub project_dir: Option<Utf8PathBuf>,

    /// Root output directory [default: <project>/dist-ssr].
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<Utf8PathBuf>,

    /// Show the resolved configuration and exit without building.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase progress detail (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors and build output still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Default for Cli {
    /// Creates a `Cli` equivalent to running the packager with no arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use ssr_packager::cli::Cli;
    ///
    /// let cli = Cli::default();
    /// assert_eq!(cli.mode, "prod");
    /// assert!(!cli.dry_run);
    /// ```
    fn default() -> Self {
        Self {
            mode: "prod".to_owned(),
            project_dir: None,
            output_dir: None,
            dry_run: false,
            verbosity: 0,
            quiet: false,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
