//! Packager CLI entrypoint.
//!
//! This binary builds a server-rendered web project and stages its
//! deployment bundle into a mode- and date-tagged directory.

use clap::Parser;
use ssr_packager::builder::{BuildRunner, SystemBuildRunner};
use ssr_packager::cli::Cli;
use ssr_packager::config::RunConfig;
use ssr_packager::error::Result;
use ssr_packager::output::{DryRunInfo, write_stderr_line};
use ssr_packager::pipeline::{PipelineContext, run_packaging};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &SystemBuildRunner, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, runner: &dyn BuildRunner, stderr: &mut dyn Write) -> Result<()> {
    let config = RunConfig::from_cli(cli)?;

    if cli.dry_run {
        let info = DryRunInfo {
            config: &config,
            verbosity: cli.verbosity,
            quiet: cli.quiet,
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(());
    }

    let context = PipelineContext {
        config: &config,
        runner,
        verbosity: cli.verbosity,
        quiet: cli.quiet,
    };
    run_packaging(&context, stderr)?;
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
