//! Build script invocation.
//!
//! The build runs as a child process of the platform package manager. Its
//! standard output and standard error are relayed line by line while it runs;
//! the caller waits for the child to exit and inspects the exit code.

use crate::config::RunConfig;
use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use log::{debug, warn};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

/// Exit status of a finished build process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStatus {
    code: Option<i32>,
}

impl BuildStatus {
    /// A status carrying the given exit code.
    #[must_use]
    pub const fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// A status for a process terminated without an exit code.
    #[must_use]
    pub const fn signalled() -> Self {
        Self { code: None }
    }

    /// The exit code, if the process exited normally.
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        self.code
    }

    /// Returns `true` only for a zero exit code.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self.code, Some(0))
    }
}

impl From<std::process::ExitStatus> for BuildStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Abstraction for running the build process.
pub trait BuildRunner {
    /// Runs `program` with `args` in `current_dir`, relaying its output as it
    /// arrives, and returns once the process has exited.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::BuildSpawn`] if the process cannot be started,
    /// or an I/O error if waiting on it fails.
    fn run(&self, program: &str, args: &[&str], current_dir: &Utf8Path) -> Result<BuildStatus>;
}

/// Runs the build on the host system, relaying output to this process's
/// stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBuildRunner;

impl BuildRunner for SystemBuildRunner {
    fn run(&self, program: &str, args: &[&str], current_dir: &Utf8Path) -> Result<BuildStatus> {
        let relayed = run_relayed(program, args, current_dir, io::stdout(), io::stderr())?;
        Ok(relayed.status)
    }
}

/// A finished build together with the sinks its output was relayed into.
///
/// A sink is `None` when relaying into it failed; the failure is logged and
/// does not change the build status.
#[derive(Debug)]
pub struct RelayedBuild<O, E> {
    /// Exit status of the build.
    pub status: BuildStatus,
    /// Sink that received the child's stdout.
    pub stdout: Option<O>,
    /// Sink that received the child's stderr.
    pub stderr: Option<E>,
}

/// Spawn `program` and relay its stdout and stderr into the given sinks
/// until it exits.
///
/// # Errors
///
/// Returns [`PackagerError::BuildSpawn`] if the process cannot be started,
/// or an I/O error if waiting on it fails.
pub fn run_relayed<O, E>(
    program: &str,
    args: &[&str],
    current_dir: &Utf8Path,
    stdout: O,
    stderr: E,
) -> Result<RelayedBuild<O, E>>
where
    O: Write + Send + 'static,
    E: Write + Send + 'static,
{
    debug!("spawning {program} {} in {current_dir}", args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .current_dir(current_dir.as_std_path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| PackagerError::BuildSpawn {
            program: program.to_owned(),
            source,
        })?;

    let stdout_relay = child.stdout.take().map(|out| relay_lines(out, stdout));
    let stderr_relay = child.stderr.take().map(|err| relay_lines(err, stderr));

    let status = child.wait()?;
    debug!("{program} exited with {status}");

    Ok(RelayedBuild {
        status: status.into(),
        stdout: stdout_relay.and_then(|relay| finish_relay(relay, "stdout")),
        stderr: stderr_relay.and_then(|relay| finish_relay(relay, "stderr")),
    })
}

/// Forward `reader` to `sink` one line at a time on a background thread.
///
/// Each line is flushed as soon as it is complete, so output appears while
/// the child is still running. Bytes are forwarded verbatim; invalid UTF-8 is
/// not rejected. The thread hands the sink back when the stream closes.
///
/// After the first write failure the rest of the stream is read and
/// discarded, so the child never blocks or dies on a closed pipe; the write
/// error is returned once the stream ends.
pub fn relay_lines<R, W>(reader: R, mut sink: W) -> JoinHandle<io::Result<W>>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();
        let mut write_error = None;
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if write_error.is_none() {
                write_error = sink.write_all(&line).and_then(|()| sink.flush()).err();
            }
        }
        match write_error {
            Some(err) => Err(err),
            None => Ok(sink),
        }
    })
}

fn finish_relay<W>(relay: JoinHandle<io::Result<W>>, stream: &str) -> Option<W> {
    match relay.join() {
        Ok(Ok(sink)) => Some(sink),
        Ok(Err(err)) => {
            warn!("relaying build {stream} failed: {err}");
            None
        }
        Err(_) => {
            warn!("build {stream} relay thread panicked");
            None
        }
    }
}

/// Run the configured build script and check its exit status.
///
/// # Errors
///
/// Returns [`PackagerError::BuildSpawn`] if the package manager cannot be
/// started and [`PackagerError::BuildFailed`] if the script exits with a
/// non-zero code or is terminated by a signal.
pub fn run_build(config: &RunConfig, runner: &dyn BuildRunner) -> Result<BuildStatus> {
    let status = runner.run(
        config.package_manager(),
        &config.build_args(),
        config.project_dir(),
    )?;

    if status.success() {
        Ok(status)
    } else {
        Err(PackagerError::BuildFailed {
            script: config.build_script().to_owned(),
            code: status.code(),
        })
    }
}
