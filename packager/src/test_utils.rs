//! Shared test utilities for the packager crate.

use crate::builder::{BuildRunner, BuildStatus};
use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::io;

/// A recorded build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// The program that was run.
    pub program: String,
    /// The arguments passed to the program.
    pub args: Vec<String>,
    /// The working directory of the invocation.
    pub current_dir: Utf8PathBuf,
}

#[derive(Debug, Clone, Copy)]
enum StubOutcome {
    Exit(BuildStatus),
    SpawnFailure,
}

/// A stub implementation of `BuildRunner` for testing.
///
/// Records every invocation and returns a predefined outcome without
/// spawning a process.
#[derive(Debug)]
pub struct StubRunner {
    outcome: StubOutcome,
    calls: RefCell<Vec<RecordedCall>>,
}

impl StubRunner {
    /// Creates a stub that reports the given exit status.
    #[must_use]
    pub const fn new(status: BuildStatus) -> Self {
        Self {
            outcome: StubOutcome::Exit(status),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Creates a stub whose build process cannot be spawned.
    #[must_use]
    pub const fn spawn_failure() -> Self {
        Self {
            outcome: StubOutcome::SpawnFailure,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Returns the invocations recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl BuildRunner for StubRunner {
    fn run(&self, program: &str, args: &[&str], current_dir: &Utf8Path) -> Result<BuildStatus> {
        self.calls.borrow_mut().push(RecordedCall {
            program: program.to_owned(),
            args: args.iter().map(|&a| a.to_owned()).collect(),
            current_dir: current_dir.to_owned(),
        });

        match self.outcome {
            StubOutcome::Exit(status) => Ok(status),
            StubOutcome::SpawnFailure => Err(PackagerError::BuildSpawn {
                program: program.to_owned(),
                source: io::Error::new(io::ErrorKind::NotFound, "program not found"),
            }),
        }
    }
}
