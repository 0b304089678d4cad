//! Packager library for server-rendered web project deployments.
//!
//! This crate runs a project's package-manager build script and assembles the
//! resulting artefacts, together with a fixed set of auxiliary files, into a
//! mode- and date-tagged staging directory. It is used by the `ssr-packager`
//! CLI binary and can be consumed programmatically for testing.
//!
//! # Modules
//!
//! - [`builder`] - Build script invocation with streamed output
//! - [`cleaner`] - Best-effort clearing of previous output
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Immutable run configuration
//! - [`copier`] - Forced recursive directory and whole-file copies
//! - [`error`] - Semantic error types
//! - [`manifest`] - Optional `packager.toml` project overrides
//! - [`mode`] - Build mode selection
//! - [`output`] - Progress and dry-run formatting
//! - [`pipeline`] - Build and staging orchestration
//! - [`stager`] - Staging directory assembly

pub mod builder;
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod copier;
pub mod error;
pub mod manifest;
pub mod mode;
pub mod output;
pub mod pipeline;
pub mod stager;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
