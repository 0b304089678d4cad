//! Optional per-project overrides read from `packager.toml`.
//!
//! The manifest lives at the project root. Every key is optional; missing
//! keys fall back to the built-in layout. Unknown keys are rejected so that
//! typos surface instead of being ignored.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "packager.toml";

/// Overrides parsed from `packager.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Root output directory, relative to the project root.
    pub output_dir: Option<Utf8PathBuf>,
    /// Directories copied recursively into the staging directory.
    pub copy_dirs: Option<Vec<String>>,
    /// Files copied into the staging directory.
    pub copy_files: Option<Vec<String>>,
    /// Package-manager program used to run the build script.
    pub package_manager: Option<String>,
}

impl Manifest {
    /// Load the manifest from `project_dir`, returning defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidManifest`] if the file exists but
    /// cannot be read or parsed.
    pub fn load(project_dir: &Utf8Path) -> Result<Self> {
        let path = project_dir.join(MANIFEST_FILE);

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no manifest at {path}; using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(PackagerError::InvalidManifest {
                    path,
                    reason: e.to_string(),
                });
            }
        };

        debug!("loading manifest from {path}");
        Self::parse(&contents).map_err(|reason| PackagerError::InvalidManifest { path, reason })
    }

    /// Parse manifest contents.
    ///
    /// # Errors
    ///
    /// Returns a description of the TOML error on failure.
    pub fn parse(contents: &str) -> std::result::Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("TOML parse error: {e}"))
    }
}
