//! Run configuration resolution.
//!
//! A [`RunConfig`] is computed once at startup from the CLI arguments, the
//! optional project manifest, and today's local date. It is immutable and is
//! passed explicitly to every packaging step.

use crate::cli::Cli;
use crate::error::{PackagerError, Result};
use crate::manifest::{MANIFEST_FILE, Manifest};
use crate::mode::Mode;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;

/// Default root output directory, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "dist-ssr";

/// Directories copied into the staging directory by default.
pub const DEFAULT_COPY_DIRS: &[&str] = &[".nuxt", "static"];

/// Files copied into the staging directory by default, before the mode's
/// environment file.
pub const DEFAULT_COPY_FILES: &[&str] = &["yarn.lock", "package.json", "nuxt.config.js"];

/// Inputs to configuration resolution that come from the command line.
#[derive(Debug, Clone)]
pub struct ConfigRequest {
    /// Raw mode argument.
    pub mode: String,
    /// Project root.
    pub project_dir: Utf8PathBuf,
    /// Explicit root output directory, overriding the manifest.
    pub output_dir: Option<Utf8PathBuf>,
}

/// Immutable configuration for a single packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    mode: Mode,
    package_manager: String,
    project_dir: Utf8PathBuf,
    root_output_dir: Utf8PathBuf,
    staging_dir_name: String,
    copy_dirs: Vec<String>,
    copy_files: Vec<String>,
}

impl RunConfig {
    /// Resolve the configuration for a CLI invocation.
    ///
    /// The project directory defaults to the current directory; a relative
    /// project directory is taken relative to it. The staging name uses
    /// today's local date.
    ///
    /// # Errors
    ///
    /// Returns an error if the mode is unrecognised, the current directory
    /// is not valid UTF-8, the project manifest is invalid, or the output
    /// directory overlaps the project.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_dir = match &cli.project_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => current_dir()?.join(dir),
            None => current_dir()?,
        };
        let manifest = Manifest::load(&project_dir)?;
        let request = ConfigRequest {
            mode: cli.mode.clone(),
            project_dir,
            output_dir: cli.output_dir.clone(),
        };

        Self::resolve(&request, &manifest, today())
    }

    /// Resolve the configuration from explicit inputs.
    ///
    /// Output directory precedence: `request.output_dir`, then
    /// `manifest.output_dir`, then [`DEFAULT_OUTPUT_DIR`]. Relative output
    /// directories are joined onto the project root.
    ///
    /// Copy entries must be plain relative names such as `static` or
    /// `config/app.json` so that each lands at `<staging>/<entry>`. The
    /// output directory is cleared on every run, so it may not contain the
    /// project root or overlap any copy source. Paths are compared lexically;
    /// symlinks are not resolved.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::UnknownMode`] for an unrecognised mode,
    /// [`PackagerError::InvalidManifest`] for an absolute, empty, or
    /// non-normal copy entry, and [`PackagerError::OutputDirInvalid`] when
    /// the output directory would clear project files.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use chrono::NaiveDate;
    /// use ssr_packager::config::{ConfigRequest, RunConfig};
    /// use ssr_packager::manifest::Manifest;
    ///
    /// let request = ConfigRequest {
    ///     mode: "dev".to_owned(),
    ///     project_dir: Utf8PathBuf::from("/srv/site"),
    ///     output_dir: None,
    /// };
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date");
    /// let config = RunConfig::resolve(&request, &Manifest::default(), date)?;
    ///
    /// assert_eq!(config.staging_dir_name(), "en_dev_20240305");
    /// assert_eq!(config.staging_dir(), "/srv/site/dist-ssr/en_dev_20240305");
    /// # Ok::<(), ssr_packager::error::PackagerError>(())
    /// ```
    pub fn resolve(request: &ConfigRequest, manifest: &Manifest, date: NaiveDate) -> Result<Self> {
        let mode = Mode::parse(&request.mode)?;

        let output_dir = request
            .output_dir
            .clone()
            .or_else(|| manifest.output_dir.clone())
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR));
        let root_output_dir = request.project_dir.join(output_dir);

        let copy_dirs = manifest
            .copy_dirs
            .clone()
            .unwrap_or_else(|| DEFAULT_COPY_DIRS.iter().map(|&d| d.to_owned()).collect());

        let mut copy_files = manifest
            .copy_files
            .clone()
            .unwrap_or_else(|| DEFAULT_COPY_FILES.iter().map(|&f| f.to_owned()).collect());
        if !copy_files.iter().any(|f| f == mode.env_file()) {
            copy_files.push(mode.env_file().to_owned());
        }

        for entry in copy_dirs.iter().chain(&copy_files) {
            validate_entry(entry).map_err(|reason| PackagerError::InvalidManifest {
                path: request.project_dir.join(MANIFEST_FILE),
                reason,
            })?;
        }
        validate_output_dir(
            &request.project_dir,
            &root_output_dir,
            copy_dirs.iter().chain(&copy_files),
        )?;

        let package_manager = manifest
            .package_manager
            .clone()
            .unwrap_or_else(|| package_manager_program().to_owned());

        Ok(Self {
            mode,
            package_manager,
            project_dir: request.project_dir.clone(),
            root_output_dir,
            staging_dir_name: staging_dir_name(mode, date),
            copy_dirs,
            copy_files,
        })
    }

    /// The selected build mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The package-manager program that runs the build script.
    #[must_use]
    pub fn package_manager(&self) -> &str {
        &self.package_manager
    }

    /// The package-manager script for the selected mode.
    #[must_use]
    pub const fn build_script(&self) -> &'static str {
        self.mode.build_script()
    }

    /// Arguments passed to the package manager.
    #[must_use]
    pub fn build_args(&self) -> [&str; 2] {
        ["run", self.build_script()]
    }

    /// The project root that sources are resolved against.
    #[must_use]
    pub fn project_dir(&self) -> &Utf8Path {
        &self.project_dir
    }

    /// The root output directory containing all staging directories.
    #[must_use]
    pub fn root_output_dir(&self) -> &Utf8Path {
        &self.root_output_dir
    }

    /// The staging directory name, `en_<mode>_<YYYYMMDD>`.
    #[must_use]
    pub fn staging_dir_name(&self) -> &str {
        &self.staging_dir_name
    }

    /// The full path of the staging directory.
    #[must_use]
    pub fn staging_dir(&self) -> Utf8PathBuf {
        self.root_output_dir.join(&self.staging_dir_name)
    }

    /// Directories copied recursively, in order.
    #[must_use]
    pub fn copy_dirs(&self) -> &[String] {
        &self.copy_dirs
    }

    /// Files copied byte-for-byte, in order.
    #[must_use]
    pub fn copy_files(&self) -> &[String] {
        &self.copy_files
    }

    /// Resolve a project-relative name to an absolute source path.
    #[must_use]
    pub fn source_path(&self, name: &str) -> Utf8PathBuf {
        self.project_dir.join(name)
    }
}

/// Compute the staging directory name for a mode and date.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ssr_packager::config::staging_dir_name;
/// use ssr_packager::mode::Mode;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date");
/// assert_eq!(staging_dir_name(Mode::Prod, date), "en_prod_20240305");
/// ```
#[must_use]
pub fn staging_dir_name(mode: Mode, date: NaiveDate) -> String {
    format!("en_{mode}_{}", date.format("%Y%m%d"))
}

/// Return the package-manager executable name for the host platform.
#[must_use]
pub const fn package_manager_program() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "npm.cmd"
    }
    #[cfg(not(target_os = "windows"))]
    {
        "npm"
    }
}

/// Today's date in the local time zone.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn validate_entry(entry: &str) -> std::result::Result<(), String> {
    let path = Utf8Path::new(entry);
    if entry.is_empty() {
        return Err("copy entries must not be empty".to_owned());
    }
    if path
        .components()
        .all(|component| matches!(component, Utf8Component::Normal(_)))
    {
        Ok(())
    } else {
        Err(format!(
            "copy entry `{entry}` must be a relative path without `.` or `..` components"
        ))
    }
}

fn validate_output_dir<'a>(
    project_dir: &Utf8Path,
    root_output_dir: &Utf8Path,
    entries: impl IntoIterator<Item = &'a String>,
) -> Result<()> {
    let project = normalize(project_dir);
    let output = normalize(root_output_dir);
    let reject = |reason: String| PackagerError::OutputDirInvalid {
        path: root_output_dir.to_owned(),
        reason,
    };

    if project.starts_with(&output) {
        return Err(reject(format!("it contains the project root {project_dir}")));
    }
    if leading_parents(&output) > leading_parents(&project) {
        return Err(reject(format!(
            "it escapes the relative project root {project_dir}"
        )));
    }
    for entry in entries {
        let source = project.join(entry);
        if output.starts_with(&source) || source.starts_with(&output) {
            return Err(reject(format!("it overlaps the copy source `{entry}`")));
        }
    }
    Ok(())
}

fn leading_parents(path: &Utf8Path) -> usize {
    path.components()
        .take_while(|component| matches!(component, Utf8Component::ParentDir))
        .count()
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut normalized = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match normalized.components().next_back() {
                Some(Utf8Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_str()),
        }
    }
    normalized
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| PackagerError::ProjectDirInvalid {
        reason: format!("current directory is not valid UTF-8: {e}"),
    })
}
