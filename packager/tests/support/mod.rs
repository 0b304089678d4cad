//! Test support utilities for packager behavioural tests.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// A scratch project laid out like a built server-rendered app.
pub struct ProjectFixture {
    /// Project root.
    pub root: Utf8PathBuf,
    // Keep temp_dir alive for the lifetime of the scenario.
    _temp_dir: TempDir,
}

impl ProjectFixture {
    /// Creates the project with build output, static assets, and the files
    /// shipped alongside them.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let root =
            Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("temp dir path not UTF-8");

        fs::create_dir_all(root.join(".nuxt/dist/server")).expect("create .nuxt");
        fs::write(root.join(".nuxt/dist/server/server.js"), b"server").expect("write file");
        fs::create_dir_all(root.join("static/img")).expect("create static");
        fs::write(root.join("static/img/logo.png"), b"png").expect("write file");
        for file in [
            "yarn.lock",
            "package.json",
            "nuxt.config.js",
            ".env.production",
            ".env.development",
        ] {
            fs::write(root.join(file), file.as_bytes()).expect("write file");
        }

        Self {
            root,
            _temp_dir: temp_dir,
        }
    }
}

/// Returns the sorted names of the entries directly inside `dir`.
pub fn sorted_entries(dir: &Utf8Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap_or_else(|err| panic!("failed to read {dir}: {err}"))
        .map(|entry| {
            entry
                .expect("failed to read entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
