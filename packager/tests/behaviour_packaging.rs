//! Behaviour-driven tests for packaging runs.
//!
//! These scenarios drive the pipeline with a stubbed build runner and check
//! the resulting output tree, and invoke the binary for dry-run output.

mod support;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use ssr_packager::builder::BuildStatus;
use ssr_packager::config::{ConfigRequest, RunConfig};
use ssr_packager::error::PackagerError;
use ssr_packager::manifest::Manifest;
use ssr_packager::pipeline::{PipelineContext, run_packaging};
use ssr_packager::stager::StagedTree;
use ssr_packager::test_utils::StubRunner;
use std::cell::RefCell;
use std::process::{Command, Output};
use support::{ProjectFixture, sorted_entries};

// ---------------------------------------------------------------------------
// Packaging world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PackagingWorld {
    project: RefCell<Option<ProjectFixture>>,
    build_status: RefCell<Option<BuildStatus>>,
    config: RefCell<Option<RunConfig>>,
    result: RefCell<Option<Result<StagedTree, PackagerError>>>,
    config_error: RefCell<Option<PackagerError>>,
    cli_output: RefCell<Option<Output>>,
}

impl PackagingWorld {
    fn root(&self) -> Utf8PathBuf {
        let project = self.project.borrow();
        project.as_ref().expect("project not set").root.clone()
    }

    fn request(&self, mode: &str) -> ConfigRequest {
        ConfigRequest {
            mode: mode.to_owned(),
            project_dir: self.root(),
            output_dir: None,
        }
    }

    fn package(&self, mode: &str) {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date");
        let config = RunConfig::resolve(&self.request(mode), &Manifest::default(), date)
            .expect("config should resolve");
        let status = self.build_status.borrow().expect("build status not set");
        let runner = StubRunner::new(status);

        let context = PipelineContext {
            config: &config,
            runner: &runner,
            verbosity: 0,
            quiet: true,
        };
        let mut stderr = Vec::new();
        let result = run_packaging(&context, &mut stderr);

        self.result.replace(Some(result));
        self.config.replace(Some(config));
    }

    fn staged_path(&self) -> Utf8PathBuf {
        let result = self.result.borrow();
        match result.as_ref().expect("result not set") {
            Ok(staged) => staged.path.clone(),
            Err(err) => panic!("packaging failed: {err}"),
        }
    }
}

#[fixture]
fn packaging_world() -> PackagingWorld {
    PackagingWorld::default()
}

#[given("a project with build artefacts")]
fn given_project(packaging_world: &PackagingWorld) {
    packaging_world
        .project
        .replace(Some(ProjectFixture::new()));
}

#[given("previously packaged output")]
fn given_previous_output(packaging_world: &PackagingWorld) {
    let previous = packaging_world
        .root()
        .join("dist-ssr")
        .join("en_prod_20240101");
    std::fs::create_dir_all(&previous).expect("create previous output");
    std::fs::write(previous.join("package.json"), b"previous").expect("write file");
}

#[given("a build that exits successfully")]
fn given_successful_build(packaging_world: &PackagingWorld) {
    packaging_world
        .build_status
        .replace(Some(BuildStatus::exited(0)));
}

#[given("a build that exits with a failure")]
fn given_failing_build(packaging_world: &PackagingWorld) {
    packaging_world
        .build_status
        .replace(Some(BuildStatus::exited(1)));
}

#[when("the project is packaged in prod mode")]
fn when_packaged_prod(packaging_world: &PackagingWorld) {
    packaging_world.package("prod");
}

#[when("the project is packaged in dev mode")]
fn when_packaged_dev(packaging_world: &PackagingWorld) {
    packaging_world.package("dev");
}

#[when("the configuration is resolved for an unknown mode")]
fn when_unknown_mode(packaging_world: &PackagingWorld) {
    let date = NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date");
    let result = RunConfig::resolve(
        &packaging_world.request("staging"),
        &Manifest::default(),
        date,
    );
    packaging_world.config_error.replace(result.err());
}

#[when("the packager CLI is run with dry-run")]
fn when_cli_dry_run(packaging_world: &PackagingWorld) {
    let root = packaging_world.root();
    let output = Command::new(env!("CARGO_BIN_EXE_ssr-packager"))
        .args(["--dry-run", "--project-dir", root.as_str(), "dev"])
        .output()
        .expect("failed to run ssr-packager");
    packaging_world.cli_output.replace(Some(output));
}

#[then("the staging directory contains the production bundle")]
fn then_production_bundle(packaging_world: &PackagingWorld) {
    let staged = packaging_world.staged_path();
    assert!(staged.ends_with("dist-ssr/en_prod_20240305"));
    assert_eq!(
        sorted_entries(&staged),
        vec![
            ".env.production",
            ".nuxt",
            "nuxt.config.js",
            "package.json",
            "static",
            "yarn.lock",
        ]
    );
}

#[then("the staging directory contains the development environment file")]
fn then_development_env_file(packaging_world: &PackagingWorld) {
    let staged = packaging_world.staged_path();
    assert!(staged.ends_with("dist-ssr/en_dev_20240305"));
    assert!(staged.join(".env.development").is_file());
    assert!(!staged.join(".env.production").exists());
}

#[then("packaging fails with a build error")]
fn then_build_error(packaging_world: &PackagingWorld) {
    let result = packaging_world.result.borrow();
    let result = result.as_ref().expect("result not set");
    assert!(
        matches!(result, Err(PackagerError::BuildFailed { .. })),
        "expected BuildFailed, got {result:?}"
    );
}

#[then("the previous output is untouched")]
fn then_previous_untouched(packaging_world: &PackagingWorld) {
    let output_dir = packaging_world.root().join("dist-ssr");
    assert_eq!(sorted_entries(&output_dir), vec!["en_prod_20240101"]);
    let contents = std::fs::read(output_dir.join("en_prod_20240101/package.json"))
        .expect("previous output should remain");
    assert_eq!(contents, b"previous");

    let config = packaging_world.config.borrow();
    let config = config.as_ref().expect("config not set");
    assert!(!config.staging_dir().exists());
}

#[then("configuration fails with an unknown mode error")]
fn then_unknown_mode_error(packaging_world: &PackagingWorld) {
    let err = packaging_world.config_error.borrow();
    let err = err.as_ref().expect("expected a configuration error");
    assert!(
        matches!(err, PackagerError::UnknownMode { mode } if mode == "staging"),
        "unexpected error: {err:?}"
    );
}

#[then("the CLI exits successfully")]
fn then_cli_exits_successfully(packaging_world: &PackagingWorld) {
    let output = packaging_world.cli_output.borrow();
    let output = output.as_ref().expect("output not set");
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[then("dry-run output is shown")]
fn then_dry_run_output(packaging_world: &PackagingWorld) {
    let output = packaging_world.cli_output.borrow();
    let output = output.as_ref().expect("output not set");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(stderr.contains("Dry run - no files will be modified"));
    assert!(stderr.contains("run build:dev"));
    assert!(stderr.contains("en_dev_"));
    assert!(stderr.contains(".env.development"));
}

#[then("no output directory is created")]
fn then_no_output_dir(packaging_world: &PackagingWorld) {
    assert!(!packaging_world.root().join("dist-ssr").exists());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

// Do not reorder scenarios in tests/features/packager.feature; bindings are
// index-based.
#[scenario(path = "tests/features/packager.feature", index = 0)]
fn scenario_successful_build_is_staged(packaging_world: PackagingWorld) {
    let _ = packaging_world;
}

#[scenario(path = "tests/features/packager.feature", index = 1)]
fn scenario_failed_build_leaves_output(packaging_world: PackagingWorld) {
    let _ = packaging_world;
}

#[scenario(path = "tests/features/packager.feature", index = 2)]
fn scenario_dev_build_ships_dev_env(packaging_world: PackagingWorld) {
    let _ = packaging_world;
}

#[scenario(path = "tests/features/packager.feature", index = 3)]
fn scenario_unknown_mode_is_rejected(packaging_world: PackagingWorld) {
    let _ = packaging_world;
}

#[scenario(path = "tests/features/packager.feature", index = 4)]
fn scenario_dry_run_shows_configuration(packaging_world: PackagingWorld) {
    let _ = packaging_world;
}
