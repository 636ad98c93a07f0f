//! Nested test-runner invocation.
//!
//! Runs the plotting-test plugin inside a child test process, checks its exit
//! status, then compares the JSON summary it writes against a stored baseline
//! and verifies that the reported images exist.
//!
//! Regeneration of baselines and summaries is controlled by
//! [`SubtestConfig`] fields rather than process-wide switches, so several
//! runs can share one process.

use crate::compare::SummaryComparator;
use crate::existence::assert_default_images_exist;
use crate::result::{PlotcheckError, PlotcheckResult};
use crate::summary::{apply_patch, read_text, Summary};
use crate::version::VersionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Name of the JSON summary the plugin writes into the results directory
pub const RESULTS_FILE: &str = "results.json";

/// Summary report formats the plugin can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryFormat {
    /// `results.json`
    Json,
    /// Interactive HTML report
    Html,
    /// HTML report without JavaScript
    BasicHtml,
}

impl SummaryFormat {
    /// Flag value understood by the plugin
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
            Self::BasicHtml => "basic-html",
        }
    }
}

/// Settings for a nested test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtestConfig {
    /// Test runner program followed by its leading arguments
    pub runner: Vec<String>,
    /// Test file handed to the runner
    pub test_file: PathBuf,
    /// Directory of baseline summaries and patch files
    pub baseline_dir: PathBuf,
    /// Directory of baseline hash libraries, one file per version id
    pub hash_library_dir: Option<PathBuf>,
    /// Directory of result hash libraries, one file per version id
    pub result_hash_library_dir: Option<PathBuf>,
    /// Rendering environment; selects hash libraries and patch files
    pub version_id: Option<VersionId>,
    /// Extra summary formats (JSON is always generated)
    pub summaries: BTreeSet<SummaryFormat>,
    /// Whether the nested run is expected to fail
    pub xfail: bool,
    /// Regenerate baseline images and hashes instead of comparing
    pub update_baseline: bool,
    /// Overwrite the baseline summary with the generated one
    pub update_summary: bool,
}

impl Default for SubtestConfig {
    fn default() -> Self {
        Self {
            runner: vec!["python".to_string(), "-m".to_string(), "pytest".to_string()],
            test_file: PathBuf::from("subtest.py"),
            baseline_dir: PathBuf::from("summaries"),
            hash_library_dir: None,
            result_hash_library_dir: None,
            version_id: None,
            summaries: BTreeSet::new(),
            xfail: true,
            update_baseline: false,
            update_summary: false,
        }
    }
}

impl SubtestConfig {
    /// Create a config running `test_file`
    #[must_use]
    pub fn new(test_file: impl Into<PathBuf>) -> Self {
        Self {
            test_file: test_file.into(),
            ..Self::default()
        }
    }

    /// Load a YAML config; relative paths resolve against the file's directory
    pub fn load(path: &Path) -> PlotcheckResult<Self> {
        let config: Self = serde_yaml_ng::from_str(&read_text(path)?)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.relative_to(base).validated()
    }

    fn validated(self) -> PlotcheckResult<Self> {
        if self.runner.is_empty() {
            return Err(PlotcheckError::config("runner must name a program"));
        }
        Ok(self)
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let join = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.test_file = join(self.test_file);
        self.baseline_dir = join(self.baseline_dir);
        self.hash_library_dir = self.hash_library_dir.map(join);
        self.result_hash_library_dir = self.result_hash_library_dir.map(join);
        self
    }

    /// Set the runner program and its leading arguments
    #[must_use]
    pub fn with_runner<I, S>(mut self, runner: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runner = runner.into_iter().map(Into::into).collect();
        self
    }

    /// Set the baseline summary directory
    #[must_use]
    pub fn with_baseline_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.baseline_dir = dir.into();
        self
    }

    /// Set the baseline hash library directory
    #[must_use]
    pub fn with_hash_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.hash_library_dir = Some(dir.into());
        self
    }

    /// Set the result hash library directory
    #[must_use]
    pub fn with_result_hash_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.result_hash_library_dir = Some(dir.into());
        self
    }

    /// Set the rendering environment
    #[must_use]
    pub fn with_version_id(mut self, id: VersionId) -> Self {
        self.version_id = Some(id);
        self
    }

    /// Request an extra summary format
    #[must_use]
    pub fn with_summary(mut self, format: SummaryFormat) -> Self {
        self.summaries.insert(format);
        self
    }

    /// Set whether the nested run should fail
    #[must_use]
    pub const fn with_xfail(mut self, xfail: bool) -> Self {
        self.xfail = xfail;
        self
    }

    /// Enable baseline regeneration
    #[must_use]
    pub const fn with_update_baseline(mut self, update: bool) -> Self {
        self.update_baseline = update;
        self
    }

    /// Enable baseline summary regeneration
    #[must_use]
    pub const fn with_update_summary(mut self, update: bool) -> Self {
        self.update_summary = update;
        self
    }

    /// Baseline hash library for the configured version
    #[must_use]
    pub fn hash_library(&self) -> Option<PathBuf> {
        library_path(self.hash_library_dir.as_deref(), self.version_id.as_ref())
    }

    /// Result hash library for the configured version
    #[must_use]
    pub fn result_hash_library(&self) -> Option<PathBuf> {
        library_path(
            self.result_hash_library_dir.as_deref(),
            self.version_id.as_ref(),
        )
    }

    /// `--mpl-hash-library=<lib>` for runs that compare against hashes
    #[must_use]
    pub fn hash_library_flag(&self) -> Option<String> {
        self.hash_library()
            .map(|lib| format!("--mpl-hash-library={}", lib.display()))
    }

    /// Comma-separated summary formats, always including JSON
    #[must_use]
    pub fn summary_formats(&self) -> String {
        let mut formats = self.summaries.clone();
        formats.insert(SummaryFormat::Json);
        formats
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Build the child command line
    pub fn command(
        &self,
        results_path: &Path,
        extra_args: &[String],
    ) -> PlotcheckResult<SubtestCommand> {
        let (program, leading) = self
            .runner
            .split_first()
            .ok_or_else(|| PlotcheckError::config("runner must name a program"))?;

        let mut args: Vec<String> = leading.to_vec();
        args.push(self.test_file.display().to_string());
        args.push("--mpl".to_string());
        args.push(format!("--mpl-results-path={}", posix(results_path)));
        args.push(format!("--mpl-generate-summary={}", self.summary_formats()));
        if self.update_baseline {
            args.push("--mpl-generate-path=baseline".to_string());
            if let Some(lib) = self.hash_library().filter(|p| p.exists()) {
                args.push(format!("--mpl-generate-hash-library={}", lib.display()));
            }
        }
        args.extend(extra_args.iter().cloned());

        Ok(SubtestCommand {
            program: program.clone(),
            args,
        })
    }
}

fn library_path(dir: Option<&Path>, id: Option<&VersionId>) -> Option<PathBuf> {
    Some(id?.hash_library_path(dir?))
}

fn posix(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

/// A fully built child command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtestCommand {
    /// Program to execute
    pub program: String,
    /// Arguments in order
    pub args: Vec<String>,
}

impl SubtestCommand {
    /// Value of a `--flag=value` argument
    #[must_use]
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args.iter().find_map(|arg| {
            arg.strip_prefix(flag)
                .and_then(|rest| rest.strip_prefix('='))
        })
    }

    /// Whether a bare argument is present
    #[must_use]
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for SubtestCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit status of the child process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

impl ChildExit {
    /// Exit with `code`
    #[must_use]
    pub const fn code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Whether the child exited with status 0
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self.code, Some(0))
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {code}"),
            None => f.write_str("a signal"),
        }
    }
}

/// Starts the child process and waits for it
pub trait ChildLauncher {
    /// Run `command` to completion
    fn launch(&self, command: &SubtestCommand) -> PlotcheckResult<ChildExit>;
}

impl<F> ChildLauncher for F
where
    F: Fn(&SubtestCommand) -> PlotcheckResult<ChildExit>,
{
    fn launch(&self, command: &SubtestCommand) -> PlotcheckResult<ChildExit> {
        self(command)
    }
}

/// Launches real processes, inheriting stdio
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl ChildLauncher for SystemLauncher {
    fn launch(&self, command: &SubtestCommand) -> PlotcheckResult<ChildExit> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .map_err(|e| PlotcheckError::ChildLaunch {
                program: command.program.clone(),
                message: e.to_string(),
            })?;
        Ok(ChildExit {
            code: status.code(),
        })
    }
}

/// What a subtest run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtestReport {
    /// Directory the child wrote results into
    pub results_path: PathBuf,
    /// Child exit status
    pub exit: ChildExit,
    /// Number of tests compared; `None` when regenerating baselines
    pub compared_tests: Option<usize>,
    /// Patch file applied to the baseline, if any
    pub patch: Option<PathBuf>,
}

/// Runs a nested test process and validates its summary
#[derive(Debug, Clone)]
pub struct SubtestRunner<L = SystemLauncher> {
    config: SubtestConfig,
    launcher: L,
}

impl SubtestRunner {
    /// Create a runner launching real processes
    #[must_use]
    pub const fn new(config: SubtestConfig) -> Self {
        Self {
            config,
            launcher: SystemLauncher,
        }
    }
}

impl<L: ChildLauncher> SubtestRunner<L> {
    /// Create a runner with a custom launcher
    #[must_use]
    pub const fn with_launcher(config: SubtestConfig, launcher: L) -> Self {
        Self { config, launcher }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &SubtestConfig {
        &self.config
    }

    /// Run the nested test and check it against `<baseline_dir>/<name>.json`.
    ///
    /// Results go to `<work_dir>/results`, which must not exist yet.
    pub fn run(
        &self,
        baseline_name: &str,
        work_dir: &Path,
        extra_args: &[String],
    ) -> PlotcheckResult<SubtestReport> {
        let results_path = work_dir.join("results");
        fs::create_dir_all(work_dir)?;
        fs::create_dir(&results_path)?;

        let command = self.config.command(&results_path, extra_args)?;
        info!(%command, "running subtest");
        let exit = self.launcher.launch(&command)?;
        debug!(%exit, "subtest finished");

        if self.config.update_baseline {
            expect_exit(exit, false)?;
            info!(results = %results_path.display(), "baseline regenerated");
            return Ok(SubtestReport {
                results_path,
                exit,
                compared_tests: None,
                patch: None,
            });
        }
        expect_exit(exit, self.config.xfail)?;

        let baseline_file = self.config.baseline_dir.join(format!("{baseline_name}.json"));
        let results_file = results_path.join(RESULTS_FILE);
        if self.config.update_summary {
            warn!(baseline = %baseline_file.display(), "overwriting baseline summary");
            if let Some(parent) = baseline_file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&results_file, &baseline_file)?;
        }
        let mut baseline = Summary::load(&baseline_file)?;
        let result = Summary::load(&results_file)?;

        let patch = self
            .config
            .version_id
            .as_ref()
            .map(|id| id.patch_path(&self.config.baseline_dir, baseline_name))
            .filter(|p| p.exists());
        if let Some(patch_file) = &patch {
            info!(patch = %patch_file.display(), "applying version patch");
            baseline = apply_patch(baseline, patch_file)?;
        }

        let baseline_hashes = self.config.hash_library();
        let result_hashes = self.config.result_hash_library();
        SummaryComparator::from_paths(baseline_hashes.as_deref(), result_hashes.as_deref())?
            .compare(&baseline, &result)?;

        assert_default_images_exist(&result, &results_path)?;

        Ok(SubtestReport {
            results_path,
            exit,
            compared_tests: Some(result.len()),
            patch,
        })
    }
}

fn expect_exit(exit: ChildExit, should_fail: bool) -> PlotcheckResult<()> {
    if exit.success() == !should_fail {
        return Ok(());
    }
    Err(PlotcheckError::ChildStatus {
        status: exit.to_string(),
        expected: if should_fail {
            "a non-zero exit status".to_string()
        } else {
            "exit status 0".to_string()
        },
    })
}
