//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Plotcheck: compare image-comparison test summaries against baselines
#[derive(Parser, Debug)]
#[command(name = "plotcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit log events as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare a result summary against a baseline summary
    Diff(DiffArgs),

    /// Apply a patch file to a summary
    Patch(PatchArgs),

    /// Check that images referenced by a summary exist
    CheckImages(CheckImagesArgs),

    /// Run a nested test process and check its summary
    Subtest(SubtestArgs),

    /// Print the rendering-environment version identifier
    VersionId(VersionIdArgs),
}

/// Arguments for the diff command
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Baseline summary JSON
    pub baseline: PathBuf,

    /// Result summary JSON
    pub result: PathBuf,

    /// Hash library replacing `baseline_hash` values in the baseline
    #[arg(long)]
    pub baseline_hash_library: Option<PathBuf>,

    /// Hash library replacing `result_hash` values in the baseline
    #[arg(long)]
    pub result_hash_library: Option<PathBuf>,

    /// Patch applied to the baseline before comparing
    #[arg(long)]
    pub patch: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: DiffFormat,
}

/// Diff output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiffFormat {
    /// Human-readable report
    #[default]
    Text,
    /// Structured JSON on stdout
    Json,
}

/// Arguments for the patch command
#[derive(Parser, Debug)]
pub struct PatchArgs {
    /// Summary JSON to patch
    pub summary: PathBuf,

    /// Patch JSON (test name -> partial record)
    pub patch: PathBuf,

    /// Write the patched summary here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the check-images command
#[derive(Parser, Debug)]
pub struct CheckImagesArgs {
    /// Summary JSON
    pub summary: PathBuf,

    /// Directory image paths are relative to
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Image fields to check (defaults to baseline, diff and result images)
    #[arg(long = "field")]
    pub fields: Vec<String>,
}

/// Arguments for the subtest command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct SubtestArgs {
    /// Baseline summary name (file stem inside the baseline directory)
    pub name: String,

    /// Subtest configuration file
    #[arg(short, long, default_value = "plotcheck.yaml")]
    pub config: PathBuf,

    /// Working directory; `results/` is created inside it
    #[arg(short, long)]
    pub work_dir: Option<PathBuf>,

    /// Expect the nested run to pass
    #[arg(long)]
    pub pass: bool,

    /// Regenerate baseline images and hashes
    #[arg(long)]
    pub update_baseline: bool,

    /// Overwrite the baseline summary with the generated one
    #[arg(long)]
    pub update_summary: bool,

    /// Override the configured version id (e.g. mpl38_ft261)
    #[arg(long)]
    pub version_id: Option<String>,

    /// Interpreter asked for the version id when none is configured
    /// (defaults to the runner program when it is a Python interpreter)
    #[arg(long)]
    pub python: Option<String>,

    /// Extra arguments passed to the test runner
    #[arg(last = true)]
    pub runner_args: Vec<String>,
}

/// Arguments for the version-id command
#[derive(Parser, Debug)]
pub struct VersionIdArgs {
    /// Matplotlib version (e.g. 3.8.2)
    #[arg(long, requires = "freetype")]
    pub matplotlib: Option<String>,

    /// FreeType version (e.g. 2.6.1)
    #[arg(long, requires = "matplotlib")]
    pub freetype: Option<String>,

    /// Python interpreter to query when versions are not given
    #[arg(long, default_value = "python")]
    pub python: String,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
