//! Plotcheck CLI: compare image-comparison test summaries against baselines
//!
//! ## Usage
//!
//! ```bash
//! plotcheck diff baseline.json results.json        # Compare summaries
//! plotcheck patch baseline.json fix.patch.json      # Apply a patch
//! plotcheck check-images results.json -p results/   # Verify image files
//! plotcheck subtest test_default -- -k hybrid       # Run a nested test
//! plotcheck version-id                              # e.g. mpl38_ft261
//! ```

use clap::Parser;
use plotcheck_cli::{
    handlers, init_logging, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, LogFormat,
    ProgressReporter, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_logging(config.verbosity, format);

    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    match run(cli.command, &mut reporter) {
        Ok(()) => ExitCode::SUCCESS,
        // Mismatch details were already printed by the handler
        Err(CliError::Mismatch { .. }) => ExitCode::FAILURE,
        Err(e) => {
            reporter.failure(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, reporter: &mut ProgressReporter) -> CliResult<()> {
    match command {
        Commands::Diff(args) => handlers::execute_diff(reporter, &args),
        Commands::Patch(args) => handlers::execute_patch(reporter, &args),
        Commands::CheckImages(args) => handlers::execute_check_images(reporter, &args),
        Commands::Subtest(args) => handlers::execute_subtest(reporter, &args),
        Commands::VersionId(args) => handlers::execute_version_id(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}
