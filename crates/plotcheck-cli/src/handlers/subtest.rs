//! Subtest command handler

use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::SubtestArgs;
use plotcheck::{PlotcheckError, SubtestConfig, SubtestRunner, VersionId};
use std::path::{Path, PathBuf};

/// Execute the subtest command
pub fn execute_subtest(reporter: &mut ProgressReporter, args: &SubtestArgs) -> CliResult<()> {
    let config = build_subtest_config(args)?;
    let work_dir = args
        .work_dir
        .clone()
        .unwrap_or_else(|| default_work_dir(&args.name));

    tracing::debug!(work_dir = %work_dir.display(), "running subtest {}", args.name);
    let runner = SubtestRunner::new(config);
    reporter.start_spinner(&format!("Running subtest {}", args.name));
    let outcome = runner.run(&args.name, &work_dir, &args.runner_args);
    reporter.finish_spinner();

    match outcome {
        Ok(report) => {
            match report.compared_tests {
                Some(count) => reporter.success(&format!(
                    "{}: {count} tests match the baseline ({})",
                    args.name, report.exit
                )),
                None => reporter.success(&format!(
                    "{}: baseline regenerated in {}",
                    args.name,
                    report.results_path.display()
                )),
            }
            if let Some(patch) = report.patch {
                reporter.info(&format!("Applied {}", patch.display()));
            }
            Ok(())
        }
        Err(PlotcheckError::Match { message, count }) => {
            reporter.failure(&format!("{}: summary differs from baseline", args.name));
            reporter.detail(&message);
            reporter.info(&format!("Results kept in {}", work_dir.display()));
            Err(CliError::Mismatch { count })
        }
        Err(e) => Err(e.into()),
    }
}

/// Load the config file and apply command-line overrides
pub fn build_subtest_config(args: &SubtestArgs) -> CliResult<SubtestConfig> {
    if !args.config.exists() {
        return Err(CliError::config(format!(
            "{} not found; pass --config <file>",
            args.config.display()
        )));
    }
    let mut config = SubtestConfig::load(&args.config)?;
    if args.pass {
        config.xfail = false;
    }
    config.update_baseline |= args.update_baseline;
    config.update_summary |= args.update_summary;
    if let Some(id) = &args.version_id {
        config.version_id = Some(id.parse()?);
    }
    if config.version_id.is_none() {
        let python = args
            .python
            .clone()
            .unwrap_or_else(|| detection_interpreter(&config.runner));
        let id = VersionId::detect(&python)?;
        tracing::info!(%id, python, "detected version id");
        config.version_id = Some(id);
    }
    Ok(config)
}

/// Runner program when it is a Python interpreter, otherwise `python`
#[must_use]
pub fn detection_interpreter(runner: &[String]) -> String {
    runner
        .first()
        .filter(|program| {
            Path::new(program.as_str())
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("python"))
        })
        .cloned()
        .unwrap_or_else(|| "python".to_string())
}

/// Per-process scratch directory under the system temp dir
#[must_use]
pub fn default_work_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("plotcheck-{name}-{}", std::process::id()))
}
