//! Diff command handler

use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::{DiffArgs, DiffFormat};
use plotcheck::{apply_patch, Summary, SummaryComparator, SummaryDiff, MISMATCH_DIVIDER};
use std::path::Path;

/// Execute the diff command
pub fn execute_diff(reporter: &ProgressReporter, args: &DiffArgs) -> CliResult<()> {
    let baseline = load_baseline(&args.baseline, args.patch.as_deref())?;
    let result = Summary::load(&args.result)?;

    let comparator = SummaryComparator::from_paths(
        args.baseline_hash_library.as_deref(),
        args.result_hash_library.as_deref(),
    )?;
    let diff = comparator.diff(&baseline, &result)?;
    tracing::debug!(mismatches = diff.len(), tests = result.len(), "diff complete");

    match args.format {
        DiffFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
        DiffFormat::Text => {
            if diff.is_match() {
                reporter.success(&format!("{} tests match the baseline", result.len()));
            } else {
                reporter.failure(&format!(
                    "{} differs from {}",
                    args.result.display(),
                    args.baseline.display()
                ));
                reporter.detail(&render_mismatches(&diff));
            }
        }
    }

    if diff.is_match() {
        Ok(())
    } else {
        Err(CliError::Mismatch { count: diff.len() })
    }
}

/// Load a baseline summary, applying `patch` when given
pub fn load_baseline(path: &Path, patch: Option<&Path>) -> CliResult<Summary> {
    let baseline = Summary::load(path)?;
    match patch {
        Some(patch_file) => Ok(apply_patch(baseline, patch_file)?),
        None => Ok(baseline),
    }
}

/// Human-readable listing of every mismatch
#[must_use]
pub fn render_mismatches(diff: &SummaryDiff) -> String {
    diff.mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(MISMATCH_DIVIDER)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, json: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, json).unwrap();
        path
    }

    fn args(baseline: &Path, result: &Path) -> DiffArgs {
        DiffArgs {
            baseline: baseline.to_path_buf(),
            result: result.to_path_buf(),
            baseline_hash_library: None,
            result_hash_library: None,
            patch: None,
            format: DiffFormat::Text,
        }
    }

    #[test]
    fn test_matching_summaries() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "b.json", r#"{"t1": {"a": 1}}"#);
        let res = write(&dir, "r.json", r#"{"t1": {"a": 1}}"#);
        execute_diff(&ProgressReporter::new(false, true), &args(&base, &res)).unwrap();
    }

    #[test]
    fn test_mismatch_count() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "b.json", r#"{"t1": {"a": 1, "b": "x"}}"#);
        let res = write(&dir, "r.json", r#"{"t1": {"a": 2, "b": "y"}}"#);
        let err = execute_diff(&ProgressReporter::new(false, true), &args(&base, &res)).unwrap_err();
        assert!(matches!(err, CliError::Mismatch { count: 2 }));
    }

    #[test]
    fn test_patch_fixes_mismatch() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "b.json", r#"{"t1": {"a": 1}}"#);
        let res = write(&dir, "r.json", r#"{"t1": {"a": 2}}"#);
        let patch = write(&dir, "b_mpl38_ft261.patch.json", r#"{"t1": {"a": 2}}"#);
        let mut diff_args = args(&base, &res);
        diff_args.patch = Some(patch);
        execute_diff(&ProgressReporter::new(false, true), &diff_args).unwrap();
    }

    #[test]
    fn test_render_mismatches() {
        let baseline = Summary::from_json_str(r#"{"t1": {"a": 1}, "t2": {"a": 1}}"#).unwrap();
        let result = Summary::from_json_str(r#"{"t1": {"a": 2}}"#).unwrap();
        let diff = SummaryComparator::new().diff(&baseline, &result).unwrap();
        let text = render_mismatches(&diff);
        assert!(text.contains("Test names are not identical."));
        assert!(text.contains("Summary item a for t1 does not match."));
        assert!(text.contains("----------"));
    }

    #[test]
    fn test_missing_baseline_file() {
        let dir = TempDir::new().unwrap();
        let err = load_baseline(&dir.path().join("nope.json"), None).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
