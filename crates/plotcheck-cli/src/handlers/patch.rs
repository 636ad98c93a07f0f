//! Patch command handler

use crate::error::CliResult;
use crate::output::ProgressReporter;
use crate::PatchArgs;
use plotcheck::{apply_patch, Summary};

/// Execute the patch command
pub fn execute_patch(reporter: &ProgressReporter, args: &PatchArgs) -> CliResult<()> {
    let summary = apply_patch(Summary::load(&args.summary)?, &args.patch)?;

    match &args.output {
        Some(path) => {
            summary.save(path)?;
            reporter.success(&format!("Patched summary written to {}", path.display()));
        }
        None => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}
