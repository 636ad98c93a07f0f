//! Check-images command handler

use crate::error::CliResult;
use crate::output::ProgressReporter;
use crate::CheckImagesArgs;
use plotcheck::{assert_images_exist, Summary, IMAGE_FIELDS};

/// Execute the check-images command
pub fn execute_check_images(reporter: &ProgressReporter, args: &CheckImagesArgs) -> CliResult<()> {
    let summary = Summary::load(&args.summary)?;
    let fields = image_fields(&args.fields);
    assert_images_exist(&summary, &fields, &args.path)?;
    reporter.success(&format!(
        "All reported images of {} tests exist under {}",
        summary.len(),
        args.path.display()
    ));
    Ok(())
}

/// Requested fields, or the default image fields when none were given
#[must_use]
pub fn image_fields(requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        IMAGE_FIELDS.iter().map(|f| (*f).to_string()).collect()
    } else {
        requested.to_vec()
    }
}
