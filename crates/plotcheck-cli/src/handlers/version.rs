//! Version-id command handler

use crate::error::CliResult;
use crate::VersionIdArgs;
use plotcheck::VersionId;

/// Execute the version-id command
pub fn execute_version_id(args: &VersionIdArgs) -> CliResult<()> {
    println!("{}", resolve_version_id(args)?);
    Ok(())
}

/// Build the id from explicit versions, or ask the Python interpreter
pub fn resolve_version_id(args: &VersionIdArgs) -> CliResult<VersionId> {
    let id = match (&args.matplotlib, &args.freetype) {
        (Some(matplotlib), Some(freetype)) => VersionId::from_versions(matplotlib, freetype)?,
        _ => VersionId::detect(&args.python)?,
    };
    Ok(id)
}
