//! Checks that images referenced by a summary exist on disk.

use crate::result::{PlotcheckError, PlotcheckResult};
use crate::summary::Summary;
use crate::value::FieldValue;
use std::path::Path;
use tracing::trace;

/// Image fields reported by the plotting-test plugin
pub const IMAGE_FIELDS: [&str; 3] = ["baseline_image", "diff_image", "result_image"];

/// Assert every non-null image field in `summary` points at an existing file.
///
/// Paths are relative to `base_path`. Fails on the first missing file. A
/// field the record does not carry counts as not reported.
pub fn assert_images_exist<S: AsRef<str>>(
    summary: &Summary,
    fields: &[S],
    base_path: &Path,
) -> PlotcheckResult<()> {
    for (test, record) in summary.iter() {
        for field in fields {
            let field = field.as_ref();
            let relative = match record.get(field) {
                None | Some(FieldValue::Null) => continue,
                Some(FieldValue::String(p)) => p,
                Some(other) => {
                    return Err(PlotcheckError::contract(
                        test,
                        field,
                        format!("image path must be a string or null, got {}", other.kind()),
                    ))
                }
            };

            let path = base_path.join(relative);
            trace!(test, field, path = %path.display(), "checking image");
            if !path.exists() {
                return Err(PlotcheckError::ImageMissing {
                    test: test.to_string(),
                    field: field.to_string(),
                    path,
                });
            }
        }
    }
    Ok(())
}

/// [`assert_images_exist`] over the default [`IMAGE_FIELDS`]
pub fn assert_default_images_exist(summary: &Summary, base_path: &Path) -> PlotcheckResult<()> {
    assert_images_exist(summary, &IMAGE_FIELDS, base_path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, relative: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"png").unwrap();
    }

    #[test]
    fn test_existing_images_pass() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "t1/result.png");
        touch(temp_dir.path(), "t1/baseline.png");
        let summary = Summary::from_json(json!({
            "t1": {
                "baseline_image": "t1/baseline.png",
                "diff_image": null,
                "result_image": "t1/result.png"
            }
        }))
        .unwrap();

        assert_default_images_exist(&summary, temp_dir.path()).unwrap();
    }

    #[test]
    fn test_null_field_not_checked() {
        let temp_dir = TempDir::new().unwrap();
        let summary = Summary::from_json(json!({
            "t1": {"baseline_image": null, "diff_image": null, "result_image": null}
        }))
        .unwrap();
        assert_default_images_exist(&summary, temp_dir.path()).unwrap();
    }

    #[test]
    fn test_missing_image_fails() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "t1/result.png");
        let summary = Summary::from_json(json!({
            "t1": {"diff_image": "t1/diff.png", "result_image": "t1/result.png"}
        }))
        .unwrap();

        let err = assert_default_images_exist(&summary, temp_dir.path()).unwrap_err();
        assert!(matches!(
            err,
            PlotcheckError::ImageMissing { ref field, .. } if field == "diff_image"
        ));
    }

    #[test]
    fn test_only_named_fields_checked() {
        let temp_dir = TempDir::new().unwrap();
        let summary = Summary::from_json(json!({
            "t1": {"diff_image": "missing.png", "result_image": null}
        }))
        .unwrap();
        assert_images_exist(&summary, &["result_image"], temp_dir.path()).unwrap();
    }

    #[test]
    fn test_non_string_path_is_contract_violation() {
        let summary = Summary::from_json(json!({"t1": {"result_image": 3}})).unwrap();
        let err = assert_default_images_exist(&summary, Path::new(".")).unwrap_err();
        assert!(matches!(err, PlotcheckError::ContractViolation { .. }));
    }
}
