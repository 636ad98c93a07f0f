//! Plotcheck: summary regression checks for image-comparison test suites
//!
//! The plotting-test plugin writes a JSON summary per run: one record per
//! test with its status, image hashes and image paths. Plotcheck compares
//! such a summary against a stored baseline, tolerating rendering-environment
//! drift through explicit patch files and per-version hash libraries.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ SubtestRunner│──►│ child process│──►│ results.json │
//! └──────┬───────┘   └──────────────┘   └──────┬───────┘
//!        │ baseline + <name>_<id>.patch.json   │
//!        ▼                                     ▼
//! ┌────────────────────────────────────────────────────┐
//! │ SummaryComparator (hash libraries, REGEX: fields)  │
//! └─────────────────────────┬──────────────────────────┘
//!                           ▼
//!                    assert_images_exist
//! ```
//!
//! # Example
//!
//! ```
//! use plotcheck::{Summary, SummaryComparator};
//!
//! let baseline = Summary::from_json_str(r#"{"t1": {"img": "REGEX:run\\d+/a.png"}}"#)?;
//! let result = Summary::from_json_str(r#"{"t1": {"img": "run42/a.png"}}"#)?;
//! SummaryComparator::new().compare(&baseline, &result)?;
//! # Ok::<(), plotcheck::PlotcheckError>(())
//! ```

#![warn(missing_docs)]

mod compare;
mod existence;
mod hash_library;
mod result;
mod subtest;
mod summary;
mod value;
mod version;

pub use compare::{diff_summary, Mismatch, SummaryComparator, SummaryDiff};
pub use existence::{assert_default_images_exist, assert_images_exist, IMAGE_FIELDS};
pub use hash_library::{replace_hash, HashField, HashLibrary, STATUS_MSG};
pub use result::{PlotcheckError, PlotcheckResult, MISMATCH_DIVIDER};
pub use subtest::{
    ChildExit, ChildLauncher, SubtestCommand, SubtestConfig, SubtestReport, SubtestRunner,
    SummaryFormat, SystemLauncher, RESULTS_FILE,
};
pub use summary::{apply_patch, Patch, Summary, TestRecord};
pub use value::{FieldValue, ValueKind, ValueMatch, REGEX_PREFIX};
pub use version::VersionId;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        apply_patch, assert_images_exist, diff_summary, FieldValue, Patch, PlotcheckError,
        PlotcheckResult, Summary, SummaryComparator, SubtestConfig, SubtestRunner, VersionId,
    };
}
