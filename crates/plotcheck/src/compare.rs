//! Summary comparison.
//!
//! Compares a result summary against a baseline summary and reports every
//! difference at once: missing tests, missing fields and mismatched values.

use crate::hash_library::{HashField, HashLibrary};
use crate::result::{PlotcheckError, PlotcheckResult, MISMATCH_DIVIDER};
use crate::summary::Summary;
use crate::value::{FieldValue, ValueMatch};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// One difference between a baseline and a result summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Test identifiers differ
    TestSet {
        /// Tests only in the baseline
        missing_from_result: Vec<String>,
        /// Tests only in the result
        missing_from_baseline: Vec<String>,
    },
    /// Field names of one test differ
    FieldSet {
        /// Test identifier
        test: String,
        /// Fields only in the baseline record
        missing_from_result: Vec<String>,
        /// Fields only in the result record
        missing_from_baseline: Vec<String>,
    },
    /// A field value differs
    Value {
        /// Test identifier
        test: String,
        /// Field name
        field: String,
        /// Baseline value (after patches and hash substitution)
        baseline: FieldValue,
        /// Result value
        result: FieldValue,
        /// Extra detail, e.g. type or pattern errors
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl Mismatch {
    /// Test this mismatch concerns, if it is scoped to one test
    #[must_use]
    pub fn test(&self) -> Option<&str> {
        match self {
            Self::TestSet { .. } => None,
            Self::FieldSet { test, .. } | Self::Value { test, .. } => Some(test),
        }
    }
}

fn write_missing(f: &mut fmt::Formatter<'_>, result: &[String], baseline: &[String]) -> fmt::Result {
    if !result.is_empty() {
        write!(f, "\nKeys {result:?} missing from the result.")?;
    }
    if !baseline.is_empty() {
        write!(f, "\nKeys {baseline:?} missing from the baseline.")?;
    }
    Ok(())
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TestSet {
                missing_from_result,
                missing_from_baseline,
            } => {
                f.write_str("Test names are not identical.")?;
                write_missing(f, missing_from_result, missing_from_baseline)
            }
            Self::FieldSet {
                test,
                missing_from_result,
                missing_from_baseline,
            } => {
                write!(f, "Summary for {test} is not identical.")?;
                write_missing(f, missing_from_result, missing_from_baseline)
            }
            Self::Value {
                test,
                field,
                baseline,
                result,
                note,
            } => {
                writeln!(f, "Summary item {field} for {test} does not match.")?;
                write!(f, "Baseline:\n\"{baseline}\"\n\nResult:\n\"{result}\"\n")?;
                if let Some(note) = note {
                    write!(f, "\n{note}\n")?;
                }
                Ok(())
            }
        }
    }
}

/// Every difference found by a comparison
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryDiff {
    /// Mismatches in discovery order
    pub mismatches: Vec<Mismatch>,
}

impl SummaryDiff {
    /// Whether the summaries matched
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Number of mismatches
    #[must_use]
    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    /// Check if there are no mismatches
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Turn a non-empty diff into one aggregated [`PlotcheckError::Match`]
    pub fn into_result(self) -> PlotcheckResult<()> {
        if self.is_match() {
            return Ok(());
        }
        let message = self
            .mismatches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(MISMATCH_DIVIDER);
        Err(PlotcheckError::Match {
            message,
            count: self.mismatches.len(),
        })
    }
}

/// Compares result summaries against baselines
#[derive(Debug, Clone, Default)]
pub struct SummaryComparator {
    baseline_hashes: Option<HashLibrary>,
    result_hashes: Option<HashLibrary>,
}

impl SummaryComparator {
    /// Create a comparator without hash substitution
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitute `baseline_hash` values from this library
    #[must_use]
    pub fn with_baseline_hashes(mut self, library: HashLibrary) -> Self {
        self.baseline_hashes = Some(library);
        self
    }

    /// Substitute `result_hash` values from this library
    #[must_use]
    pub fn with_result_hashes(mut self, library: HashLibrary) -> Self {
        self.result_hashes = Some(library);
        self
    }

    /// Build a comparator from optional library paths; missing files are skipped
    pub fn from_paths(
        baseline_hash_library: Option<&Path>,
        result_hash_library: Option<&Path>,
    ) -> PlotcheckResult<Self> {
        Ok(Self {
            baseline_hashes: HashLibrary::load_optional(baseline_hash_library)?,
            result_hashes: HashLibrary::load_optional(result_hash_library)?,
        })
    }

    /// Compute every difference between `baseline` and `result`.
    ///
    /// Hash substitution only touches a working copy of the baseline. The
    /// baseline hash is replaced before the result hash, and empty libraries
    /// are skipped. Errors are reserved for unusable inputs such as a test
    /// missing from a non-empty hash library.
    pub fn diff(&self, baseline: &Summary, result: &Summary) -> PlotcheckResult<SummaryDiff> {
        let mut diff = SummaryDiff::default();

        let baseline_tests: BTreeSet<&str> = baseline.test_names().collect();
        let result_tests: BTreeSet<&str> = result.test_names().collect();
        if baseline_tests != result_tests {
            diff.mismatches.push(Mismatch::TestSet {
                missing_from_result: difference(&baseline_tests, &result_tests),
                missing_from_baseline: difference(&result_tests, &baseline_tests),
            });
        }

        for test in baseline_tests.intersection(&result_tests) {
            let (Some(base_record), Some(result_record)) = (baseline.get(test), result.get(test))
            else {
                continue;
            };

            let mut expected = base_record.clone();
            if let Some(library) = active(self.baseline_hashes.as_ref()) {
                library.substitute(test, &mut expected, HashField::Baseline)?;
            }
            if let Some(library) = active(self.result_hashes.as_ref()) {
                library.substitute(test, &mut expected, HashField::Result)?;
            }

            let expected_fields: BTreeSet<&str> = expected.keys().map(String::as_str).collect();
            let result_fields: BTreeSet<&str> = result_record.keys().map(String::as_str).collect();
            if expected_fields != result_fields {
                diff.mismatches.push(Mismatch::FieldSet {
                    test: (*test).to_string(),
                    missing_from_result: difference(&expected_fields, &result_fields),
                    missing_from_baseline: difference(&result_fields, &expected_fields),
                });
                continue;
            }

            for (field, base_value) in &expected {
                let result_value = &result_record[field.as_str()];
                let note = match base_value.compare(result_value) {
                    ValueMatch::Equal => continue,
                    ValueMatch::ValueMismatch => None,
                    ValueMatch::TypeMismatch { baseline, result } => {
                        Some(format!("Types are not equal ({baseline} vs {result})."))
                    }
                    ValueMatch::InvalidPattern { message } => {
                        Some(format!("Baseline pattern is invalid: {message}"))
                    }
                };
                diff.mismatches.push(Mismatch::Value {
                    test: (*test).to_string(),
                    field: field.clone(),
                    baseline: base_value.clone(),
                    result: result_value.clone(),
                    note,
                });
            }
        }

        debug!(
            tests = baseline_tests.len(),
            mismatches = diff.len(),
            "compared summaries"
        );
        Ok(diff)
    }

    /// Compare, failing with one aggregated error listing every mismatch
    pub fn compare(&self, baseline: &Summary, result: &Summary) -> PlotcheckResult<()> {
        let diff = self.diff(baseline, result)?;
        if diff.is_match() {
            info!(tests = result.len(), "summaries match");
        }
        diff.into_result()
    }
}

/// An empty library (e.g. one about to be regenerated) substitutes nothing
fn active(library: Option<&HashLibrary>) -> Option<&HashLibrary> {
    library.filter(|lib| !lib.is_empty())
}

fn difference(left: &BTreeSet<&str>, right: &BTreeSet<&str>) -> Vec<String> {
    left.difference(right).map(|s| (*s).to_string()).collect()
}

/// Compare two summaries, optionally substituting hashes from library files
pub fn diff_summary(
    baseline: &Summary,
    result: &Summary,
    baseline_hash_library: Option<&Path>,
    result_hash_library: Option<&Path>,
) -> PlotcheckResult<()> {
    SummaryComparator::from_paths(baseline_hash_library, result_hash_library)?
        .compare(baseline, result)
}
