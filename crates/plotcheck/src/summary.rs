//! Test-result summaries and patch files.
//!
//! A summary maps test identifiers to flat records of scalar fields, as
//! written by the plotting-test plugin's JSON summary report. Patch files
//! have the same shape but only carry the fields they override.

use crate::result::{PlotcheckError, PlotcheckResult};
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Fields of a single test in a summary
pub type TestRecord = BTreeMap<String, FieldValue>;

/// Mapping from test identifier to its record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary {
    tests: BTreeMap<String, TestRecord>,
}

impl Summary {
    /// Create an empty summary
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value, rejecting non-scalar fields
    pub fn from_json(value: serde_json::Value) -> PlotcheckResult<Self> {
        Ok(Self {
            tests: parse_records(value)?,
        })
    }

    /// Parse from JSON text
    pub fn from_json_str(json: &str) -> PlotcheckResult<Self> {
        Self::from_json(serde_json::from_str(json)?)
    }

    /// Load a summary file
    pub fn load(path: &Path) -> PlotcheckResult<Self> {
        let summary = Self::from_json(read_json(path)?)?;
        debug!(path = %path.display(), tests = summary.len(), "loaded summary");
        Ok(summary)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> PlotcheckResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Add or replace a test record
    #[must_use]
    pub fn with_test(mut self, test: impl Into<String>, record: TestRecord) -> Self {
        self.insert(test, record);
        self
    }

    /// Add or replace a test record
    pub fn insert(&mut self, test: impl Into<String>, record: TestRecord) {
        self.tests.insert(test.into(), record);
    }

    /// Get a test record
    #[must_use]
    pub fn get(&self, test: &str) -> Option<&TestRecord> {
        self.tests.get(test)
    }

    /// Get a mutable test record
    pub fn get_mut(&mut self, test: &str) -> Option<&mut TestRecord> {
        self.tests.get_mut(test)
    }

    /// Test identifiers in sorted order
    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        self.tests.keys().map(String::as_str)
    }

    /// Iterate over tests in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TestRecord)> {
        self.tests.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of tests
    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Check if there are no tests
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Overwrite fields named in `patch`, in place.
    ///
    /// Every patched test must already be present. Patched fields missing from
    /// the record are added.
    pub fn apply_patch(&mut self, patch: &Patch) -> PlotcheckResult<()> {
        for (test, fields) in &patch.tests {
            let record = self
                .tests
                .get_mut(test)
                .ok_or_else(|| PlotcheckError::PatchTarget { test: test.clone() })?;
            for (field, value) in fields {
                record.insert(field.clone(), value.clone());
            }
        }
        Ok(())
    }
}

/// Explicit per-environment overrides of baseline fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    tests: BTreeMap<String, TestRecord>,
}

impl Patch {
    /// Create an empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override `field` of `test` with `value`
    #[must_use]
    pub fn with_field(
        mut self,
        test: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.tests
            .entry(test.into())
            .or_default()
            .insert(field.into(), value.into());
        self
    }

    /// Build from a JSON value
    pub fn from_json(value: serde_json::Value) -> PlotcheckResult<Self> {
        Ok(Self {
            tests: parse_records(value)?,
        })
    }

    /// Load a patch file
    pub fn load(path: &Path) -> PlotcheckResult<Self> {
        Self::from_json(read_json(path)?)
    }

    /// Number of patched tests
    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Check if the patch is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

/// Load `patch_file` and apply it to `summary`, returning the patched summary
pub fn apply_patch(mut summary: Summary, patch_file: &Path) -> PlotcheckResult<Summary> {
    let patch = Patch::load(patch_file)?;
    debug!(patch = %patch_file.display(), tests = patch.len(), "applying patch");
    summary.apply_patch(&patch)?;
    Ok(summary)
}

/// Read a text file, mapping a missing file to [`PlotcheckError::FileNotFound`]
pub(crate) fn read_text(path: &Path) -> PlotcheckResult<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PlotcheckError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PlotcheckError::Io(e)
        }
    })
}

/// Read and parse a JSON file
pub(crate) fn read_json(path: &Path) -> PlotcheckResult<serde_json::Value> {
    Ok(serde_json::from_str(&read_text(path)?)?)
}

fn parse_records(value: serde_json::Value) -> PlotcheckResult<BTreeMap<String, TestRecord>> {
    let serde_json::Value::Object(tests) = value else {
        return Err(PlotcheckError::contract(
            "<root>",
            "<root>",
            "summary must be a JSON object",
        ));
    };

    let mut out = BTreeMap::new();
    for (test, record) in tests {
        let serde_json::Value::Object(fields) = record else {
            return Err(PlotcheckError::contract(
                test,
                "<record>",
                "test record must be a JSON object",
            ));
        };
        let mut parsed = TestRecord::new();
        for (field, value) in fields {
            let value = FieldValue::from_json(value).map_err(|kind| {
                PlotcheckError::contract(
                    test.clone(),
                    field.clone(),
                    format!("{kind} values are not supported"),
                )
            })?;
            parsed.insert(field, value);
        }
        out.insert(test, parsed);
    }
    Ok(out)
}
