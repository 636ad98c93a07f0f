//! Version-specific image hash libraries.
//!
//! Image hashes depend on the plotting and font-rendering library versions,
//! so the hashes stored in a baseline summary are swapped for the ones
//! recorded for the running environment before comparing.

use crate::result::{PlotcheckError, PlotcheckResult};
use crate::summary::{read_json, TestRecord};
use crate::value::FieldValue;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Which hash field of a record to replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashField {
    /// `baseline_hash`
    Baseline,
    /// `result_hash`
    Result,
}

impl HashField {
    /// Record field name
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Baseline => "baseline_hash",
            Self::Result => "result_hash",
        }
    }
}

/// Field holding the free-text status message
pub const STATUS_MSG: &str = "status_msg";

/// Mapping from test identifier to the expected hash
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashLibrary {
    path: PathBuf,
    hashes: BTreeMap<String, String>,
}

impl HashLibrary {
    /// Build an in-memory library
    #[must_use]
    pub fn from_hashes(
        path: impl Into<PathBuf>,
        hashes: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            path: path.into(),
            hashes: hashes.into_iter().collect(),
        }
    }

    /// Load a library file
    pub fn load(path: &Path) -> PlotcheckResult<Self> {
        let hashes: BTreeMap<String, String> =
            serde_json::from_value(read_json(path)?).map_err(|e| PlotcheckError::HashLibrary {
                path: path.to_path_buf(),
                message: format!("expected a mapping of test name to hash string: {e}"),
            })?;
        debug!(path = %path.display(), entries = hashes.len(), "loaded hash library");
        Ok(Self {
            path: path.to_path_buf(),
            hashes,
        })
    }

    /// Load a library if a path is given and the file exists
    pub fn load_optional(path: Option<&Path>) -> PlotcheckResult<Option<Self>> {
        match path {
            Some(p) if p.exists() => Self::load(p).map(Some),
            Some(p) => {
                debug!(path = %p.display(), "hash library not found, skipping substitution");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Source file of this library
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hash recorded for `test`
    #[must_use]
    pub fn get(&self, test: &str) -> Option<&str> {
        self.hashes.get(test).map(String::as_str)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Check if the library is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Replace `field` of `record` with this library's hash for `test`.
    ///
    /// A test missing from the library is an error.
    pub fn substitute(
        &self,
        test: &str,
        record: &mut TestRecord,
        field: HashField,
    ) -> PlotcheckResult<()> {
        let new_hash = self.get(test).ok_or_else(|| PlotcheckError::HashLibrary {
            path: self.path.clone(),
            message: format!("no hash recorded for {test}"),
        })?;
        replace_hash(record, field, new_hash);
        Ok(())
    }
}

/// Replace a stored hash and every occurrence of it in the status message.
///
/// Nothing changes when the stored hash is not a string or already equals
/// `new_hash`. Returns whether the record was modified.
pub fn replace_hash(record: &mut TestRecord, field: HashField, new_hash: &str) -> bool {
    let old_hash = match record.get(field.key()) {
        Some(FieldValue::String(old)) if old != new_hash => old.clone(),
        _ => return false,
    };

    trace!(field = field.key(), old = %old_hash, new = new_hash, "replacing hash");
    record.insert(field.key().to_string(), FieldValue::from(new_hash));
    if let Some(FieldValue::String(msg)) = record.get_mut(STATUS_MSG) {
        *msg = msg.replace(&old_hash, new_hash);
    }
    true
}
