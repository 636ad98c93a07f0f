//! Result and error types for plotcheck.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for plotcheck operations
pub type PlotcheckResult<T> = Result<T, PlotcheckError>;

/// Divider placed between individual mismatches in an aggregated report
pub const MISMATCH_DIVIDER: &str = "\n\n----------\n\n";

/// Errors that can occur in plotcheck
#[derive(Debug, Error)]
pub enum PlotcheckError {
    /// One or more summary mismatches, aggregated over the whole comparison
    #[error("{message}")]
    Match {
        /// Every mismatch joined by [`MISMATCH_DIVIDER`]
        message: String,
        /// Number of individual mismatches
        count: usize,
    },

    /// A summary value is outside the supported scalar set
    #[error("Contract violation for {test}.{field}: {message}")]
    ContractViolation {
        /// Test identifier
        test: String,
        /// Field name
        field: String,
        /// What was wrong with the value
        message: String,
    },

    /// Hash library missing an entry or malformed
    #[error("Hash library {}: {message}", path.display())]
    HashLibrary {
        /// Library file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Patch refers to a test the summary does not contain
    #[error("Patch targets test {test} which is not in the summary")]
    PatchTarget {
        /// Test identifier
        test: String,
    },

    /// A reported image is not on disk
    #[error("Image {field} of {test} does not exist: {}", path.display())]
    ImageMissing {
        /// Test identifier
        test: String,
        /// Image field name
        field: String,
        /// Path that was checked
        path: PathBuf,
    },

    /// Child test process exited with an unexpected status
    #[error("Test process exited with {status}, expected {expected}")]
    ChildStatus {
        /// Rendered exit status
        status: String,
        /// Rendered expectation
        expected: String,
    },

    /// Child test process could not be started
    #[error("Failed to launch {program}: {message}")]
    ChildLaunch {
        /// Program name
        program: String,
        /// Error message
        message: String,
    },

    /// Version identifier could not be built or detected
    #[error("Version error: {message}")]
    Version {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Expected input file does not exist
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Missing path
        path: PathBuf,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PlotcheckError {
    /// Create a contract violation error
    #[must_use]
    pub fn contract(
        test: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ContractViolation {
            test: test.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a version error
    #[must_use]
    pub fn version(message: impl Into<String>) -> Self {
        Self::Version {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error is an aggregated summary mismatch
    #[must_use]
    pub const fn is_match_error(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_match_error_message_is_verbatim() {
        let err = PlotcheckError::Match {
            message: "first".to_string() + MISMATCH_DIVIDER + "second",
            count: 2,
        };
        assert!(err.is_match_error());
        assert_eq!(err.to_string(), "first\n\n----------\n\nsecond");
    }

    #[test]
    fn test_contract_violation() {
        let err = PlotcheckError::contract("t1", "tags", "arrays are not supported");
        assert!(!err.is_match_error());
        let msg = err.to_string();
        assert!(msg.contains("t1.tags"));
        assert!(msg.contains("arrays"));
    }

    #[test]
    fn test_image_missing() {
        let err = PlotcheckError::ImageMissing {
            test: "t1".to_string(),
            field: "diff_image".to_string(),
            path: PathBuf::from("results/t1/diff.png"),
        };
        assert!(err.to_string().contains("results/t1/diff.png"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlotcheckError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
