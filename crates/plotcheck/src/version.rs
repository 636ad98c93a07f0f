//! Rendering-environment version identifiers.
//!
//! Hash libraries and patch files are keyed by an identifier such as
//! `mpl38_ft261`: Matplotlib major/minor version plus the FreeType version
//! without dots.

use crate::result::{PlotcheckError, PlotcheckResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use tracing::debug;

/// Identifier of the plotting/font-rendering library combination in use
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId {
    major: u32,
    minor: u32,
    freetype: String,
}

impl VersionId {
    /// Build from raw version strings, e.g. `("3.8.2", "2.6.1")`
    pub fn from_versions(plotting: &str, freetype: &str) -> PlotcheckResult<Self> {
        let mut parts = plotting.split('.');
        let major = leading_number(parts.next())
            .ok_or_else(|| PlotcheckError::version(format!("bad plotting version {plotting:?}")))?;
        let minor = leading_number(parts.next())
            .ok_or_else(|| PlotcheckError::version(format!("bad plotting version {plotting:?}")))?;

        let freetype: String = freetype.trim().chars().filter(|c| *c != '.').collect();
        if freetype.is_empty() || !freetype.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PlotcheckError::version(format!(
                "bad freetype version {freetype:?}"
            )));
        }

        Ok(Self {
            major,
            minor,
            freetype,
        })
    }

    /// Ask a Python interpreter which Matplotlib and FreeType it uses
    pub fn detect(python: &str) -> PlotcheckResult<Self> {
        const SCRIPT: &str = "import matplotlib, matplotlib.ft2font as ft; \
                              print(matplotlib.__version__); print(ft.__freetype_version__)";

        let output = Command::new(python)
            .args(["-c", SCRIPT])
            .output()
            .map_err(|e| PlotcheckError::ChildLaunch {
                program: python.to_string(),
                message: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(PlotcheckError::version(format!(
                "{python} could not report versions: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
        let (Some(plotting), Some(freetype)) = (lines.next(), lines.next()) else {
            return Err(PlotcheckError::version(format!(
                "unexpected output from {python}: {stdout:?}"
            )));
        };
        let id = Self::from_versions(plotting, freetype)?;
        debug!(%id, plotting, freetype, "detected version id");
        Ok(id)
    }

    /// Plotting library major version
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Plotting library minor version
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// FreeType version without dots
    #[must_use]
    pub fn freetype(&self) -> &str {
        &self.freetype
    }

    /// `<dir>/<id>.json`
    #[must_use]
    pub fn hash_library_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{self}.json"))
    }

    /// `<dir>/<name>_<id>.patch.json`
    #[must_use]
    pub fn patch_path(&self, dir: &Path, baseline_name: &str) -> PathBuf {
        dir.join(format!("{baseline_name}_{self}.patch.json"))
    }
}

fn leading_number(part: Option<&str>) -> Option<u32> {
    let digits: String = part?.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mpl{}{}_ft{}", self.major, self.minor, self.freetype)
    }
}

impl FromStr for VersionId {
    type Err = PlotcheckError;

    /// Parse `mpl{major}{minor}_ft{freetype}`; the major version is one digit
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || PlotcheckError::version(format!("bad version id {s:?}"));
        let rest = s.strip_prefix("mpl").ok_or_else(bad)?;
        let (plotting, freetype) = rest.split_once("_ft").ok_or_else(bad)?;
        if plotting.len() < 2 || !plotting.chars().all(|c| c.is_ascii_digit()) {
            return Err(bad());
        }
        let (major, minor) = plotting.split_at(1);
        Self::from_versions(&format!("{major}.{minor}"), freetype).map_err(|_| bad())
    }
}

impl TryFrom<String> for VersionId {
    type Error = PlotcheckError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<VersionId> for String {
    fn from(id: VersionId) -> Self {
        id.to_string()
    }
}
