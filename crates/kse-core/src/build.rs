//! Build metadata.

use std::fmt;

/// Immutable build metadata, constructed once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub date: String,
    pub built_by: String,
}

impl BuildInfo {
    pub fn new(
        version: impl Into<String>,
        commit: Option<&str>,
        date: Option<&str>,
        built_by: Option<&str>,
    ) -> Self {
        Self {
            version: version.into(),
            commit: commit.unwrap_or("none").to_string(),
            date: date.unwrap_or("unknown").to_string(),
            built_by: built_by.unwrap_or("unknown").to_string(),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "k8s-secret-editor version {} (commit: {}, built at: {}, built by: {})",
            self.version, self.commit, self.date, self.built_by
        )
    }
}
