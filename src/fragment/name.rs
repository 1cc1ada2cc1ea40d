//! Path-segment-safe names for targets and contributors.

use std::fmt;

use crate::error::{StageError, StageResult};

/// Name of the profile a fragment contributes to, e.g. `usr.sbin.nginx`.
///
/// Used verbatim as the staging directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetName(String);

impl TargetName {
    /// Validates and wraps a target name.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Configuration`] if the name is empty, contains a
    /// path separator or NUL byte, or is `.`/`..`.
    pub fn new(name: impl Into<String>) -> StageResult<Self> {
        let name = name.into();
        check_segment("name", &name)?;
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the role contributing a fragment.
///
/// Becomes the fragment's file stem, so it is the uniqueness key of a
/// contribution within its target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContributorName(String);

impl ContributorName {
    /// Validates and wraps a contributor name.
    ///
    /// Leading dots are rejected because dot-prefixed entries in a staging
    /// directory are in-flight temp files.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Configuration`] if the name is not a safe path
    /// segment or starts with `.`.
    pub fn new(name: impl Into<String>) -> StageResult<Self> {
        let name = name.into();
        check_segment("role_name", &name)?;
        if name.starts_with('.') {
            return Err(StageError::Configuration(format!(
                "role_name must not start with '.': {name}"
            )));
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContributorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_segment(field: &str, value: &str) -> StageResult<()> {
    if value.is_empty() {
        return Err(StageError::Configuration(format!("{field} must not be empty")));
    }
    if value == "." || value == ".." {
        return Err(StageError::Configuration(format!("{field} must not be '{value}'")));
    }
    if value.contains(['/', '\\', '\0']) {
        return Err(StageError::Configuration(format!(
            "{field} must not contain path separators: {value}"
        )));
    }
    Ok(())
}
