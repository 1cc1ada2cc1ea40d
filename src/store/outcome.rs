//! Results reported by the staging engine.

use std::path::PathBuf;

use serde::Serialize;

use crate::fragment::{ContributorName, Mode, TargetName};

/// Result of a `present` or `absent` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Whether the operation changed (or, in dry run, would change) anything.
    pub changed: bool,
    /// Human-readable description of what happened.
    pub message: String,
    /// Where the fragment lives; only reported for `present`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment_path: Option<PathBuf>,
}

impl Outcome {
    pub(crate) fn unchanged(
        target: &TargetName,
        contributor: &ContributorName,
        path: PathBuf,
    ) -> Self {
        Self {
            changed: false,
            message: format!(
                "Fragment for profile {target} from role {contributor} already exists and is unchanged"
            ),
            fragment_path: Some(path),
        }
    }

    pub(crate) fn written(
        target: &TargetName,
        contributor: &ContributorName,
        path: PathBuf,
        dry_run: bool,
    ) -> Self {
        let verb = if dry_run { "would be created" } else { "has been created" };
        Self {
            changed: true,
            message: format!("Fragment for profile {target} from role {contributor} {verb}"),
            fragment_path: Some(path),
        }
    }

    pub(crate) fn removed(target: &TargetName, contributor: &ContributorName, dry_run: bool) -> Self {
        let verb = if dry_run { "would be removed" } else { "has been removed" };
        Self {
            changed: true,
            message: format!("Fragment for profile {target} from role {contributor} {verb}"),
            fragment_path: None,
        }
    }

    pub(crate) fn not_found(
        target: &TargetName,
        contributor: &ContributorName,
        dry_run: bool,
    ) -> Self {
        let tail = if dry_run { "would not be removed (not found)" } else { "was not found" };
        Self {
            changed: false,
            message: format!("Fragment for profile {target} from role {contributor} {tail}"),
            fragment_path: None,
        }
    }
}

/// A fragment found in a target's staging directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFragment {
    /// Contributor the fragment belongs to.
    pub contributor: String,
    /// Mode from the annotation line.
    pub mode: Mode,
    /// Stored byte length, annotation line included.
    pub size: u64,
    /// Rule text after the annotation line.
    pub content: String,
    /// File the fragment was read from.
    pub path: PathBuf,
}
