//! Error type shared by every layer of the staging pipeline.

use std::path::{Path, PathBuf};

/// Failure raised while validating, resolving, or staging a fragment.
///
/// Boundary errors (`Configuration`, `Lookup`, `Templating`) are raised
/// before the engine touches the filesystem. `Io` is raised from inside the
/// engine and always names the path it was working on.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// Missing, conflicting, or malformed inputs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A content reference could not be found in any search location.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// A located content source could not be read or expanded.
    #[error("templating error: {0}")]
    Templating(String),

    /// A filesystem operation failed.
    #[error("{op} `{}`: {source}", .path.display())]
    Io {
        /// Short name of the failed operation.
        op: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    /// Wraps an I/O error with the operation name and offending path.
    #[must_use]
    pub fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io { op, path: path.to_path_buf(), source }
    }

    /// Returns the stable kind label used in machine-readable output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Lookup(_) => "lookup",
            Self::Templating(_) => "templating",
            Self::Io { .. } => "io",
        }
    }
}

/// Convenience alias for results carrying a [`StageError`].
pub type StageResult<T> = Result<T, StageError>;
