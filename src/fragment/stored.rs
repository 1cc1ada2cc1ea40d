//! Serialized form of a fragment.

use super::Mode;

/// Prefix of the mode annotation line.
pub const MODE_PREFIX: &str = "# Mode: ";

/// A fragment's mode and raw content, independent of where it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Enforcement mode annotation.
    pub mode: Mode,
    /// Contributed rule text, kept verbatim.
    pub content: String,
}

impl Fragment {
    /// Creates a fragment from its parts.
    #[must_use]
    pub fn new(mode: Mode, content: impl Into<String>) -> Self {
        Self { mode, content: content.into() }
    }

    /// Returns the exact bytes written to disk: the annotation line followed
    /// by the content.
    #[must_use]
    pub fn stored_form(&self) -> String {
        format!("{MODE_PREFIX}{}\n{}", self.mode, self.content)
    }

    /// Parses a stored fragment.
    ///
    /// Returns `None` when the first line is not a recognized mode annotation.
    #[must_use]
    pub fn parse(stored: &str) -> Option<Self> {
        let (header, content) = stored.split_once('\n').unwrap_or((stored, ""));
        let mode = header.strip_prefix(MODE_PREFIX)?.parse().ok()?;
        Some(Self { mode, content: content.to_string() })
    }
}
