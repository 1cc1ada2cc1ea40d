//! Content resolution ahead of staging.
//!
//! The engine only ever receives a resolved string. This module turns the
//! caller's two mutually exclusive inputs (inline text or a reference to a
//! source file) into that string.

mod search;
mod template;

use std::path::PathBuf;

use crate::error::{StageError, StageResult};

pub use search::SearchPathResolver;
pub use template::expand;

/// Where a fragment's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Literal text, passed through untouched.
    Inline(String),
    /// A source file to look up and expand.
    Reference(PathBuf),
}

impl ContentSource {
    /// Builds a source from the two optional inputs, exactly one of which
    /// must be set.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Configuration`] when both or neither are given.
    pub fn from_inputs(fragment: Option<String>, fragment_src: Option<PathBuf>) -> StageResult<Self> {
        match (fragment, fragment_src) {
            (Some(text), None) => Ok(Self::Inline(text)),
            (None, Some(path)) => Ok(Self::Reference(path)),
            (Some(_), Some(_)) => Err(StageError::Configuration(
                "fragment_src and fragment are mutually exclusive".to_string(),
            )),
            (None, None) => Err(StageError::Configuration(
                "one of the following is required: fragment_src, fragment".to_string(),
            )),
        }
    }
}

/// Produces the concrete fragment text for a [`ContentSource`].
pub trait ContentResolver {
    /// Resolves `source` to the text that will be staged.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Lookup`] when a reference cannot be found and
    /// [`StageError::Templating`] when it cannot be read or expanded.
    fn resolve(&self, source: &ContentSource) -> StageResult<String>;
}
