//! Reference lookup across search roots.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;

use super::{template, ContentResolver, ContentSource};
use crate::context::ServiceContext;
use crate::error::{StageError, StageResult};

/// Subdirectories searched under each root, in priority order.
const SEARCH_SUBDIRS: [&str; 2] = ["files", "templates"];

/// Looks references up under a list of roots and expands their variables.
///
/// For a relative reference every root's `files/` is tried first, then every
/// root's `templates/`, then each root itself. Absolute references are used
/// as given. Located sources are always expanded, since plain files may
/// carry placeholders too.
pub struct SearchPathResolver<'a> {
    ctx: &'a ServiceContext,
    roots: Vec<PathBuf>,
    vars: BTreeMap<String, String>,
}

impl<'a> SearchPathResolver<'a> {
    /// Creates a resolver over `roots` with the given template variables.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, roots: Vec<PathBuf>, vars: BTreeMap<String, String>) -> Self {
        Self { ctx, roots, vars }
    }

    /// Returns the first existing candidate for `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Lookup`] when no candidate exists.
    pub fn locate(&self, reference: &Path) -> StageResult<PathBuf> {
        let candidates: Vec<PathBuf> = if reference.is_absolute() {
            vec![reference.to_path_buf()]
        } else {
            SEARCH_SUBDIRS
                .iter()
                .flat_map(|sub| self.roots.iter().map(move |root| root.join(sub).join(reference)))
                .chain(self.roots.iter().map(|root| root.join(reference)))
                .collect()
        };

        // An unreadable candidate counts as absent and the search moves on.
        candidates
            .into_iter()
            .find(|c| matches!(self.ctx.fs.try_exists(c), Ok(true)))
            .ok_or_else(|| {
                StageError::Lookup(format!(
                    "Could not find or access '{}' in files/ or templates/ directories",
                    reference.display()
                ))
            })
    }
}

impl ContentResolver for SearchPathResolver<'_> {
    fn resolve(&self, source: &ContentSource) -> StageResult<String> {
        let reference = match source {
            ContentSource::Inline(text) => return Ok(text.clone()),
            ContentSource::Reference(reference) => reference,
        };

        let path = self.locate(reference)?;
        debug!("event=content_located reference={} path={}", reference.display(), path.display());

        let bytes = self.ctx.fs.read(&path).map_err(|e| {
            StageError::Templating(format!("Failed to read file '{}': {e}", path.display()))
        })?;
        let text = String::from_utf8(bytes).map_err(|e| {
            StageError::Templating(format!("Failed to read file '{}': {e}", path.display()))
        })?;
        template::expand(&text, &self.vars).map_err(|e| match e {
            StageError::Templating(msg) => {
                StageError::Templating(format!("Failed to template file '{}': {msg}", path.display()))
            }
            other => other,
        })
    }
}
