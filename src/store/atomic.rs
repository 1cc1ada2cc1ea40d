//! Same-directory temp file plus rename.

use std::io::ErrorKind;
use std::path::Path;

use log::debug;

use crate::error::{StageError, StageResult};
use crate::ports::FileSystem;

/// Suffix of in-flight temp files.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Writes `payload` to `dest` so readers only ever see the old or the new
/// complete file.
///
/// The temp file is created next to `dest` (same filesystem, so the rename is
/// atomic) and is held by a guard that deletes it on every early return.
/// `mode` is applied to `dest` after the rename. If the directory vanished
/// before the temp file could be created, `recreate_dir` runs and the temp
/// write is retried once.
pub(crate) fn write_atomic(
    fs: &dyn FileSystem,
    dest: &Path,
    temp_prefix: &str,
    payload: &[u8],
    mode: u32,
    recreate_dir: impl FnOnce() -> StageResult<()>,
) -> StageResult<()> {
    let dir = dest.parent().ok_or_else(|| {
        StageError::io(
            "resolve parent of",
            dest,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no parent"),
        )
    })?;

    let temp = match fs.write_temp(dir, temp_prefix, TEMP_SUFFIX, payload) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("event=staging_dir_vanished dir={}", dir.display());
            recreate_dir()?;
            fs.write_temp(dir, temp_prefix, TEMP_SUFFIX, payload)
        }
        other => other,
    }
    .map_err(|e| StageError::io("write temp file in", dir, e))?;

    fs.rename(&temp, dest).map_err(|e| StageError::io("rename temp file onto", dest, e))?;

    // The temp path is gone after a successful rename; disarm the guard.
    temp.keep().map_err(|e| StageError::io("release temp file for", dest, e.error))?;

    fs.set_mode(dest, mode).map_err(|e| StageError::io("set permissions on", dest, e))
}
