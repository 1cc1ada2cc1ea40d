//! Filesystem port for staging I/O.

use std::io;
use std::path::Path;

use tempfile::TempPath;

/// Provides the filesystem primitives the staging engine is built from.
///
/// Abstracting the filesystem lets tests inject failures at any single step
/// (most importantly the rename) while the engine logic stays unchanged.
pub trait FileSystem: Send + Sync {
    /// Creates a directory and any missing parents with the given permission
    /// bits. Succeeds if the directory already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails or the path exists as a non-directory.
    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Reads the entire contents of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Returns whether the path exists.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined (e.g. a parent
    /// directory is not searchable).
    fn try_exists(&self, path: &Path) -> io::Result<bool>;

    /// Creates a uniquely named file inside `dir`, writes `contents` to it,
    /// and closes it.
    ///
    /// The returned guard deletes the file when dropped unless it is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    fn write_temp(
        &self,
        dir: &Path,
        prefix: &str,
        suffix: &str,
        contents: &[u8],
    ) -> io::Result<TempPath>;

    /// Atomically renames `from` onto `to`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Sets the permission bits of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the permissions cannot be changed.
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Removes a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Removes an empty directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing or not empty.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Lists entry names in a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;
}
