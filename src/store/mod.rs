//! Fragment store: the staging engine.
//!
//! Owns one directory per target under a base directory and one file per
//! (target, contributor) pair inside it:
//!
//! ```text
//! <base>/
//!   └── <target>/
//!         ├── <contributor>.fragment
//!         └── .<contributor>_XXXXXX.tmp   (in flight, never valid)
//! ```
//!
//! All I/O goes through `ctx.fs`. There is no cross-process locking; the
//! atomic rename is the only visibility point, so concurrent writers to the
//! same pair each land a complete file and the last rename wins.

mod atomic;
mod outcome;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::context::ServiceContext;
use crate::error::{StageError, StageResult};
use crate::fragment::{ContributorName, Fragment, TargetName, FRAGMENT_EXTENSION};

pub use atomic::TEMP_SUFFIX;
pub use outcome::{Outcome, StagedFragment};

/// Default base directory for staged fragments.
pub const DEFAULT_STAGING_BASE_DIR: &str = "/etc/apparmor.d/roles";

/// Permission bits of a target's staging directory.
pub const DIR_MODE: u32 = 0o755;

/// Permission bits of a staged fragment file.
pub const FRAGMENT_MODE: u32 = 0o644;

/// Staging engine rooted at a base directory.
pub struct FragmentStore<'a> {
    ctx: &'a ServiceContext,
    base: PathBuf,
}

impl<'a> FragmentStore<'a> {
    /// Creates a store rooted at `base`. Nothing is touched on disk.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, base: &Path) -> Self {
        Self { ctx, base: base.to_path_buf() }
    }

    /// Returns `<base>/<target>`.
    #[must_use]
    pub fn target_dir(&self, target: &TargetName) -> PathBuf {
        self.base.join(target.as_str())
    }

    /// Returns `<base>/<target>/<contributor>.fragment`.
    #[must_use]
    pub fn fragment_path(&self, target: &TargetName, contributor: &ContributorName) -> PathBuf {
        self.target_dir(target).join(format!("{contributor}.{FRAGMENT_EXTENSION}"))
    }

    /// Creates the staging directory for `target` if it does not exist.
    ///
    /// A newly created directory gets [`DIR_MODE`] regardless of the umask;
    /// an existing one is left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Io`] if the directory cannot be created.
    pub fn ensure_target_directory(&self, target: &TargetName) -> StageResult<PathBuf> {
        let dir = self.target_dir(target);
        let existed = self
            .ctx
            .fs
            .try_exists(&dir)
            .map_err(|e| StageError::io("inspect staging directory", &dir, e))?;
        // Still called when the path exists so a file in the way is an error.
        self.ctx
            .fs
            .create_dir_all(&dir, DIR_MODE)
            .map_err(|e| StageError::io("create staging directory", &dir, e))?;
        if existed {
            return Ok(dir);
        }
        self.ctx
            .fs
            .set_mode(&dir, DIR_MODE)
            .map_err(|e| StageError::io("set permissions on", &dir, e))?;
        Ok(dir)
    }

    /// Ensures the fragment for (`target`, `contributor`) holds exactly
    /// `fragment`.
    ///
    /// Reports `changed = false` without writing when the file already holds
    /// the same bytes. A dry run never inspects or touches the disk and
    /// always reports `changed = true`.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Io`] if the directory cannot be created, the
    /// existing fragment cannot be read, or the atomic write fails. A failed
    /// write leaves any previous fragment untouched.
    pub fn present(
        &self,
        target: &TargetName,
        contributor: &ContributorName,
        fragment: &Fragment,
        dry_run: bool,
    ) -> StageResult<Outcome> {
        let path = self.fragment_path(target, contributor);
        let stored = fragment.stored_form();

        if dry_run {
            debug!(
                "event=fragment_would_write target={target} contributor={contributor} mode={}",
                fragment.mode
            );
            return Ok(Outcome::written(target, contributor, path, true));
        }

        self.ensure_target_directory(target)?;

        if self.holds(&path, stored.as_bytes())? {
            debug!(
                "event=fragment_unchanged target={target} contributor={contributor} path={}",
                path.display()
            );
            return Ok(Outcome::unchanged(target, contributor, path));
        }

        // A concurrent `absent` may prune the directory before the temp file
        // lands in it; recreate it once.
        atomic::write_atomic(
            self.ctx.fs.as_ref(),
            &path,
            &format!(".{contributor}_"),
            stored.as_bytes(),
            FRAGMENT_MODE,
            || self.ensure_target_directory(target).map(drop),
        )?;
        info!(
            "event=fragment_written target={target} contributor={contributor} mode={} bytes={}",
            fragment.mode,
            stored.len()
        );
        Ok(Outcome::written(target, contributor, path, false))
    }

    /// Ensures no fragment exists for (`target`, `contributor`).
    ///
    /// After a removal the target directory is deleted if it became empty;
    /// a directory still holding other fragments is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Io`] if the fragment exists but cannot be removed.
    pub fn absent(
        &self,
        target: &TargetName,
        contributor: &ContributorName,
        dry_run: bool,
    ) -> StageResult<Outcome> {
        let path = self.fragment_path(target, contributor);

        let exists = self
            .ctx
            .fs
            .try_exists(&path)
            .map_err(|e| StageError::io("inspect fragment", &path, e))?;
        if !exists {
            debug!("event=fragment_missing target={target} contributor={contributor}");
            return Ok(Outcome::not_found(target, contributor, dry_run));
        }

        if dry_run {
            return Ok(Outcome::removed(target, contributor, true));
        }

        match self.ctx.fs.remove_file(&path) {
            Ok(()) => {}
            // Another caller removed it between the check and the unlink.
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Outcome::not_found(target, contributor, false));
            }
            Err(e) => return Err(StageError::io("remove fragment", &path, e)),
        }
        info!("event=fragment_removed target={target} contributor={contributor}");

        self.prune_target_dir(target);
        Ok(Outcome::removed(target, contributor, false))
    }

    /// Lists the fragments staged for `target`, sorted by contributor.
    ///
    /// In-flight temp files and unrelated entries are skipped. A target with
    /// no staging directory has no fragments.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Io`] if the directory or a fragment cannot be
    /// read, or a fragment lacks a valid mode annotation.
    pub fn list(&self, target: &TargetName) -> StageResult<Vec<StagedFragment>> {
        let dir = self.target_dir(target);
        let exists = self
            .ctx
            .fs
            .try_exists(&dir)
            .map_err(|e| StageError::io("inspect staging directory", &dir, e))?;
        if !exists {
            return Ok(Vec::new());
        }
        let entries = self
            .ctx
            .fs
            .list_dir(&dir)
            .map_err(|e| StageError::io("list staging directory", &dir, e))?;

        let suffix = format!(".{FRAGMENT_EXTENSION}");
        let mut staged = Vec::new();
        for entry in entries {
            if entry.starts_with('.') {
                continue;
            }
            let Some(stem) = entry.strip_suffix(&suffix) else {
                continue;
            };
            let Ok(contributor) = ContributorName::new(stem) else {
                continue;
            };
            let path = dir.join(&entry);
            let bytes =
                self.ctx.fs.read(&path).map_err(|e| StageError::io("read fragment", &path, e))?;
            let size = bytes.len() as u64;
            let fragment = String::from_utf8(bytes)
                .ok()
                .and_then(|text| Fragment::parse(&text))
                .ok_or_else(|| {
                    StageError::io(
                        "parse fragment",
                        &path,
                        std::io::Error::new(ErrorKind::InvalidData, "missing mode annotation"),
                    )
                })?;
            staged.push(StagedFragment {
                contributor: contributor.to_string(),
                mode: fragment.mode,
                size,
                content: fragment.content,
                path,
            });
        }
        Ok(staged)
    }

    /// Returns `true` if `path` exists and holds exactly `expected`.
    fn holds(&self, path: &Path, expected: &[u8]) -> StageResult<bool> {
        match self.ctx.fs.read(path) {
            Ok(existing) => Ok(existing == expected),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StageError::io("read fragment", path, e)),
        }
    }

    /// Best-effort removal of an emptied target directory.
    fn prune_target_dir(&self, target: &TargetName) {
        let dir = self.target_dir(target);
        match self.ctx.fs.remove_dir(&dir) {
            Ok(()) => info!("event=staging_dir_removed target={target}"),
            Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => {
                debug!("event=staging_dir_kept target={target} reason=not_empty");
            }
            Err(e) => debug!("event=staging_dir_kept target={target} reason={e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Mode;

    fn names(target: &str, contributor: &str) -> (TargetName, ContributorName) {
        (TargetName::new(target).unwrap(), ContributorName::new(contributor).unwrap())
    }

    #[test]
    fn fragment_path_layout() {
        let ctx = ServiceContext::live();
        let store = FragmentStore::new(&ctx, Path::new("/etc/apparmor.d/roles"));
        let (target, contributor) = names("usr.sbin.nginx", "nginx_role");
        assert_eq!(
            store.fragment_path(&target, &contributor),
            PathBuf::from("/etc/apparmor.d/roles/usr.sbin.nginx/nginx_role.fragment")
        );
    }

    #[test]
    fn present_writes_stored_form() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let store = FragmentStore::new(&ctx, dir.path());
        let (target, contributor) = names("usr.sbin.nginx", "nginx_role");

        let outcome = store
            .present(&target, &contributor, &Fragment::new(Mode::Enforce, "/var/www/html/** r,\n"), false)
            .unwrap();

        assert!(outcome.changed);
        let path = dir.path().join("usr.sbin.nginx/nginx_role.fragment");
        assert_eq!(outcome.fragment_path.as_deref(), Some(path.as_path()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Mode: enforce\n/var/www/html/** r,\n");
    }

    #[test]
    fn present_dry_run_always_reports_changed() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let store = FragmentStore::new(&ctx, dir.path());
        let (target, contributor) = names("t", "c");
        let fragment = Fragment::new(Mode::Complain, "x\n");

        store.present(&target, &contributor, &fragment, false).unwrap();
        let predicted = store.present(&target, &contributor, &fragment, true).unwrap();

        assert!(predicted.changed);
        assert!(predicted.message.ends_with("would be created"));
    }

    #[test]
    fn new_staging_directory_gets_dir_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let store = FragmentStore::new(&ctx, dir.path());
        let created = store.ensure_target_directory(&TargetName::new("t").unwrap()).unwrap();

        let mode = std::fs::metadata(created).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, DIR_MODE);
    }

    #[test]
    fn absent_keeps_directory_with_other_fragments() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let store = FragmentStore::new(&ctx, dir.path());
        let (target, first) = names("t", "first");
        let second = ContributorName::new("second").unwrap();
        let fragment = Fragment::new(Mode::Enforce, "r,\n");

        store.present(&target, &first, &fragment, false).unwrap();
        store.present(&target, &second, &fragment, false).unwrap();
        assert!(store.absent(&target, &first, false).unwrap().changed);

        assert!(store.target_dir(&target).is_dir());
        assert!(store.fragment_path(&target, &second).is_file());
    }

    #[test]
    fn list_skips_temp_files_and_strangers() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let store = FragmentStore::new(&ctx, dir.path());
        let (target, contributor) = names("t", "b_role");

        store.present(&target, &contributor, &Fragment::new(Mode::Disable, "y\n"), false).unwrap();
        store
            .present(&target, &ContributorName::new("a_role").unwrap(), &Fragment::new(Mode::Enforce, ""), false)
            .unwrap();
        let tdir = store.target_dir(&target);
        std::fs::write(tdir.join(".b_role_abc123.tmp"), "partial").unwrap();
        std::fs::write(tdir.join("README"), "ignored").unwrap();

        let staged = store.list(&target).unwrap();
        let contributors: Vec<&str> = staged.iter().map(|s| s.contributor.as_str()).collect();
        assert_eq!(contributors, vec!["a_role", "b_role"]);
        assert_eq!(staged[1].mode, Mode::Disable);
        assert_eq!(staged[1].content, "y\n");
        assert_eq!(staged[1].size, "# Mode: disable\ny\n".len() as u64);
    }

    #[test]
    fn list_missing_target_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let store = FragmentStore::new(&ctx, dir.path());
        assert!(store.list(&TargetName::new("nothing").unwrap()).unwrap().is_empty());
    }

    #[test]
    fn list_rejects_fragment_without_annotation() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let store = FragmentStore::new(&ctx, dir.path());
        let target = TargetName::new("t").unwrap();
        let tdir = store.ensure_target_directory(&target).unwrap();
        std::fs::write(tdir.join("hand_written.fragment"), "/etc r,\n").unwrap();

        let err = store.list(&target).unwrap_err();
        assert!(err.to_string().contains("hand_written.fragment"));
    }
}
