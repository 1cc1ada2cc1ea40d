//! `aafrag apply` command.
//!
//! Validates the request at the boundary, resolves the content, then hands
//! a single resolved string to the staging engine. The result is printed to
//! stdout as one JSON object.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::cli::{ApplyArgs, State};
use crate::config::StageConfig;
use crate::context::ServiceContext;
use crate::error::{StageError, StageResult};
use crate::fragment::{Fragment, TargetName};
use crate::identity::resolve_contributor;
use crate::resolve::{ContentResolver, ContentSource, SearchPathResolver};
use crate::store::{FragmentStore, Outcome};

/// Prefix of failure messages raised from inside the engine.
const ENGINE_FAILURE_PREFIX: &str = "Failed to manage AppArmor profile fragment: ";

/// Failure report printed in place of an [`Outcome`].
#[derive(Debug, Serialize)]
struct Failure {
    failed: bool,
    changed: bool,
    msg: String,
    error_kind: &'static str,
}

impl From<&StageError> for Failure {
    fn from(err: &StageError) -> Self {
        let msg = match err {
            StageError::Io { .. } => format!("{ENGINE_FAILURE_PREFIX}{err}"),
            StageError::Configuration(msg)
            | StageError::Lookup(msg)
            | StageError::Templating(msg) => msg.clone(),
        };
        Self { failed: true, changed: false, msg, error_kind: err.kind() }
    }
}

/// Execute the `apply` command and print its JSON result.
///
/// # Errors
///
/// Returns an error string when the request fails; the failure report has
/// already been printed to stdout.
pub fn run(ctx: &ServiceContext, config: &StageConfig, args: &ApplyArgs) -> Result<(), String> {
    match execute(ctx, config, args) {
        Ok(outcome) => {
            let json = serde_json::to_string(&outcome)
                .map_err(|e| format!("Failed to serialize result: {e}"))?;
            println!("{json}");
            Ok(())
        }
        Err(err) => {
            let failure = Failure::from(&err);
            let json = serde_json::to_string(&failure)
                .map_err(|e| format!("Failed to serialize result: {e}"))?;
            println!("{json}");
            Err(failure.msg)
        }
    }
}

/// Validate, resolve, and stage one request.
///
/// Both states need exactly one of `fragment` / `fragment_src`; `absent`
/// checks it but never resolves the content.
///
/// # Errors
///
/// Returns [`StageError::Configuration`], [`StageError::Lookup`], or
/// [`StageError::Templating`] before the engine runs, and
/// [`StageError::Io`] from the engine itself.
pub fn execute(ctx: &ServiceContext, config: &StageConfig, args: &ApplyArgs) -> StageResult<Outcome> {
    let target = TargetName::new(args.name.clone())?;
    let base = args.staging_base_dir.clone().unwrap_or_else(|| config.staging_base_dir.clone());
    let store = FragmentStore::new(ctx, &base);

    match args.state {
        State::Present => {
            let source =
                ContentSource::from_inputs(args.fragment.clone(), args.fragment_src.clone())?;
            let contributor =
                resolve_contributor(ctx, args.role_name.as_deref(), config.require_role_name)?;
            let resolver = SearchPathResolver::new(ctx, search_roots(config, args), vars(config, args));
            let content = resolver.resolve(&source)?;
            store.present(&target, &contributor, &Fragment::new(args.mode, content), args.check)
        }
        State::Absent => {
            ContentSource::from_inputs(args.fragment.clone(), args.fragment_src.clone())?;
            let contributor =
                resolve_contributor(ctx, args.role_name.as_deref(), config.require_role_name)?;
            store.absent(&target, &contributor, args.check)
        }
    }
}

/// Command-line roots replace configured ones; with neither, the current
/// directory is searched.
fn search_roots(config: &StageConfig, args: &ApplyArgs) -> Vec<PathBuf> {
    if !args.search_paths.is_empty() {
        args.search_paths.clone()
    } else if !config.search_paths.is_empty() {
        config.search_paths.clone()
    } else {
        vec![PathBuf::from(".")]
    }
}

/// Configured variables overlaid with command-line ones.
fn vars(config: &StageConfig, args: &ApplyArgs) -> BTreeMap<String, String> {
    let mut vars = config.vars.clone();
    vars.extend(args.vars.iter().cloned());
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Mode;
    use std::path::Path;

    fn args(base: &Path) -> ApplyArgs {
        ApplyArgs {
            name: "usr.sbin.nginx".to_string(),
            fragment: Some("/var/www/html/** r,\n".to_string()),
            fragment_src: None,
            mode: Mode::Enforce,
            role_name: Some("nginx_role".to_string()),
            state: State::Present,
            staging_base_dir: Some(base.to_path_buf()),
            check: false,
            search_paths: Vec::new(),
            vars: Vec::new(),
        }
    }

    #[test]
    fn present_then_absent() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let config = StageConfig::default();

        let outcome = execute(&ctx, &config, &args(dir.path())).unwrap();
        assert!(outcome.changed);

        let mut remove = args(dir.path());
        remove.state = State::Absent;
        let outcome = execute(&ctx, &config, &remove).unwrap();
        assert!(outcome.changed);
        assert!(!dir.path().join("usr.sbin.nginx").exists());
    }

    #[test]
    fn both_sources_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let mut both = args(dir.path());
        both.fragment_src = Some(PathBuf::from("x.rules"));

        let err = execute(&ctx, &StageConfig::default(), &both).unwrap_err();
        assert!(matches!(err, StageError::Configuration(_)));
        assert!(!dir.path().join("usr.sbin.nginx").exists());
    }

    #[test]
    fn missing_source_for_present_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let mut neither = args(dir.path());
        neither.fragment = None;

        let err = execute(&ctx, &StageConfig::default(), &neither).unwrap_err();
        assert!(err.to_string().contains("one of the following is required"));
    }

    #[test]
    fn absent_requires_a_source_but_never_resolves_it() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let mut remove = args(dir.path());
        remove.state = State::Absent;
        remove.fragment = None;

        let err = execute(&ctx, &StageConfig::default(), &remove).unwrap_err();
        assert!(matches!(err, StageError::Configuration(_)));

        remove.fragment_src = Some(PathBuf::from("nowhere.rules"));
        let outcome = execute(&ctx, &StageConfig::default(), &remove).unwrap();
        assert!(!outcome.changed);
    }

    #[test]
    fn lookup_failure_leaves_no_staging_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let mut by_ref = args(dir.path());
        by_ref.fragment = None;
        by_ref.fragment_src = Some(PathBuf::from("missing.rules"));
        by_ref.search_paths = vec![dir.path().join("role")];

        let err = execute(&ctx, &StageConfig::default(), &by_ref).unwrap_err();
        assert!(matches!(err, StageError::Lookup(_)));
        assert!(!dir.path().join("usr.sbin.nginx").exists());
    }

    #[test]
    fn cli_vars_override_config_vars() {
        let mut config = StageConfig::default();
        config.vars.insert("a".into(), "from-config".into());
        config.vars.insert("b".into(), "kept".into());
        let mut a = args(Path::new("/unused"));
        a.vars = vec![("a".into(), "from-cli".into())];

        let merged = vars(&config, &a);
        assert_eq!(merged["a"], "from-cli");
        assert_eq!(merged["b"], "kept");
    }

    #[test]
    fn io_failures_carry_engine_prefix() {
        let err = StageError::io(
            "create staging directory",
            Path::new("/x"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let failure = Failure::from(&err);
        assert!(failure.msg.starts_with(ENGINE_FAILURE_PREFIX));
        assert_eq!(failure.error_kind, "io");
    }
}
