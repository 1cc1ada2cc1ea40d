//! `aafrag list` command.

use crate::cli::ListArgs;
use crate::config::StageConfig;
use crate::context::ServiceContext;
use crate::fragment::TargetName;
use crate::store::FragmentStore;

/// Execute the `list` command.
///
/// Prints the fragments staged for a profile as a JSON array, sorted by
/// contributor. In-flight temp files are not reported.
///
/// # Errors
///
/// Returns an error string if the name is invalid or the staging directory
/// cannot be read.
pub fn run(ctx: &ServiceContext, config: &StageConfig, args: &ListArgs) -> Result<(), String> {
    let target = TargetName::new(args.name.clone()).map_err(|e| e.to_string())?;
    let base = args.staging_base_dir.as_ref().unwrap_or(&config.staging_base_dir);
    let staged = FragmentStore::new(ctx, base).list(&target).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&staged)
        .map_err(|e| format!("Failed to serialize fragments: {e}"))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_on_empty_base_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let args = ListArgs { name: "usr.sbin.nginx".into(), staging_base_dir: Some(dir.path().into()) };
        assert!(run(&ServiceContext::live(), &StageConfig::default(), &args).is_ok());
    }

    #[test]
    fn list_rejects_bad_name() {
        let args = ListArgs { name: "../etc".into(), staging_base_dir: None };
        assert!(run(&ServiceContext::live(), &StageConfig::default(), &args).is_err());
    }
}
