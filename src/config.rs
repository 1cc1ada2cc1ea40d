//! Layered runtime configuration.
//!
//! Precedence, lowest first: built-in defaults, the YAML file named by
//! `--config` or `AAFRAG_CONFIG`, environment overrides, command-line flags.
//! The last layer is applied by the command handlers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StageError, StageResult};
use crate::store::DEFAULT_STAGING_BASE_DIR;

/// Environment variable naming the YAML config file.
pub const CONFIG_ENV: &str = "AAFRAG_CONFIG";
/// Environment variable overriding the staging base directory.
pub const STAGING_DIR_ENV: &str = "AAFRAG_STAGING_DIR";
/// Environment variable overriding the log level.
pub const LOG_ENV: &str = "AAFRAG_LOG";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StageConfig {
    /// Directory holding one staging directory per target.
    pub staging_base_dir: PathBuf,
    /// Reject requests without a role name instead of deriving one.
    pub require_role_name: bool,
    /// Roots searched for `fragment_src` references.
    pub search_paths: Vec<PathBuf>,
    /// Variables available to `{{ name }}` placeholders.
    pub vars: BTreeMap<String, String>,
    /// Log level filter passed to the logger.
    pub log_level: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            staging_base_dir: PathBuf::from(DEFAULT_STAGING_BASE_DIR),
            require_role_name: false,
            search_paths: Vec::new(),
            vars: BTreeMap::new(),
            log_level: "warn".to_string(),
        }
    }
}

impl StageConfig {
    /// Loads defaults, then the config file (explicit path, else
    /// `AAFRAG_CONFIG`), then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Configuration`] if the file cannot be read or
    /// parsed.
    pub fn load(explicit: Option<&Path>) -> StageResult<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Configuration`] if the file cannot be read or
    /// parsed.
    pub fn from_file(path: &Path) -> StageResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StageError::Configuration(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            StageError::Configuration(msg) => {
                StageError::Configuration(format!("{msg} (in {})", path.display()))
            }
            other => other,
        })
    }

    /// Parses a YAML config document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Configuration`] on malformed YAML or unknown keys.
    pub fn from_yaml_str(content: &str) -> StageResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| StageError::Configuration(format!("Failed to parse config: {e}")))
    }

    /// Applies environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(STAGING_DIR_ENV).filter(|v| !v.is_empty()) {
            self.staging_base_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(LOG_ENV).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_apparmor_roles() {
        let config = StageConfig::default();
        assert_eq!(config.staging_base_dir, PathBuf::from("/etc/apparmor.d/roles"));
        assert!(!config.require_role_name);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn yaml_overrides_selected_keys() {
        let config = StageConfig::from_yaml_str(
            "staging_base_dir: /tmp/roles\nrequire_role_name: true\nvars:\n  web_root: /srv/www\n",
        )
        .unwrap();
        assert_eq!(config.staging_base_dir, PathBuf::from("/tmp/roles"));
        assert!(config.require_role_name);
        assert_eq!(config.vars.get("web_root").map(String::as_str), Some("/srv/www"));
        assert!(config.search_paths.is_empty());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(StageConfig::from_yaml_str("\n").unwrap(), StageConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = StageConfig::from_yaml_str("staging_dir: /tmp\n").unwrap_err();
        assert!(matches!(err, StageError::Configuration(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = StageConfig::from_yaml_str("staging_base_dir: /from/file\n").unwrap();
        config.apply_env(|key| match key {
            STAGING_DIR_ENV => Some("/from/env".to_string()),
            LOG_ENV => Some("debug".to_string()),
            _ => None,
        });
        assert_eq!(config.staging_base_dir, PathBuf::from("/from/env"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_file_names_path() {
        let err = StageConfig::from_file(Path::new("/nonexistent/aafrag.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/aafrag.yaml"));
    }
}
