//! Staging engine for role-contributed AppArmor profile fragments.
//!
//! Each role writes its own fragment to
//! `<staging_base_dir>/<profile>/<role>.fragment`; a later merge step
//! combines them. Writes are atomic and idempotent.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod fragment;
pub mod identity;
pub mod logging;
pub mod ports;
pub mod resolve;
pub mod store;

use clap::Parser;

pub use error::{StageError, StageResult};

/// Run the CLI with the provided arguments.
///
/// Help and version requests print to stdout and succeed.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["aafrag", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_prints_help() {
        assert!(run(["aafrag", "--help"]).is_ok());
    }

    #[test]
    fn run_stages_a_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_str().unwrap();
        let result = run([
            "aafrag", "apply", "--name", "usr.sbin.nginx", "--role-name", "nginx_role",
            "--fragment", "/var/www/html/** r,\n", "--staging-base-dir", base,
        ]);
        assert!(result.is_ok());
        assert!(dir.path().join("usr.sbin.nginx/nginx_role.fragment").is_file());
    }
}
