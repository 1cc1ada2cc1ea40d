//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::fragment::Mode;

/// Top-level CLI parser for `aafrag`.
#[derive(Debug, Parser)]
#[command(name = "aafrag", version, about = "Stage AppArmor profile fragments contributed by roles")]
pub struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level written to stderr (off, error, warn, info, debug, trace).
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ensure a role's fragment for a profile is present or absent.
    Apply(ApplyArgs),
    /// List the fragments staged for a profile.
    List(ListArgs),
}

/// Desired state of a fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum State {
    /// The fragment exists with the given content and mode.
    #[default]
    Present,
    /// No fragment exists for the role.
    Absent,
}

/// Arguments of `aafrag apply`.
#[derive(Debug, Clone, Args)]
pub struct ApplyArgs {
    /// Profile name, e.g. `usr.sbin.nginx`.
    #[arg(long)]
    pub name: String,

    /// Inline fragment content.
    #[arg(long)]
    pub fragment: Option<String>,

    /// Fragment source file, searched under `files/` then `templates/`.
    #[arg(long, value_name = "PATH")]
    pub fragment_src: Option<PathBuf>,

    /// Mode recorded in the fragment.
    #[arg(long, value_enum, default_value_t = Mode::Enforce)]
    pub mode: Mode,

    /// Contributing role; a unique name is derived when omitted.
    #[arg(long)]
    pub role_name: Option<String>,

    /// Whether the fragment should be present or absent.
    #[arg(long, value_enum, default_value_t = State::Present)]
    pub state: State,

    /// Base directory of the staging tree.
    #[arg(long, value_name = "DIR")]
    pub staging_base_dir: Option<PathBuf>,

    /// Report what would change without touching the filesystem.
    #[arg(long)]
    pub check: bool,

    /// Root searched for `--fragment-src` (repeatable).
    #[arg(long = "search-path", value_name = "DIR")]
    pub search_paths: Vec<PathBuf>,

    /// Template variable as `KEY=VALUE` (repeatable).
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,
}

/// Arguments of `aafrag list`.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Profile name whose fragments are listed.
    #[arg(long)]
    pub name: String,

    /// Base directory of the staging tree.
    #[arg(long, value_name = "DIR")]
    pub staging_base_dir: Option<PathBuf>,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty variable name in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
